//! Loading patient trials from CSV.
//!
//! The input is a table with a header row and one label column holding the
//! therapeutic weekly dose. The label must be numeric in every row. Every
//! other cell that parses as a finite number becomes a named feature of its
//! trial; cells that do not (subject IDs, free text, blanks) are left out,
//! so a policy that needs them fails with a missing-feature error.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::arm::DoseClass;
use crate::error::{BanditError, Result};
use crate::trial::{Features, Trial};

/// Default label column of the warfarin dataset.
pub const LABEL_COLUMN: &str = "Therapeutic Dose of Warfarin";

/// Trials loaded from a CSV file, in file order.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    feature_names: Vec<String>,
    partial_columns: Vec<String>,
    trials: Vec<Trial>,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, trials: Vec<Trial>) -> Self {
        Self {
            feature_names,
            partial_columns: Vec::new(),
            trials,
        }
    }

    /// Load a dataset from a CSV file on disk.
    pub fn from_path<P: AsRef<Path>>(path: P, label_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let dataset = Self::from_csv(reader, label_column)?;
        info!(
            path = %path.display(),
            trials = dataset.len(),
            features = dataset.feature_names.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Load a dataset from any CSV reader.
    pub fn from_reader<R: Read>(reader: R, label_column: &str) -> Result<Self> {
        Self::from_csv(
            ReaderBuilder::new().has_headers(true).from_reader(reader),
            label_column,
        )
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, label_column: &str) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let label_idx = headers
            .iter()
            .position(|h| h.trim() == label_column)
            .ok_or_else(|| BanditError::Data {
                row: 1,
                message: format!("label column {label_column:?} not found"),
            })?;

        let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let mut partial = BTreeSet::new();

        let mut trials = Vec::new();
        for (i, record) in reader.records().enumerate() {
            // header is row 1
            let row = i + 2;
            let record = record?;

            let mut features = Features::with_capacity(names.len().saturating_sub(1));
            let mut weekly_dose = None;
            for (col, (name, cell)) in names.iter().zip(record.iter()).enumerate() {
                if col == label_idx {
                    weekly_dose = Some(parse_cell(cell, name, row)?);
                } else {
                    match parse_number(cell) {
                        Some(value) => {
                            features.insert(name.clone(), value);
                        }
                        None => {
                            partial.insert(col);
                        }
                    }
                }
            }

            let weekly_dose = weekly_dose.ok_or_else(|| BanditError::Data {
                row,
                message: format!("missing value for {label_column:?}"),
            })?;
            trials.push(Trial::new(features, weekly_dose));
        }

        let mut feature_names = Vec::new();
        let mut partial_columns = Vec::new();
        for (col, name) in names.into_iter().enumerate() {
            if col == label_idx {
                continue;
            }
            if partial.contains(&col) {
                partial_columns.push(name);
            } else {
                feature_names.push(name);
            }
        }
        if !partial_columns.is_empty() {
            warn!(
                columns = ?partial_columns,
                "columns with non-numeric cells; those cells are not features"
            );
        }

        Ok(Self {
            feature_names,
            partial_columns,
            trials,
        })
    }

    /// Columns numeric in every row, in file order (label excluded).
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Columns with at least one non-numeric cell, in file order.
    pub fn partial_columns(&self) -> &[String] {
        &self.partial_columns
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Number of trials whose true dose falls in each class.
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for trial in &self.trials {
            counts[trial.dose_class().index()] += 1;
        }
        counts
    }

    /// Fraction of trials whose true dose class is `class`.
    pub fn class_fraction(&self, class: DoseClass) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        self.class_counts()[class.index()] as f64 / self.trials.len() as f64
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_cell(cell: &str, column: &str, row: usize) -> Result<f64> {
    let trimmed = cell.trim();
    let value: f64 = trimmed.parse().map_err(|_| BanditError::Data {
        row,
        message: format!("column {column:?}: cannot parse {trimmed:?} as a number"),
    })?;
    if !value.is_finite() {
        return Err(BanditError::Data {
            row,
            message: format!("column {column:?}: value {trimmed:?} is not finite"),
        });
    }
    Ok(value)
}
