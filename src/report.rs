//! Result files and the fraction-incorrect figure.
//!
//! Each policy's averaged series is written as a single-column CSV named
//! after the policy. The figure is drawn from every CSV found in the results
//! directory, so series from earlier invocations are plotted alongside new
//! ones.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use plotters::prelude::*;
use tracing::{debug, info};

use crate::error::{BanditError, Result};

/// File name of the figure inside the results directory.
pub const FIGURE_FILE: &str = "fraction_incorrect.svg";

/// Leading points left out of the figure; early prefixes are too noisy.
pub const SKIP_POINTS: usize = 10;

const PALETTE: [RGBColor; 6] = [RED, BLUE, GREEN, MAGENTA, CYAN, BLACK];

/// Write `series` to `<dir>/<name>.csv`, one value per line.
pub fn write_series(dir: &Path, name: &str, series: &[f64]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.csv"));

    let mut writer = WriterBuilder::new().has_headers(false).from_path(&path)?;
    for value in series {
        writer.write_record([value.to_string()])?;
    }
    writer.flush()?;

    debug!(path = %path.display(), points = series.len(), "wrote series");
    Ok(path)
}

/// Read a single-column series written by [`write_series`].
pub fn read_series(path: &Path) -> Result<Vec<f64>> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut series = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let cell = record.get(0).unwrap_or("").trim();
        let value = cell.parse::<f64>().map_err(|_| BanditError::Data {
            row: i + 1,
            message: format!("{}: cannot parse {cell:?} as a number", path.display()),
        })?;
        series.push(value);
    }
    Ok(series)
}

/// Every `*.csv` series in `dir`, keyed by file stem and sorted by name.
pub fn collect_series(dir: &Path) -> Result<Vec<(String, Vec<f64>)>> {
    let mut all = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            all.push((stem.to_string(), read_series(&path)?));
        }
    }
    all.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(all)
}

/// Draw one line per series: fraction incorrect against examples seen.
pub fn plot_fraction_incorrect(path: &Path, series: &[(String, Vec<f64>)]) -> Result<()> {
    draw(path, series).map_err(|e| BanditError::Plot {
        message: e.to_string(),
    })?;
    info!(path = %path.display(), lines = series.len(), "saved figure");
    Ok(())
}

fn draw(
    path: &Path,
    series: &[(String, Vec<f64>)],
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_len = series
        .iter()
        .map(|(_, values)| values.len())
        .max()
        .unwrap_or(0)
        .max(SKIP_POINTS + 1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Fraction incorrect", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(SKIP_POINTS..max_len, 0.0..1.0)?;

    chart
        .configure_mesh()
        .x_desc("examples seen")
        .y_desc("fraction_incorrect")
        .draw()?;

    for (i, (name, values)) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                values
                    .iter()
                    .enumerate()
                    .skip(SKIP_POINTS)
                    .map(|(t, v)| (t, *v)),
                &color,
            ))?
            .label(name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
