//! Patient trials and the context encoder.

use indexmap::IndexMap;

use crate::arm::DoseClass;
use crate::error::{BanditError, Result};

/// Named numeric features of one patient, in column order.
pub type Features = IndexMap<String, f64>;

/// Demographic and co-medication features.
pub const BASE_FEATURES: [&str; 13] = [
    "Age in decades",
    "Height (cm)",
    "Weight (kg)",
    "Male",
    "Female",
    "Asian",
    "Black",
    "White",
    "Unknown race",
    "Carbamazepine (Tegretol)",
    "Phenytoin (Dilantin)",
    "Rifampin or Rifampicin",
    "Amiodarone (Cordarone)",
];

/// VKORC1 and CYP2C9 genotype indicators.
pub const GENOTYPE_FEATURES: [&str; 9] = [
    "VKORC1AG",
    "VKORC1AA",
    "VKORC1UN",
    "CYP2C912",
    "CYP2C913",
    "CYP2C922",
    "CYP2C923",
    "CYP2C933",
    "CYP2C9UN",
];

/// Base and genotype features, the default context of the linear bandits.
pub fn default_features() -> Vec<String> {
    BASE_FEATURES
        .iter()
        .chain(GENOTYPE_FEATURES.iter())
        .map(|name| name.to_string())
        .collect()
}

/// Look up a single feature, failing if it is absent.
pub fn feature(features: &Features, name: &str) -> Result<f64> {
    features
        .get(name)
        .copied()
        .ok_or_else(|| BanditError::MissingFeature {
            name: name.to_string(),
        })
}

/// A patient with its true weekly dose.
///
/// The dose is kept apart from the features so a policy never sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct Trial {
    features: Features,
    weekly_dose: f64,
}

impl Trial {
    pub fn new(features: Features, weekly_dose: f64) -> Self {
        Self {
            features,
            weekly_dose,
        }
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    /// True weekly dose in mg/week.
    pub fn weekly_dose(&self) -> f64 {
        self.weekly_dose
    }

    /// Dose class of the true weekly dose.
    pub fn dose_class(&self) -> DoseClass {
        DoseClass::from_weekly_dose(self.weekly_dose)
    }
}

/// Turns a feature mapping into a context vector with a fixed column order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextEncoder {
    names: Vec<String>,
}

impl ContextEncoder {
    /// Create an encoder for the given feature names.
    ///
    /// Names must be non-empty and unique.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(BanditError::InvalidParameter {
                message: "feature list must not be empty".to_string(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(BanditError::InvalidParameter {
                    message: format!("duplicate feature: {name}"),
                });
            }
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of context dimensions.
    pub fn num_features(&self) -> usize {
        self.names.len()
    }

    /// Extract the context vector.
    ///
    /// A missing name is an error; nothing is defaulted.
    pub fn encode(&self, features: &Features) -> Result<Vec<f64>> {
        self.names
            .iter()
            .map(|name| feature(features, name))
            .collect()
    }
}
