//! dosebandit: contextual bandits for warfarin dose classification.
//!
//! Patients arrive one at a time, described by named numeric features. A
//! policy picks one of three dose classes (low, medium, high), is told whether
//! the choice matched the patient's therapeutic dose, and learns from the
//! reward. Static baselines (fixed, clinical formula, random) are evaluated
//! the same way as the learned disjoint linear bandits (LinUCB, linear
//! epsilon-greedy, linear Thompson sampling).
//!
//! # Quick Start
//!
//! ```
//! use dosebandit::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut policy = LinUcb::new(["Age in decades", "Weight (kg)"], 1.0).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let mut patient = Features::new();
//! patient.insert("Age in decades".to_string(), 6.0);
//! patient.insert("Weight (kg)".to_string(), 80.0);
//!
//! let arm = policy.choose(&patient, &mut rng).unwrap();
//! let truth = dose_class(35.0);
//! let outcome = Outcome::score(arm, truth, -1.0);
//! policy.update(&patient, arm, outcome.reward).unwrap();
//! ```

pub mod arm;
pub mod baseline;
pub mod config;
pub mod contextual;
pub mod data;
mod error;
pub mod evaluation;
pub mod experiment;
pub mod policy;
pub mod report;
pub mod statistics;
pub mod trial;

// Re-export main types
pub use arm::{ArmTable, DoseClass, dose_class};
pub use config::ExperimentConfig;
pub use data::Dataset;
pub use error::{BanditError, Result};
pub use evaluation::{Outcome, RunResult};
pub use policy::Policy;
pub use trial::{ContextEncoder, Features, Trial};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use dosebandit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::baseline::{ClinicalDosing, FixedDose, RandomDose};
    pub use crate::contextual::{LinGreedy, LinTs, LinUcb};
    pub use crate::{
        BanditError, DoseClass, Features, Outcome, Policy, Result, Trial, dose_class,
    };
}
