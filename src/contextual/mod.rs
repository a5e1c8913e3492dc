//! Contextual bandit policies
//!
//! This module contains the disjoint linear bandits. Each strategy wraps a
//! [`LinearArms`] store (one design matrix and reward accumulator per dose
//! class) and differs only in how it turns the per-arm estimates into a
//! decision.

pub mod lingreedy;
pub mod lints;
pub mod linucb;

pub use lingreedy::LinGreedy;
pub use lints::LinTs;
pub use linucb::LinUcb;

use crate::arm::{ArmTable, DoseClass};
use crate::error::Result;
use crate::statistics::{ArmStatistics, Posterior};
use crate::trial::{ContextEncoder, Features};

/// Context encoder plus disjoint per-arm statistics.
#[derive(Debug, Clone)]
pub struct LinearArms {
    encoder: ContextEncoder,
    arms: ArmTable<ArmStatistics>,
}

impl LinearArms {
    pub fn new(encoder: ContextEncoder) -> Self {
        let num_features = encoder.num_features();
        Self {
            encoder,
            arms: ArmTable::from_fn(|_| ArmStatistics::new(num_features)),
        }
    }

    pub fn encoder(&self) -> &ContextEncoder {
        &self.encoder
    }

    pub fn num_features(&self) -> usize {
        self.encoder.num_features()
    }

    /// Statistics of a single arm
    pub fn statistics(&self, arm: DoseClass) -> &ArmStatistics {
        &self.arms[arm]
    }

    pub fn encode(&self, features: &Features) -> Result<Vec<f64>> {
        self.encoder.encode(features)
    }

    /// Ridge estimates for every arm
    pub fn posteriors(&self) -> Result<ArmTable<Posterior>> {
        ArmTable::try_from_fn(|arm| self.arms[arm].posterior())
    }

    /// Fold an observed reward into the statistics of `arm` only
    pub fn update(&mut self, features: &Features, arm: DoseClass, reward: f64) -> Result<()> {
        let context = self.encoder.encode(features)?;
        self.arms[arm].observe(&context, reward)
    }

    pub fn reset(&mut self) {
        let num_features = self.num_features();
        self.arms = ArmTable::from_fn(|_| ArmStatistics::new(num_features));
    }
}
