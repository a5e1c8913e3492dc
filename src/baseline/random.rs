use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::arm::DoseClass;
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::trial::Features;

/// Random dosing policy - draws a dose class from fixed weights
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDose {
    weights: [f64; 3],
}

impl RandomDose {
    /// Uniform over the three dose classes
    pub fn uniform() -> Self {
        Self {
            weights: [1.0, 1.0, 1.0],
        }
    }

    /// Weights for low, medium and high, in that order
    ///
    /// Weights need not sum to one but must be finite, non-negative and not
    /// all zero.
    pub fn with_weights(weights: [f64; 3]) -> Result<Self> {
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(BanditError::InvalidParameter {
                message: format!("random weights must be finite, got {weights:?}"),
            });
        }
        let policy = Self { weights };
        policy.distribution()?;
        Ok(policy)
    }

    /// Selection probability of each arm
    pub fn probabilities(&self) -> [f64; 3] {
        let total: f64 = self.weights.iter().sum();
        self.weights.map(|w| w / total)
    }

    fn distribution(&self) -> Result<WeightedIndex<f64>> {
        WeightedIndex::new(self.weights).map_err(|e| BanditError::InvalidParameter {
            message: format!("invalid random weights {:?}: {e}", self.weights),
        })
    }
}

impl Default for RandomDose {
    fn default() -> Self {
        Self::uniform()
    }
}

impl Policy for RandomDose {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose(&mut self, _features: &Features, rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        Ok(DoseClass::ALL[self.distribution()?.sample(rng)])
    }

    fn update(&mut self, _features: &Features, _arm: DoseClass, _reward: f64) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) {}
}
