//! Policy trait definition for dosing bandits

use crate::arm::{ArmTable, DoseClass};
use crate::error::{BanditError, Result};
use crate::trial::Features;

/// Common interface of every dosing policy, learned or static.
///
/// Policies see only the patient's features, never the true dose. Random
/// sources are passed in so that every stochastic decision can be replayed
/// under a fixed seed.
pub trait Policy: Send {
    /// Short label used in logs and result file names
    fn name(&self) -> &str;

    /// Select a dose class for the patient described by `features`
    ///
    /// # Arguments
    /// - `features`: Named patient features
    /// - `rng`: Random number generator for stochastic policies
    fn choose(&mut self, features: &Features, rng: &mut dyn rand::RngCore) -> Result<DoseClass>;

    /// Update the policy with the reward observed for `arm`
    ///
    /// Only the statistics of `arm` may change.
    fn update(&mut self, features: &Features, arm: DoseClass, reward: f64) -> Result<()>;

    /// Reset all learned statistics
    fn reset(&mut self);
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose(&mut self, features: &Features, rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        (**self).choose(features, rng)
    }

    fn update(&mut self, features: &Features, arm: DoseClass, reward: f64) -> Result<()> {
        (**self).update(features, arm, reward)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Arm with the highest score; ties go to the earliest arm in
/// [`DoseClass::ALL`].
pub fn best_arm(scores: &ArmTable<f64>) -> Result<DoseClass> {
    let mut best = DoseClass::Low;
    let mut best_score = f64::NEG_INFINITY;

    for (arm, &score) in scores.iter() {
        if !score.is_finite() {
            return Err(BanditError::NumericalError {
                message: format!("non-finite score {score} for arm {arm}"),
            });
        }
        if score > best_score {
            best_score = score;
            best = arm;
        }
    }

    Ok(best)
}
