use crate::arm::{ArmTable, DoseClass};
use crate::contextual::LinearArms;
use crate::error::{BanditError, Result};
use crate::policy::{Policy, best_arm};
use crate::statistics::{ArmStatistics, dot};
use crate::trial::{ContextEncoder, Features};

/// Disjoint Linear Thompson Sampling (LinTS) policy for contextual bandits
///
/// Each arm keeps a precision matrix `B` and accumulator `f`. To decide, a
/// coefficient vector is drawn per arm from `N(B⁻¹f, v2·B⁻¹)` and the arm
/// whose sample scores the context highest is chosen, so repeated calls on
/// identical state may return different arms.
#[derive(Debug, Clone)]
pub struct LinTs {
    /// Variance multiplier of the posterior (controls exploration)
    v2: f64,
    model: LinearArms,
}

impl LinTs {
    /// Create a new Linear Thompson Sampling policy
    ///
    /// # Arguments
    /// * `features` - Ordered feature names forming the context
    /// * `v2` - Posterior variance multiplier, must be finite and positive
    pub fn new<I, S>(features: I, v2: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !v2.is_finite() || v2 <= 0.0 {
            return Err(BanditError::InvalidParameter {
                message: format!("v2 must be finite and positive, got {v2}"),
            });
        }
        Ok(Self {
            v2,
            model: LinearArms::new(ContextEncoder::new(features)?),
        })
    }

    pub fn v2(&self) -> f64 {
        self.v2
    }

    pub fn num_features(&self) -> usize {
        self.model.num_features()
    }

    pub fn statistics(&self, arm: DoseClass) -> &ArmStatistics {
        self.model.statistics(arm)
    }

    /// Posterior-mean reward of every arm (no sampling)
    pub fn expected_scores(&self, context: &[f64]) -> Result<ArmTable<f64>> {
        let posteriors = self.model.posteriors()?;
        Ok(ArmTable::from_fn(|arm| posteriors[arm].predict(context)))
    }

    /// One sampled reward per arm, drawn in arm order
    pub fn sampled_scores(
        &self,
        context: &[f64],
        rng: &mut dyn rand::RngCore,
    ) -> Result<ArmTable<f64>> {
        let posteriors = self.model.posteriors()?;
        ArmTable::try_from_fn(|arm| {
            let theta = posteriors[arm].sample(self.v2, rng)?;
            Ok(dot(&theta, context))
        })
    }
}

impl Policy for LinTs {
    fn name(&self) -> &str {
        "Thompson"
    }

    fn choose(&mut self, features: &Features, rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        let context = self.model.encode(features)?;
        best_arm(&self.sampled_scores(&context, rng)?)
    }

    fn update(&mut self, features: &Features, arm: DoseClass, reward: f64) -> Result<()> {
        self.model.update(features, arm, reward)
    }

    fn reset(&mut self) {
        self.model.reset();
    }
}
