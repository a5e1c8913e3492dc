use rand::Rng;

use crate::arm::{ArmTable, DoseClass};
use crate::contextual::LinearArms;
use crate::error::{BanditError, Result};
use crate::policy::{Policy, best_arm};
use crate::statistics::ArmStatistics;
use crate::trial::{ContextEncoder, Features};

/// Disjoint linear epsilon-greedy (LinGreedy) policy
///
/// Shares the per-arm ridge statistics of [`LinUcb`](super::LinUcb) but
/// scores arms by the point estimate `x·A⁻¹·b` alone. On the `t`-th call to
/// `choose` it explores with probability `alpha / t`, picking an arm
/// uniformly at random.
#[derive(Debug, Clone)]
pub struct LinGreedy {
    /// Exploration scale; epsilon decays as `alpha / t`
    alpha: f64,
    /// Number of calls to `choose` so far
    trials: u64,
    model: LinearArms,
}

impl LinGreedy {
    /// Create a new linear epsilon-greedy policy
    ///
    /// # Arguments
    /// * `features` - Ordered feature names forming the context
    /// * `alpha` - Exploration scale, must be finite and positive
    pub fn new<I, S>(features: I, alpha: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(BanditError::InvalidParameter {
                message: format!("epsilon scale must be finite and positive, got {alpha}"),
            });
        }
        Ok(Self {
            alpha,
            trials: 0,
            model: LinearArms::new(ContextEncoder::new(features)?),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of decisions taken so far
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Exploration probability of the `t`-th decision (1-based)
    pub fn epsilon_at(&self, t: u64) -> f64 {
        self.alpha / t.max(1) as f64
    }

    /// Exploration probability the next call to `choose` will use
    pub fn next_epsilon(&self) -> f64 {
        self.epsilon_at(self.trials + 1)
    }

    pub fn num_features(&self) -> usize {
        self.model.num_features()
    }

    pub fn statistics(&self, arm: DoseClass) -> &ArmStatistics {
        self.model.statistics(arm)
    }

    /// Predicted reward `x·A⁻¹·b` of every arm for an encoded context
    pub fn scores(&self, context: &[f64]) -> Result<ArmTable<f64>> {
        let posteriors = self.model.posteriors()?;
        Ok(ArmTable::from_fn(|arm| posteriors[arm].predict(context)))
    }
}

impl Policy for LinGreedy {
    fn name(&self) -> &str {
        "eGreedy"
    }

    fn choose(&mut self, features: &Features, rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        // Encode first so a malformed trial fails even on exploration steps.
        let context = self.model.encode(features)?;

        self.trials += 1;
        let epsilon = self.epsilon_at(self.trials);

        if rng.random::<f64>() < epsilon {
            let idx = rng.random_range(0..DoseClass::ALL.len());
            Ok(DoseClass::ALL[idx])
        } else {
            best_arm(&self.scores(&context)?)
        }
    }

    fn update(&mut self, features: &Features, arm: DoseClass, reward: f64) -> Result<()> {
        self.model.update(features, arm, reward)
    }

    fn reset(&mut self) {
        self.trials = 0;
        self.model.reset();
    }
}
