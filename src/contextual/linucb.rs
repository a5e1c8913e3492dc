use crate::arm::{ArmTable, DoseClass};
use crate::contextual::LinearArms;
use crate::error::{BanditError, Result};
use crate::policy::{Policy, best_arm};
use crate::statistics::ArmStatistics;
use crate::trial::{ContextEncoder, Features};

/// Disjoint Linear Upper Confidence Bound (LinUCB) policy
///
/// Each arm keeps its own ridge regression of reward on context. The score
/// of an arm is its predicted reward plus `alpha` times the confidence width
/// `x·A⁻¹·x`.
///
/// By default the width is used as is, without the square root that appears
/// in the published algorithm; [`LinUcb::with_sqrt_bonus`] switches to
/// `sqrt(x·A⁻¹·x)`.
#[derive(Debug, Clone)]
pub struct LinUcb {
    /// Exploration parameter (scales the confidence width)
    alpha: f64,
    /// Take the square root of the width before scaling
    sqrt_bonus: bool,
    model: LinearArms,
}

impl LinUcb {
    /// Create a new LinUCB policy
    ///
    /// # Arguments
    /// * `features` - Ordered feature names forming the context
    /// * `alpha` - Exploration parameter, must be finite and non-negative
    pub fn new<I, S>(features: I, alpha: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(BanditError::InvalidParameter {
                message: format!("alpha must be finite and non-negative, got {alpha}"),
            });
        }
        Ok(Self {
            alpha,
            sqrt_bonus: false,
            model: LinearArms::new(ContextEncoder::new(features)?),
        })
    }

    /// Use `sqrt(x·A⁻¹·x)` as the exploration bonus
    #[must_use]
    pub fn with_sqrt_bonus(mut self, enabled: bool) -> Self {
        self.sqrt_bonus = enabled;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn num_features(&self) -> usize {
        self.model.num_features()
    }

    pub fn statistics(&self, arm: DoseClass) -> &ArmStatistics {
        self.model.statistics(arm)
    }

    /// Upper confidence score of every arm for an encoded context
    pub fn scores(&self, context: &[f64]) -> Result<ArmTable<f64>> {
        let posteriors = self.model.posteriors()?;
        Ok(ArmTable::from_fn(|arm| {
            let posterior = &posteriors[arm];
            let width = posterior.width(context);
            let bonus = if self.sqrt_bonus { width.sqrt() } else { width };
            posterior.predict(context) + self.alpha * bonus
        }))
    }
}

impl Policy for LinUcb {
    fn name(&self) -> &str {
        "LinUCB"
    }

    fn choose(&mut self, features: &Features, _rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        let context = self.model.encode(features)?;
        best_arm(&self.scores(&context)?)
    }

    fn update(&mut self, features: &Features, arm: DoseClass, reward: f64) -> Result<()> {
        self.model.update(features, arm, reward)
    }

    fn reset(&mut self) {
        self.model.reset();
    }
}
