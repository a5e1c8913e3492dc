//! Online evaluation of a policy over a dataset of trials.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::arm::DoseClass;
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::trial::Trial;

/// Reward for a correct dose class.
pub const CORRECT_REWARD: f64 = 0.0;

/// Reward for an incorrect, non-egregious dose class.
pub const INCORRECT_REWARD: f64 = -1.0;

/// How a single decision was scored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    pub correct: bool,
    pub egregious: bool,
    pub reward: f64,
}

impl Outcome {
    /// Score `predicted` against `truth`.
    ///
    /// An egregious error (low for high or high for low) earns
    /// `egregious_penalty` instead of the ordinary incorrect reward.
    pub fn score(predicted: DoseClass, truth: DoseClass, egregious_penalty: f64) -> Self {
        let correct = predicted == truth;
        let egregious = predicted.is_opposite_extreme(truth);
        let reward = if egregious {
            egregious_penalty
        } else if correct {
            CORRECT_REWARD
        } else {
            INCORRECT_REWARD
        };
        Self {
            correct,
            egregious,
            reward,
        }
    }
}

/// Metrics of one pass over the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    /// Fraction of trials whose dose class was predicted correctly
    pub total_fraction_correct: f64,
    /// Mean of `fraction_incorrect_per_time`
    pub average_fraction_incorrect: f64,
    /// Fraction incorrect among the first `t` trials, for `t = 1..=T`
    pub fraction_incorrect_per_time: Vec<f64>,
    /// Number of egregious errors
    pub egregious_errors: usize,
    /// Fraction of trials that were egregious errors
    pub fraction_egregious: f64,
}

impl RunResult {
    pub fn trials(&self) -> usize {
        self.fraction_incorrect_per_time.len()
    }
}

/// Shuffle the trials once, then evaluate `policy` over them in that order.
pub fn run<P>(
    trials: &[Trial],
    policy: &mut P,
    egregious_penalty: f64,
    rng: &mut dyn rand::RngCore,
) -> Result<RunResult>
where
    P: Policy + ?Sized,
{
    let mut order: Vec<usize> = (0..trials.len()).collect();
    order.shuffle(rng);
    run_in_order(trials, &order, policy, egregious_penalty, rng)
}

/// Evaluate `policy` over `trials` visited in the given index order.
///
/// For every trial the policy chooses, the choice is scored against the
/// trial's true dose class, and the reward is fed back to the policy.
pub fn run_in_order<P>(
    trials: &[Trial],
    order: &[usize],
    policy: &mut P,
    egregious_penalty: f64,
    rng: &mut dyn rand::RngCore,
) -> Result<RunResult>
where
    P: Policy + ?Sized,
{
    if order.is_empty() {
        return Err(BanditError::EmptyDataset);
    }

    let mut correct = Vec::with_capacity(order.len());
    let mut egregious_errors = 0;

    for (t, &idx) in order.iter().enumerate() {
        let trial = trials.get(idx).ok_or_else(|| BanditError::InvalidParameter {
            message: format!("trial index {idx} out of range for {} trials", trials.len()),
        })?;

        let action = policy.choose(trial.features(), rng)?;
        let outcome = Outcome::score(action, trial.dose_class(), egregious_penalty);
        if outcome.egregious {
            egregious_errors += 1;
        }
        correct.push(outcome.correct);

        policy.update(trial.features(), action, outcome.reward)?;

        if (t + 1) % 1000 == 0 {
            debug!(policy = policy.name(), trials = t + 1, "evaluation progress");
        }
    }

    let total = correct.len() as f64;
    let fraction_incorrect_per_time = running_fraction_incorrect(&correct);
    let average_fraction_incorrect =
        fraction_incorrect_per_time.iter().sum::<f64>() / fraction_incorrect_per_time.len() as f64;

    Ok(RunResult {
        total_fraction_correct: correct.iter().filter(|&&c| c).count() as f64 / total,
        average_fraction_incorrect,
        fraction_incorrect_per_time,
        egregious_errors,
        fraction_egregious: egregious_errors as f64 / total,
    })
}

/// Fraction of incorrect decisions in every prefix of `correct`.
pub fn running_fraction_incorrect(correct: &[bool]) -> Vec<f64> {
    let mut incorrect = 0usize;
    correct
        .iter()
        .enumerate()
        .map(|(t, &c)| {
            if !c {
                incorrect += 1;
            }
            incorrect as f64 / (t + 1) as f64
        })
        .collect()
}

/// Element-wise mean of several series, truncated to the shortest.
pub fn mean_series(series: &[Vec<f64>]) -> Vec<f64> {
    let Some(len) = series.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    let n = series.len() as f64;
    (0..len)
        .map(|t| series.iter().map(|s| s[t]).sum::<f64>() / n)
        .collect()
}
