//! Repeated evaluation of the configured policies.

use std::fmt;

use tracing::info;

use crate::baseline::{ClinicalDosing, FixedDose, RandomDose};
use crate::config::{ExperimentConfig, PolicySelection};
use crate::contextual::{LinGreedy, LinTs, LinUcb};
use crate::data::Dataset;
use crate::error::{BanditError, Result};
use crate::evaluation::{self, RunResult, mean_series};
use crate::policy::Policy;

/// The policies an experiment can evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fixed,
    Clinical,
    Random,
    LinUcb,
    EGreedy,
    Thompson,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Fixed,
        PolicyKind::Clinical,
        PolicyKind::Random,
        PolicyKind::LinUcb,
        PolicyKind::EGreedy,
        PolicyKind::Thompson,
    ];

    /// Name used in logs and as the result file stem.
    pub fn label(self) -> &'static str {
        match self {
            PolicyKind::Fixed => "Fixed",
            PolicyKind::Clinical => "Clinical",
            PolicyKind::Random => "Random",
            PolicyKind::LinUcb => "LinUCB",
            PolicyKind::EGreedy => "eGreedy",
            PolicyKind::Thompson => "Thompson",
        }
    }

    /// Selected kinds, in evaluation order.
    pub fn selected(selection: &PolicySelection) -> Vec<PolicyKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| match kind {
                PolicyKind::Fixed => selection.fixed,
                PolicyKind::Clinical => selection.clinical,
                PolicyKind::Random => selection.random,
                PolicyKind::LinUcb => selection.linucb,
                PolicyKind::EGreedy => selection.egreedy,
                PolicyKind::Thompson => selection.thompson,
            })
            .collect()
    }

    /// Construct a fresh policy from the experiment hyperparameters.
    pub fn build(self, config: &ExperimentConfig) -> Result<Box<dyn Policy>> {
        let features = config.features.iter().cloned();
        Ok(match self {
            PolicyKind::Fixed => Box::new(FixedDose),
            PolicyKind::Clinical => Box::new(ClinicalDosing),
            PolicyKind::Random => Box::new(RandomDose::with_weights(config.random_weights)?),
            PolicyKind::LinUcb => {
                Box::new(LinUcb::new(features, config.alpha)?.with_sqrt_bonus(config.sqrt_bonus))
            }
            PolicyKind::EGreedy => Box::new(LinGreedy::new(features, config.ep)?),
            PolicyKind::Thompson => Box::new(LinTs::new(features, config.v2)?),
        })
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every run of one policy plus the step-wise mean of their series.
#[derive(Clone, Debug)]
pub struct PolicySummary {
    pub kind: PolicyKind,
    pub runs: Vec<RunResult>,
    pub mean_fraction_incorrect: Vec<f64>,
}

impl PolicySummary {
    pub fn name(&self) -> &'static str {
        self.kind.label()
    }

    pub fn mean_total_fraction_correct(&self) -> f64 {
        self.mean_of(|r| r.total_fraction_correct)
    }

    pub fn mean_fraction_egregious(&self) -> f64 {
        self.mean_of(|r| r.fraction_egregious)
    }

    fn mean_of(&self, metric: impl Fn(&RunResult) -> f64) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(metric).sum::<f64>() / self.runs.len() as f64
    }
}

/// Evaluate `kind` for `config.runs` independent runs.
///
/// The policy is reset before every run; each run reshuffles the dataset
/// from the shared generator.
pub fn evaluate_policy(
    kind: PolicyKind,
    dataset: &Dataset,
    config: &ExperimentConfig,
    rng: &mut dyn rand::RngCore,
) -> Result<PolicySummary> {
    if config.runs == 0 {
        return Err(BanditError::InvalidParameter {
            message: "runs must be at least 1".to_string(),
        });
    }

    let mut policy = kind.build(config)?;
    let mut runs = Vec::with_capacity(config.runs);
    for run in 0..config.runs {
        policy.reset();
        info!(policy = %kind, run = run + 1, of = config.runs, "running policy");
        let result = evaluation::run(
            dataset.trials(),
            &mut policy,
            config.large_error_penalty,
            rng,
        )?;
        info!(
            policy = %kind,
            run = run + 1,
            total_fraction_correct = result.total_fraction_correct,
            average_fraction_incorrect = result.average_fraction_incorrect,
            egregious_errors = result.egregious_errors,
            fraction_egregious = result.fraction_egregious,
            "run finished"
        );
        runs.push(result);
    }

    let series: Vec<Vec<f64>> = runs
        .iter()
        .map(|r| r.fraction_incorrect_per_time.clone())
        .collect();
    Ok(PolicySummary {
        kind,
        mean_fraction_incorrect: mean_series(&series),
        runs,
    })
}

/// Evaluate every selected policy in turn.
pub fn run_experiment(
    dataset: &Dataset,
    config: &ExperimentConfig,
    rng: &mut dyn rand::RngCore,
) -> Result<Vec<PolicySummary>> {
    if dataset.is_empty() {
        return Err(BanditError::EmptyDataset);
    }
    PolicyKind::selected(&config.policies)
        .into_iter()
        .map(|kind| evaluate_policy(kind, dataset, config, rng))
        .collect()
}
