use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::LABEL_COLUMN;
use crate::error::{BanditError, Result};
use crate::trial::default_features;

/// Experiment configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `DOSEBANDIT__`; command-line flags
/// are applied on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "default_data")]
    pub data: PathBuf,
    #[serde(default = "default_label_column")]
    pub label_column: String,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Independent runs per policy, averaged step by step
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// LinUCB exploration weight
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Use sqrt(x·A⁻¹·x) as the LinUCB bonus
    #[serde(default)]
    pub sqrt_bonus: bool,
    /// Epsilon scale of the linear epsilon-greedy policy
    #[serde(default = "default_ep")]
    pub ep: f64,
    /// Thompson sampling variance multiplier
    #[serde(default = "default_v2")]
    pub v2: f64,
    /// Reward given for an egregious error
    #[serde(default = "default_large_error_penalty")]
    pub large_error_penalty: f64,
    /// Seed for reproducible runs; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Context features of the linear bandits
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    /// Weights of the random baseline (low, medium, high)
    #[serde(default = "default_random_weights")]
    pub random_weights: [f64; 3],
    #[serde(default = "default_plot")]
    pub plot: bool,
    #[serde(default)]
    pub policies: PolicySelection,
}

/// Which policies to evaluate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySelection {
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub clinical: bool,
    #[serde(default)]
    pub random: bool,
    #[serde(default)]
    pub linucb: bool,
    #[serde(default)]
    pub egreedy: bool,
    #[serde(default)]
    pub thompson: bool,
}

impl PolicySelection {
    pub fn any(&self) -> bool {
        self.fixed || self.clinical || self.random || self.linucb || self.egreedy || self.thompson
    }
}

fn default_data() -> PathBuf {
    PathBuf::from("data/warfarin.csv")
}
fn default_label_column() -> String {
    LABEL_COLUMN.to_string()
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_runs() -> usize {
    5
}
fn default_alpha() -> f64 {
    1.0
}
fn default_ep() -> f64 {
    1.0
}
fn default_v2() -> f64 {
    0.001
}
fn default_large_error_penalty() -> f64 {
    -1.0
}
fn default_random_weights() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}
fn default_plot() -> bool {
    true
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data: default_data(),
            label_column: default_label_column(),
            results_dir: default_results_dir(),
            runs: default_runs(),
            alpha: default_alpha(),
            sqrt_bonus: false,
            ep: default_ep(),
            v2: default_v2(),
            large_error_penalty: default_large_error_penalty(),
            seed: None,
            features: default_features(),
            random_weights: default_random_weights(),
            plot: default_plot(),
            policies: PolicySelection::default(),
        }
    }
}

impl ExperimentConfig {
    /// Load from `path` (if given) and `DOSEBANDIT__*` environment variables.
    ///
    /// Environment values override the file. List-valued keys (`features`)
    /// are comma separated.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, config::ConfigError> {
        Self::load_from(path, None)
    }

    /// Like [`ExperimentConfig::load`], reading variables from `env` instead
    /// of the process environment when given.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> std::result::Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("DOSEBANDIT")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("features")
                .source(env),
        );

        builder.build()?.try_deserialize()
    }

    /// Check hyperparameters before any run starts.
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(invalid("runs must be at least 1".to_string()));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(invalid(format!(
                "alpha must be finite and non-negative, got {}",
                self.alpha
            )));
        }
        if !self.ep.is_finite() || self.ep <= 0.0 {
            return Err(invalid(format!(
                "ep must be finite and positive, got {}",
                self.ep
            )));
        }
        if !self.v2.is_finite() || self.v2 <= 0.0 {
            return Err(invalid(format!(
                "v2 must be finite and positive, got {}",
                self.v2
            )));
        }
        if !self.large_error_penalty.is_finite() {
            return Err(invalid(format!(
                "large_error_penalty must be finite, got {}",
                self.large_error_penalty
            )));
        }
        if self.features.is_empty() {
            return Err(invalid("features must not be empty".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> BanditError {
    BanditError::InvalidParameter { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.runs, 5);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.ep, 1.0);
        assert_eq!(config.v2, 0.001);
        assert_eq!(config.large_error_penalty, -1.0);
        assert_eq!(config.features.len(), 22);
        assert_eq!(config.label_column, "Therapeutic Dose of Warfarin");
        assert!(!config.policies.any());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
runs = 2
alpha = 0.25
seed = 17
features = ["Age in decades", "Weight (kg)"]

[policies]
linucb = true
thompson = true
"#
        )
        .unwrap();

        let config = ExperimentConfig::load_from(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.alpha, 0.25);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.features, vec!["Age in decades", "Weight (kg)"]);
        assert!(config.policies.linucb && config.policies.thompson);
        assert!(!config.policies.fixed);
        // untouched fields keep their defaults
        assert_eq!(config.v2, 0.001);
        assert_eq!(config.results_dir, PathBuf::from("results"));
    }

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "runs = 2\nalpha = 0.25\nv2 = 0.5\n\n[policies]\nfixed = true").unwrap();

        let config = ExperimentConfig::load_from(
            Some(file.path()),
            env(&[
                ("DOSEBANDIT__RUNS", "7"),
                ("DOSEBANDIT__SEED", "99"),
                ("DOSEBANDIT__POLICIES__THOMPSON", "true"),
                ("OTHER__RUNS", "100"),
            ]),
        )
        .unwrap();

        assert_eq!(config.runs, 7);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.alpha, 0.25);
        assert_eq!(config.v2, 0.5);
        assert!(config.policies.fixed && config.policies.thompson);
    }

    #[test]
    fn test_features_from_comma_separated_environment() {
        let config = ExperimentConfig::load_from(
            None,
            env(&[("DOSEBANDIT__FEATURES", "Age in decades,Weight (kg),Asian")]),
        )
        .unwrap();
        assert_eq!(
            config.features,
            vec!["Age in decades", "Weight (kg)", "Asian"]
        );
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = ExperimentConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            ExperimentConfig {
                runs: 0,
                ..Default::default()
            },
            ExperimentConfig {
                alpha: -1.0,
                ..Default::default()
            },
            ExperimentConfig {
                ep: 0.0,
                ..Default::default()
            },
            ExperimentConfig {
                v2: f64::NAN,
                ..Default::default()
            },
            ExperimentConfig {
                features: Vec::new(),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(BanditError::InvalidParameter { .. })
            ));
        }
    }
}
