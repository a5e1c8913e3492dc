//! dosebandit: evaluate warfarin dosing policies on a patient dataset.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dosebandit::config::ExperimentConfig;
use dosebandit::data::Dataset;
use dosebandit::experiment::run_experiment;
use dosebandit::report::{FIGURE_FILE, collect_series, plot_fraction_incorrect, write_series};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dosebandit")]
#[command(about = "Compare warfarin dosing policies with contextual bandits")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preprocessed patient CSV (overrides config)
    #[arg(long, env = "DOSEBANDIT__DATA")]
    data: Option<PathBuf>,

    /// Column holding the therapeutic weekly dose (overrides config)
    #[arg(long)]
    label_column: Option<String>,

    /// Directory for per-policy series and the figure (overrides config)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    // Boolean flags take an optional value: `--run-linucb` enables,
    // `--run-linucb=false` disables a policy the config file selected.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    run_fixed: Option<bool>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    run_clinical: Option<bool>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    run_random: Option<bool>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    run_linucb: Option<bool>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    run_egreedy: Option<bool>,

    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    run_thompson: Option<bool>,

    /// LinUCB exploration weight
    #[arg(long)]
    alpha: Option<f64>,

    /// Use the square-root LinUCB bonus
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    sqrt_bonus: Option<bool>,

    /// Epsilon scale of the epsilon-greedy policy
    #[arg(long)]
    ep: Option<f64>,

    /// Thompson sampling variance multiplier
    #[arg(long)]
    v2: Option<f64>,

    /// Independent runs per policy
    #[arg(long)]
    runs: Option<usize>,

    /// Reward for choosing low instead of high or the reverse
    #[arg(long, allow_hyphen_values = true)]
    large_error_penalty: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long, env = "DOSEBANDIT__SEED")]
    seed: Option<u64>,

    /// Write series files but skip the figure
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    no_plot: Option<bool>,
}

impl Cli {
    fn apply(self, config: &mut ExperimentConfig) {
        if let Some(data) = self.data {
            config.data = data;
        }
        if let Some(label_column) = self.label_column {
            config.label_column = label_column;
        }
        if let Some(results_dir) = self.results_dir {
            config.results_dir = results_dir;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(ep) = self.ep {
            config.ep = ep;
        }
        if let Some(v2) = self.v2 {
            config.v2 = v2;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(penalty) = self.large_error_penalty {
            config.large_error_penalty = penalty;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(sqrt_bonus) = self.sqrt_bonus {
            config.sqrt_bonus = sqrt_bonus;
        }
        if let Some(no_plot) = self.no_plot {
            config.plot = !no_plot;
        }

        let policies = &mut config.policies;
        let toggles = [
            (&mut policies.fixed, self.run_fixed),
            (&mut policies.clinical, self.run_clinical),
            (&mut policies.random, self.run_random),
            (&mut policies.linucb, self.run_linucb),
            (&mut policies.egreedy, self.run_egreedy),
            (&mut policies.thompson, self.run_thompson),
        ];
        for (selected, flag) in toggles {
            if let Some(flag) = flag {
                *selected = flag;
            }
        }
    }

    /// Config file, then `DOSEBANDIT__*` variables (`env`, or the process
    /// environment when `None`), then flags.
    fn resolve(
        self,
        env: Option<config::Map<String, String>>,
    ) -> anyhow::Result<ExperimentConfig> {
        let mut config = ExperimentConfig::load_from(self.config.as_deref(), env)
            .with_context(|| match &self.config {
                Some(path) => format!("failed to load config from {}", path.display()),
                None => "failed to load config from environment".to_string(),
            })?;
        self.apply(&mut config);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dosebandit=info".into()),
        )
        .init();

    let config = Cli::parse().resolve(None)?;

    info!(
        data = %config.data.display(),
        results_dir = %config.results_dir.display(),
        runs = config.runs,
        alpha = config.alpha,
        ep = config.ep,
        v2 = config.v2,
        large_error_penalty = config.large_error_penalty,
        seed = ?config.seed,
        "configuration loaded"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    if config.policies.any() {
        let dataset = Dataset::from_path(&config.data, &config.label_column)
            .with_context(|| format!("failed to load {}", config.data.display()))?;
        let summaries = run_experiment(&dataset, &config, &mut rng)?;

        for summary in &summaries {
            info!(
                policy = summary.name(),
                mean_total_fraction_correct = summary.mean_total_fraction_correct(),
                mean_fraction_egregious = summary.mean_fraction_egregious(),
                "policy finished"
            );
            write_series(
                &config.results_dir,
                summary.name(),
                &summary.mean_fraction_incorrect,
            )
            .with_context(|| format!("failed to write results for {}", summary.name()))?;
        }
    } else {
        warn!("no policy selected; plotting existing results only");
    }

    if config.plot {
        if !config.results_dir.is_dir() {
            warn!(results_dir = %config.results_dir.display(), "no results to plot");
            return Ok(());
        }
        let series = collect_series(&config.results_dir).context("failed to read results")?;
        plot_fraction_incorrect(&config.results_dir.join(FIGURE_FILE), &series)
            .context("failed to draw figure")?;
    }

    Ok(())
}
