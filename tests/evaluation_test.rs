//! End-to-end evaluation over CSV data

use dosebandit::config::{ExperimentConfig, PolicySelection};
use dosebandit::evaluation::{Outcome, run, run_in_order};
use dosebandit::experiment::{PolicyKind, run_experiment};
use dosebandit::prelude::*;
use dosebandit::report::{FIGURE_FILE, collect_series, plot_fraction_incorrect, write_series};
use dosebandit::trial::{BASE_FEATURES, GENOTYPE_FEATURES};
use dosebandit::{Dataset, data::LABEL_COLUMN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic patients whose dose grows with weight and shrinks with age.
fn synthetic_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns: Vec<&str> = BASE_FEATURES.to_vec();
    columns.extend(GENOTYPE_FEATURES);
    columns.push(LABEL_COLUMN);

    let mut out = columns.join(",");
    out.push('\n');
    for _ in 0..rows {
        let age: f64 = rng.random_range(2.0..9.0);
        let weight: f64 = rng.random_range(45.0..120.0);
        let race = rng.random_range(0..4);
        let male = rng.random_range(0..2);
        let mut values = vec![
            age,
            rng.random_range(150.0..195.0),
            weight,
            male as f64,
            (1 - male) as f64,
            (race == 0) as u8 as f64,
            (race == 1) as u8 as f64,
            (race == 2) as u8 as f64,
            (race == 3) as u8 as f64,
            0.0,
            0.0,
            0.0,
            rng.random_range(0..2) as f64,
        ];
        values.extend((0..GENOTYPE_FEATURES.len()).map(|_| rng.random_range(0..2) as f64));
        values.push((weight * 0.6 - age * 3.0).max(5.0));

        let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn dataset(rows: usize) -> Dataset {
    Dataset::from_reader(synthetic_csv(rows, 7).as_bytes(), LABEL_COLUMN).unwrap()
}

#[test]
fn test_deterministic_policies_repeat_exactly() {
    let data = dataset(200);
    let mut order: Vec<usize> = (0..data.len()).collect();
    rand::seq::SliceRandom::shuffle(order.as_mut_slice(), &mut StdRng::seed_from_u64(99));

    let mut rng = StdRng::seed_from_u64(0);
    let mut policies: Vec<Box<dyn Policy>> = vec![Box::new(FixedDose), Box::new(ClinicalDosing)];
    for policy in &mut policies {
        let first = run_in_order(data.trials(), &order, policy, -1.0, &mut rng).unwrap();
        let second = run_in_order(data.trials(), &order, policy, -1.0, &mut rng).unwrap();
        assert_eq!(
            first.fraction_incorrect_per_time,
            second.fraction_incorrect_per_time
        );
        assert_eq!(first.trials(), 200);
    }
}

#[test]
fn test_egregious_only_between_extremes() {
    for predicted in DoseClass::ALL {
        for truth in DoseClass::ALL {
            let outcome = Outcome::score(predicted, truth, -10.0);
            let extremes = matches!(
                (predicted, truth),
                (DoseClass::Low, DoseClass::High) | (DoseClass::High, DoseClass::Low)
            );
            assert_eq!(outcome.egregious, extremes, "{predicted} vs {truth}");
            if predicted == DoseClass::Medium || truth == DoseClass::Medium {
                assert!(!outcome.egregious);
            }
        }
    }

    // Fixed always says high, so egregious errors equal the number of low patients
    let data = dataset(150);
    let mut rng = StdRng::seed_from_u64(4);
    let result = run(data.trials(), &mut FixedDose, -1.0, &mut rng).unwrap();
    assert_eq!(result.egregious_errors, data.class_counts()[0]);
}

#[test]
fn test_learned_policies_run_over_dataset() {
    let data = dataset(300);
    let mut rng = StdRng::seed_from_u64(21);
    let config = ExperimentConfig::default();

    for kind in [PolicyKind::LinUcb, PolicyKind::EGreedy, PolicyKind::Thompson] {
        let mut policy = kind.build(&config).unwrap();
        let result = run(data.trials(), &mut policy, -1.0, &mut rng).unwrap();
        assert_eq!(result.trials(), 300);
        assert!(
            result
                .fraction_incorrect_per_time
                .iter()
                .all(|f| (0.0..=1.0).contains(f))
        );
        assert!((result.total_fraction_correct + result.fraction_incorrect_per_time[299] - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_experiment_writes_results_and_figure() {
    let dir = tempfile::tempdir().unwrap();
    let data = dataset(120);
    let config = ExperimentConfig {
        runs: 2,
        seed: Some(5),
        results_dir: dir.path().to_path_buf(),
        policies: PolicySelection {
            fixed: true,
            clinical: true,
            linucb: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut rng = StdRng::seed_from_u64(5);
    let summaries = run_experiment(&data, &config, &mut rng).unwrap();
    let names: Vec<_> = summaries.iter().map(|s| s.name()).collect();
    assert_eq!(names, ["Fixed", "Clinical", "LinUCB"]);

    for summary in &summaries {
        assert_eq!(summary.runs.len(), 2);
        assert_eq!(summary.mean_fraction_incorrect.len(), 120);
        write_series(dir.path(), summary.name(), &summary.mean_fraction_incorrect).unwrap();
    }

    let series = collect_series(dir.path()).unwrap();
    assert_eq!(series.len(), 3);
    let figure = dir.path().join(FIGURE_FILE);
    plot_fraction_incorrect(&figure, &series).unwrap();
    assert!(figure.exists());
}
