//! Tests for probe training and report export

use candle_core::Device;
use comaze_probe::{
    Error, GoalOrderingPredictionMetric, HiddenStatePolicy, MetricConfig, ProbeBatch,
    ProbeTrainer,
    adapters::RecurrentPolicy,
    cli::synthetic::{SYNTHETIC_OBS_DIM, SyntheticEpisodes},
    export::ReportExporter,
};

fn setup(actors: usize) -> (GoalOrderingPredictionMetric<RecurrentPolicy>, MetricConfig) {
    let config = MetricConfig::new()
        .with_hidden_units(32)
        .with_learning_rate(1e-2);
    let policy = RecurrentPolicy::new(SYNTHETIC_OBS_DIM, 24, actors, &Device::Cpu).unwrap();
    let metric = GoalOrderingPredictionMetric::new(policy, &config).unwrap();
    (metric, config)
}

/// Test that repeated steps on a fixed batch reduce the probe loss
#[test]
fn test_training_reduces_loss() {
    let batch = SyntheticEpisodes::new(4, 6)
        .with_noise(0.1)
        .with_seed(42)
        .generate()
        .unwrap();
    let (mut metric, config) = setup(4);
    let mut trainer = ProbeTrainer::new(&metric, &config, false).unwrap();

    let (first, _) = trainer.step(&mut metric, &batch).unwrap();
    let mut last = first;
    for _ in 0..40 {
        last = trainer.step(&mut metric, &batch).unwrap().0;
    }

    assert_eq!(trainer.steps(), 41);
    assert!(
        last.total < first.total,
        "loss did not decrease: {} -> {}",
        first.total,
        last.total
    );
    assert!((last.total - (last.l_gop + last.l_rp)).abs() < 1e-4);
}

/// Test that frozen training leaves the policy parameters unchanged
#[test]
fn test_frozen_training_keeps_policy_weights() {
    let batch = SyntheticEpisodes::new(2, 4).with_seed(1).generate().unwrap();
    let (mut metric, config) = setup(2);
    let before: Vec<Vec<f32>> = metric
        .policy()
        .trainable_vars()
        .iter()
        .map(|v| v.as_tensor().flatten_all().unwrap().to_vec1().unwrap())
        .collect();

    let mut trainer = ProbeTrainer::new(&metric, &config, false).unwrap();
    for _ in 0..3 {
        trainer.step(&mut metric, &batch).unwrap();
    }

    let after: Vec<Vec<f32>> = metric
        .policy()
        .trainable_vars()
        .iter()
        .map(|v| v.as_tensor().flatten_all().unwrap().to_vec1().unwrap())
        .collect();
    assert_eq!(before, after);
}

/// Test that biasing training also updates the policy parameters
#[test]
fn test_biasing_training_updates_policy_weights() {
    let batch = SyntheticEpisodes::new(2, 4).with_seed(2).generate().unwrap();
    let (mut metric, config) = setup(2);
    let input_weight = |m: &GoalOrderingPredictionMetric<RecurrentPolicy>| -> Vec<f32> {
        let vars = m.policy().varmap().data().lock().unwrap();
        vars["input.weight"]
            .as_tensor()
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap()
    };
    let before = input_weight(&metric);

    let mut trainer = ProbeTrainer::new(&metric, &config, true).unwrap();
    assert!(trainer.biasing());
    trainer.step(&mut metric, &batch).unwrap();

    assert_ne!(before, input_weight(&metric));
}

/// Test rejection of an empty batch
#[test]
fn test_empty_batch_rejected() {
    let (mut metric, config) = setup(1);
    let mut trainer = ProbeTrainer::new(&metric, &config, false).unwrap();
    let err = trainer.step(&mut metric, &ProbeBatch::new()).unwrap_err();
    assert!(matches!(err, Error::EmptyBatch));
}

/// Test JSON and CSV export of a metric report
#[test]
fn test_report_export_roundtrip() {
    let batch = SyntheticEpisodes::new(3, 5).with_seed(9).generate().unwrap();
    let (mut metric, _) = setup(3);
    let report = metric.evaluate(&batch, false).unwrap().report().unwrap();
    assert_eq!(report.summary.actors, 3);

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("report.json");
    let csv_path = dir.path().join("report.csv");

    ReportExporter::write_json(&report, &json_path).unwrap();
    let loaded = ReportExporter::read_json(&json_path).unwrap();
    assert_eq!(loaded.actors.len(), 3);
    assert_eq!(loaded.summary.actors, 3);

    ReportExporter::write_csv(&report, &csv_path).unwrap();
    let rows = ReportExporter::read_csv(&csv_path).unwrap();
    assert_eq!(rows.len(), 3);
    for (row, actor) in rows.iter().zip(&report.actors) {
        assert_eq!(row.actor, actor.actor);
        assert_eq!(row.gop_q1, actor.gop.q1);
        assert_eq!(row.rp_iqr, actor.rp.iqr);
    }

    let header = std::fs::read_to_string(&csv_path).unwrap();
    assert!(header.starts_with("actor,l_gop,gop_accuracy,gop_q1,gop_median,gop_q3,gop_iqr,l_rp"));
}
