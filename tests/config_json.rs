#![cfg(feature = "serde")]

use survey_classifier::{
    Execution, FeatureWeighting, HyperparameterGrid, Matrix, MetricsSummary, Preprocessing,
    StratifiedSplitter, TrainerConfig,
};

#[test]
fn partial_config_fills_in_defaults() {
    let json = r#"{ "preprocessing": "scale_and_weight", "grid": { "max_iters": [50] } }"#;
    let config: TrainerConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.preprocessing, Preprocessing::ScaleAndWeight);
    assert_eq!(config.folds, 5);
    assert_eq!(config.seed, StratifiedSplitter::DEFAULT_SEED);
    assert_eq!(config.execution, Execution::Sequential);
    assert_eq!(config.grid.max_iters, vec![50]);
    assert_eq!(config.grid.lambdas, HyperparameterGrid::default().lambdas);
    assert!(config.validate().is_ok());
}

#[test]
fn survey_preset_survives_json() {
    let config = TrainerConfig::survey();
    let json = serde_json::to_string(&config).unwrap();
    let back: TrainerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn metrics_summary_serializes_by_field_name() {
    let summary = MetricsSummary {
        accuracy: 0.5,
        recall: 0.25,
        precision: 1.0,
        f1: 0.4,
    };
    let value = serde_json::to_value(summary).unwrap();
    assert_eq!(value["accuracy"], 0.5);
    assert_eq!(value["f1"], 0.4);
}

#[test]
fn reversed_weighting_range_is_rejected_on_load() {
    let json = r#"{
        "preprocessing": "weight",
        "weighting": { "start": 2, "end": 1, "factor": 10.0 }
    }"#;
    let err = serde_json::from_str::<TrainerConfig>(json).unwrap_err();
    assert!(err.to_string().contains("reversed"), "{err}");

    let ok: FeatureWeighting =
        serde_json::from_str(r#"{ "start": 1, "end": 2, "factor": 10.0 }"#).unwrap();
    assert_eq!(ok.columns(), 1..2);
}

#[test]
fn matrix_buffer_must_match_its_shape() {
    let err = serde_json::from_str::<Matrix>(r#"{ "data": [1.0], "rows": 2, "cols": 2 }"#)
        .unwrap_err();
    assert!(err.to_string().contains("buffer length"), "{err}");

    let m: Matrix =
        serde_json::from_str(r#"{ "data": [1.0, 2.0, 3.0, 4.0], "rows": 2, "cols": 2 }"#).unwrap();
    assert_eq!(m.row(1), &[3.0, 4.0]);
    assert_eq!(serde_json::from_str::<Matrix>(&serde_json::to_string(&m).unwrap()).unwrap(), m);
}
