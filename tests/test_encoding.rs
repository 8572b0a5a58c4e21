//! Integration test: encoder invariants and artifact round trips

use std::collections::HashMap;

use tabrix::prelude::*;
use tempfile::tempdir;

fn record(pairs: &[(&str, RawValue)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect::<HashMap<_, _>>()
}

/// The rows from the reference scenario: one missing age, one missing city.
fn scenario_rows() -> Vec<Record> {
    vec![
        record(&[
            ("age", RawValue::Number(25.0)),
            ("city", RawValue::Text("NYC".into())),
        ]),
        record(&[("age", RawValue::Null), ("city", RawValue::Text("LA".into()))]),
        record(&[("age", RawValue::Number(35.0)), ("city", RawValue::Null)]),
    ]
}

fn fit_artifact(rows: &[Record], scaling: ScalingMode) -> Artifact {
    let schema = FeatureSchema::new(vec![
        Feature::numeric("age"),
        Feature::categorical("city"),
    ])
    .unwrap();

    let mut stats = NumericAccumulator::new(&schema);
    let mut vocab = VocabAccumulator::new(&schema);
    for row in rows {
        stats.observe(row);
        vocab.observe(row);
    }

    Artifact::new(&schema, stats.finalize().unwrap(), vocab.finalize(), scaling)
}

#[test]
fn test_scenario_statistics_and_vocabulary() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::Standard);

    assert_eq!(artifact.numeric_means, vec![30.0]);
    assert_eq!(
        artifact.vocabularies["city"].tokens(),
        &["LA", "NYC", MISSING_TOKEN]
    );
}

#[test]
fn test_scenario_encoding_row_with_missing_age() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::Standard);
    let rows = scenario_rows();

    let v = encode_row(&rows[1], &artifact);
    assert_eq!(v.len(), artifact.total_dim());
    // Missing age mean-imputes, which lands on 0 after standard scaling.
    assert_eq!(v[0], 0.0);
    // One-hot at LA's index.
    let block = artifact.layout.block("city").unwrap();
    let la = artifact.vocabularies["city"].index_of("LA").unwrap();
    assert_eq!(v[block.offset + la], 1.0);
}

#[test]
fn test_encoded_length_is_total_dim_for_all_rows() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::Standard);
    let inputs = vec![
        record(&[]),
        record(&[("age", RawValue::Text("not a number".into()))]),
        record(&[("city", RawValue::Text("Chicago".into()))]),
        record(&[
            ("age", RawValue::Number(-10.0)),
            ("city", RawValue::Text("NYC".into())),
            ("extra", RawValue::Number(99.0)),
        ]),
    ];

    for input in inputs {
        assert_eq!(encode_row(&input, &artifact).len(), artifact.total_dim());
    }
}

#[test]
fn test_exactly_one_hot_per_block_always() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::Standard);
    let block = artifact.layout.block("city").unwrap();

    let inputs = vec![
        record(&[("city", RawValue::Text("NYC".into()))]),
        record(&[("city", RawValue::Text("never seen".into()))]),
        record(&[("city", RawValue::Null)]),
        record(&[("city", RawValue::Number(42.0))]),
        record(&[]),
    ];

    for input in inputs {
        let v = encode_row(&input, &artifact);
        let ones = v[block.offset..block.offset + block.size]
            .iter()
            .filter(|&&x| x == 1.0)
            .count();
        assert_eq!(ones, 1, "block must hold exactly one 1 for {input:?}");
    }
}

#[test]
fn test_unseen_category_falls_back_to_sentinel() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::Standard);

    let v = encode_row(&record(&[("city", RawValue::Text("Chicago".into()))]), &artifact);
    let block = artifact.layout.block("city").unwrap();
    let sentinel = artifact.vocabularies["city"].index_of(MISSING_TOKEN).unwrap();
    assert_eq!(v[block.offset + sentinel], 1.0);
}

#[test]
fn test_vocabulary_deterministic_across_permutations() {
    let rows = scenario_rows();
    let forward = fit_artifact(&rows, ScalingMode::Standard);

    let mut reversed_rows = rows.clone();
    reversed_rows.reverse();
    let reversed = fit_artifact(&reversed_rows, ScalingMode::Standard);

    assert_eq!(forward.vocabularies, reversed.vocabularies);
    assert_eq!(forward.layout, reversed.layout);
    assert_eq!(forward.numeric_means, reversed.numeric_means);
}

#[test]
fn test_encoding_stable_across_save_load() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::Standard);
    let dir = tempdir().unwrap();
    let path = dir.path().join("artifact.json");

    artifact.save(&path).unwrap();
    let reloaded = Artifact::load(&path).unwrap();
    assert_eq!(reloaded, artifact);

    for row in scenario_rows() {
        assert_eq!(encode_row(&row, &artifact), encode_row(&row, &reloaded));
    }
}

#[test]
fn test_roundtrip_with_multiple_categorical_features() {
    let schema = FeatureSchema::new(vec![
        Feature::numeric("age"),
        Feature::categorical("city"),
        Feature::categorical("plan"),
    ])
    .unwrap();

    let rows = vec![
        record(&[
            ("age", RawValue::Number(31.5)),
            ("city", RawValue::Text("SF".into())),
            ("plan", RawValue::Text("pro".into())),
        ]),
        record(&[
            ("age", RawValue::Number(62.25)),
            ("city", RawValue::Text("NYC".into())),
            ("plan", RawValue::Text("free".into())),
        ]),
    ];

    let mut stats = NumericAccumulator::new(&schema);
    let mut vocab = VocabAccumulator::new(&schema);
    for row in &rows {
        stats.observe(row);
        vocab.observe(row);
    }
    let artifact = Artifact::new(
        &schema,
        stats.finalize().unwrap(),
        vocab.finalize(),
        ScalingMode::Standard,
    );

    let dir = tempdir().unwrap();
    let path = dir.path().join("artifact.json");
    artifact.save(&path).unwrap();
    let reloaded = Artifact::load(&path).unwrap();

    // Field-for-field, exact floats included.
    assert_eq!(reloaded, artifact);
    assert_eq!(reloaded.numeric_means, artifact.numeric_means);
    assert_eq!(reloaded.numeric_stds, artifact.numeric_stds);
}

#[test]
fn test_mean_only_mode_imputes_raw_mean() {
    let artifact = fit_artifact(&scenario_rows(), ScalingMode::MeanOnly);
    assert!(artifact.numeric_stds.is_none());

    let v = encode_row(&record(&[("city", RawValue::Null)]), &artifact);
    assert_eq!(v[0], 30.0);

    let v = encode_row(&record(&[("age", RawValue::Number(25.0))]), &artifact);
    assert_eq!(v[0], 25.0);
}
