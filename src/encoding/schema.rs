//! Schema inference over a bounded row sample

use super::{EncoderConfig, Feature, FeatureKind, FeatureSchema};
use crate::data::{RawValue, Record};
use crate::error::{Result, TabrixError};
use tracing::warn;

/// Infer a feature schema from a sample of records.
///
/// `columns` fixes the feature order: source column order, minus whatever the
/// caller already stripped (label and id columns). A column is classified
/// Numeric only when every non-null sampled value is a number; a column whose
/// sampled values are all null defaults to Categorical, where the sentinel
/// token carries it. Mixed columns are downgraded to Categorical with a
/// warning, or rejected when `strict_schema` is set.
///
/// Fails with a schema error when the sample is empty: type inference needs
/// at least one row.
pub fn infer_schema(
    columns: &[String],
    sample: &[Record],
    config: &EncoderConfig,
) -> Result<FeatureSchema> {
    if sample.is_empty() {
        return Err(TabrixError::Schema(
            "no rows available to infer schema from".to_string(),
        ));
    }

    let mut features = Vec::with_capacity(columns.len());
    for name in columns {
        let kind = classify_column(name, sample, config.strict_schema)?;
        features.push(Feature {
            name: name.clone(),
            kind,
        });
    }

    FeatureSchema::new(features)
}

fn classify_column(name: &str, sample: &[Record], strict: bool) -> Result<FeatureKind> {
    let mut numeric = 0usize;
    let mut textual = 0usize;

    for record in sample {
        match record.get(name) {
            Some(RawValue::Number(_)) => numeric += 1,
            Some(RawValue::Text(_)) => textual += 1,
            Some(RawValue::Null) | None => {}
        }
    }

    match (numeric, textual) {
        (n, 0) if n > 0 => Ok(FeatureKind::Numeric),
        (0, _) => Ok(FeatureKind::Categorical),
        (n, t) => {
            if strict {
                return Err(TabrixError::Schema(format!(
                    "column '{name}' has mixed types in sample ({n} numeric, {t} textual)"
                )));
            }
            warn!(
                column = name,
                numeric = n,
                textual = t,
                "mixed-type column downgraded to categorical"
            );
            Ok(FeatureKind::Categorical)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, RawValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_infer_basic() {
        let sample = vec![
            record(&[
                ("age", RawValue::Number(25.0)),
                ("city", RawValue::Text("NYC".into())),
            ]),
            record(&[
                ("age", RawValue::Number(30.0)),
                ("city", RawValue::Text("LA".into())),
            ]),
        ];

        let schema = infer_schema(
            &columns(&["age", "city"]),
            &sample,
            &EncoderConfig::default(),
        )
        .unwrap();

        assert_eq!(schema.numeric_names(), vec!["age"]);
        assert_eq!(schema.categorical_names(), vec!["city"]);
    }

    #[test]
    fn test_empty_sample_fails() {
        let result = infer_schema(&columns(&["age"]), &[], &EncoderConfig::default());
        assert!(matches!(result, Err(TabrixError::Schema(_))));
    }

    #[test]
    fn test_nulls_do_not_break_consensus() {
        let sample = vec![
            record(&[("age", RawValue::Number(25.0))]),
            record(&[("age", RawValue::Null)]),
        ];

        let schema =
            infer_schema(&columns(&["age"]), &sample, &EncoderConfig::default()).unwrap();
        assert_eq!(schema.features()[0].kind, FeatureKind::Numeric);
    }

    #[test]
    fn test_all_null_column_is_categorical() {
        let sample = vec![record(&[("blank", RawValue::Null)])];

        let schema =
            infer_schema(&columns(&["blank"]), &sample, &EncoderConfig::default()).unwrap();
        assert_eq!(schema.features()[0].kind, FeatureKind::Categorical);
    }

    #[test]
    fn test_mixed_column_lenient_downgrades() {
        let sample = vec![
            record(&[("code", RawValue::Number(7.0))]),
            record(&[("code", RawValue::Text("A7".into()))]),
        ];

        let schema =
            infer_schema(&columns(&["code"]), &sample, &EncoderConfig::default()).unwrap();
        assert_eq!(schema.features()[0].kind, FeatureKind::Categorical);
    }

    #[test]
    fn test_mixed_column_strict_fails() {
        let sample = vec![
            record(&[("code", RawValue::Number(7.0))]),
            record(&[("code", RawValue::Text("A7".into()))]),
        ];

        let config = EncoderConfig::default().with_strict_schema(true);
        let result = infer_schema(&columns(&["code"]), &sample, &config);
        assert!(matches!(result, Err(TabrixError::Schema(_))));
    }
}
