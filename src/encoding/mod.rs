//! Streaming feature encoding
//!
//! The encoding module turns a stream of mixed-type records into fixed-width
//! numeric vectors:
//! - schema inference over a bounded sample ([`schema`])
//! - single-pass imputation/normalization statistics ([`stats`])
//! - deterministic categorical vocabularies ([`vocab`])
//! - contiguous numeric + one-hot layout ([`layout`])
//! - the pure row encoder shared by training and inference ([`encoder`])

mod encoder;
mod layout;
mod schema;
mod stats;
mod vocab;

pub use encoder::encode_row;
pub use layout::{Block, LayoutPlan};
pub use schema::infer_schema;
pub use stats::{NumericAccumulator, NumericStats};
pub use vocab::{VocabAccumulator, Vocabulary, MISSING_TOKEN};

use crate::error::{Result, TabrixError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Feature kind, fixed at schema inference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

/// One named feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
}

impl Feature {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical,
        }
    }
}

/// Ordered feature schema. Names are unique; order is fixed at inference
/// time and never changes for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    features: Vec<Feature>,
}

impl FeatureSchema {
    pub fn new(features: Vec<Feature>) -> Result<Self> {
        let mut seen = HashSet::new();
        for feature in &features {
            if !seen.insert(feature.name.as_str()) {
                return Err(TabrixError::Schema(format!(
                    "duplicate column name: {}",
                    feature.name
                )));
            }
        }
        Ok(Self { features })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Numeric feature names in schema order.
    pub fn numeric_names(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Numeric)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Categorical feature names in schema order.
    pub fn categorical_names(&self) -> Vec<String> {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Categorical)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn numeric_count(&self) -> usize {
        self.features
            .iter()
            .filter(|f| f.kind == FeatureKind::Numeric)
            .count()
    }
}

/// Numeric scaling variant.
///
/// `Standard` is canonical: z-normalization with missing values encoding to
/// zero. `MeanOnly` keeps raw values and mean-imputes the missing ones; it
/// exists as an explicit mode, not a merged behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    Standard,
    MeanOnly,
}

/// Configuration for schema inference and encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Numeric scaling variant.
    pub scaling: ScalingMode,

    /// Number of rows sampled for schema inference.
    pub schema_sample_rows: usize,

    /// Fail on mixed-type columns instead of downgrading them to categorical.
    pub strict_schema: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            scaling: ScalingMode::Standard,
            schema_sample_rows: 64,
            strict_schema: false,
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the scaling mode
    pub fn with_scaling(mut self, scaling: ScalingMode) -> Self {
        self.scaling = scaling;
        self
    }

    /// Builder method to set the schema sample size
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.schema_sample_rows = rows;
        self
    }

    /// Builder method to enable strict schema typing
    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec![
            Feature::numeric("age"),
            Feature::categorical("age"),
        ]);
        assert!(matches!(result, Err(TabrixError::Schema(_))));
    }

    #[test]
    fn test_schema_order_and_partition() {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("age"),
            Feature::categorical("city"),
            Feature::numeric("income"),
        ])
        .unwrap();

        assert_eq!(schema.numeric_names(), vec!["age", "income"]);
        assert_eq!(schema.categorical_names(), vec!["city"]);
        assert_eq!(schema.numeric_count(), 2);
    }

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::new()
            .with_scaling(ScalingMode::MeanOnly)
            .with_sample_rows(128)
            .with_strict_schema(true);

        assert_eq!(config.scaling, ScalingMode::MeanOnly);
        assert_eq!(config.schema_sample_rows, 128);
        assert!(config.strict_schema);
    }
}
