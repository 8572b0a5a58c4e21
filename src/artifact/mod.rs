//! Persisted preprocessing artifact
//!
//! The artifact is the sole channel between training and inference: schema,
//! numeric statistics, vocabularies, and the layout plan travel together as
//! one structured record. Loading it back reproduces training-time encoding
//! exactly.

use crate::encoding::{
    Feature, FeatureKind, FeatureSchema, LayoutPlan, NumericStats, ScalingMode, Vocabulary,
};
use crate::error::{Result, TabrixError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

/// The serializable bundle of fitted preprocessing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub scaling: ScalingMode,

    /// All feature names in schema order.
    pub feature_names: Vec<String>,
    /// Numeric feature names in schema order; slot = position.
    pub numeric_feature_names: Vec<String>,
    /// Categorical feature names in schema order.
    pub categorical_feature_names: Vec<String>,

    /// Imputation means, aligned with `numeric_feature_names`.
    pub numeric_means: Vec<f64>,
    /// Normalization stds, aligned with `numeric_feature_names`. Present in
    /// `Standard` mode, absent in `MeanOnly`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_stds: Option<Vec<f64>>,

    /// Sorted token sequences per categorical feature, sentinel included.
    pub vocabularies: BTreeMap<String, Vocabulary>,
    pub layout: LayoutPlan,
}

impl Artifact {
    /// Assemble an artifact from frozen pipeline state.
    pub fn new(
        schema: &FeatureSchema,
        stats: NumericStats,
        vocabularies: BTreeMap<String, Vocabulary>,
        scaling: ScalingMode,
    ) -> Self {
        let layout = LayoutPlan::plan(schema, &vocabularies);
        let numeric_stds = match scaling {
            ScalingMode::Standard => Some(stats.stds),
            ScalingMode::MeanOnly => None,
        };

        Self {
            version: ARTIFACT_VERSION,
            created_at: Utc::now(),
            scaling,
            feature_names: schema.features().iter().map(|f| f.name.clone()).collect(),
            numeric_feature_names: stats.names,
            categorical_feature_names: schema.categorical_names(),
            numeric_means: stats.means,
            numeric_stds,
            vocabularies,
            layout,
        }
    }

    /// Reconstruct the feature schema from the persisted name lists.
    pub fn schema(&self) -> Result<FeatureSchema> {
        let numeric: HashSet<&str> = self.numeric_feature_names.iter().map(String::as_str).collect();
        let features = self
            .feature_names
            .iter()
            .map(|name| Feature {
                name: name.clone(),
                kind: if numeric.contains(name.as_str()) {
                    FeatureKind::Numeric
                } else {
                    FeatureKind::Categorical
                },
            })
            .collect();
        FeatureSchema::new(features)
    }

    pub fn total_dim(&self) -> usize {
        self.layout.total_dim()
    }

    /// Persist to a JSON file. The artifact is validated first so a corrupt
    /// bundle is caught at the producer, not at the next inference run.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON file, rebuild derived vocabulary indexes, and
    /// validate structural consistency.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TabrixError::ArtifactNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let mut artifact: Self = serde_json::from_str(&json)
            .map_err(|e| TabrixError::ArtifactCorrupt(e.to_string()))?;
        for vocab in artifact.vocabularies.values_mut() {
            vocab.rebuild_index();
        }
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check internal consistency: name partition, stat alignment, sentinel
    /// presence, and layout arithmetic.
    pub fn validate(&self) -> Result<()> {
        let corrupt = |msg: String| TabrixError::ArtifactCorrupt(msg);

        if self.version != ARTIFACT_VERSION {
            return Err(corrupt(format!("unsupported artifact version {}", self.version)));
        }

        let names: HashSet<&str> = self.feature_names.iter().map(String::as_str).collect();
        if names.len() != self.feature_names.len() {
            return Err(corrupt("duplicate feature names".to_string()));
        }
        if self.numeric_feature_names.len() + self.categorical_feature_names.len()
            != self.feature_names.len()
        {
            return Err(corrupt(
                "numeric/categorical partition does not cover the feature list".to_string(),
            ));
        }
        for name in self
            .numeric_feature_names
            .iter()
            .chain(self.categorical_feature_names.iter())
        {
            if !names.contains(name.as_str()) {
                return Err(corrupt(format!("unknown feature in partition: {name}")));
            }
        }

        if self.numeric_means.len() != self.numeric_feature_names.len() {
            return Err(corrupt(format!(
                "means misaligned: {} means for {} numeric features",
                self.numeric_means.len(),
                self.numeric_feature_names.len()
            )));
        }
        match (&self.scaling, &self.numeric_stds) {
            (ScalingMode::Standard, None) => {
                return Err(corrupt("standard scaling artifact is missing stds".to_string()));
            }
            (ScalingMode::Standard, Some(stds)) => {
                if stds.len() != self.numeric_feature_names.len() {
                    return Err(corrupt("stds misaligned with numeric features".to_string()));
                }
                if stds.iter().any(|s| !s.is_finite() || *s <= 0.0) {
                    return Err(corrupt("stds must be finite and positive".to_string()));
                }
            }
            (ScalingMode::MeanOnly, _) => {}
        }

        // Vocabularies must cover exactly the categorical features and carry
        // the sentinel in sorted, deduplicated order.
        if self.vocabularies.len() != self.categorical_feature_names.len() {
            return Err(corrupt("vocabulary set does not match categorical features".to_string()));
        }
        for name in &self.categorical_feature_names {
            let vocab = self
                .vocabularies
                .get(name)
                .ok_or_else(|| corrupt(format!("missing vocabulary for {name}")))?;
            if !vocab.contains_sentinel() {
                return Err(corrupt(format!("vocabulary for {name} is missing the sentinel")));
            }
            let tokens = vocab.tokens();
            if tokens.windows(2).any(|w| w[0] >= w[1]) {
                return Err(corrupt(format!("vocabulary for {name} is not sorted and unique")));
            }
        }

        // Layout arithmetic: numeric prefix, then contiguous non-overlapping
        // blocks in schema order, total covered exactly.
        if self.layout.numeric_count() != self.numeric_feature_names.len() {
            return Err(corrupt("layout numeric count disagrees with schema".to_string()));
        }
        let mut offset = self.layout.numeric_count();
        for name in &self.categorical_feature_names {
            let block = self
                .layout
                .block(name)
                .ok_or_else(|| corrupt(format!("missing layout block for {name}")))?;
            if block.offset != offset {
                return Err(corrupt(format!(
                    "layout block for {name} starts at {} instead of {offset}",
                    block.offset
                )));
            }
            let vocab_size = self.vocabularies.get(name).map(Vocabulary::len).unwrap_or(0);
            if block.size != vocab_size {
                return Err(corrupt(format!(
                    "layout block for {name} is {} wide but the vocabulary has {vocab_size} tokens",
                    block.size
                )));
            }
            offset += block.size;
        }
        if offset != self.layout.total_dim() {
            return Err(corrupt(format!(
                "stated total_dim {} disagrees with component widths {offset}",
                self.layout.total_dim()
            )));
        }

        Ok(())
    }
}
