//! Deterministic categorical vocabularies

use super::FeatureSchema;
use crate::data::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Reserved token representing a missing categorical value.
pub const MISSING_TOKEN: &str = "__MISSING__";

/// A frozen vocabulary for one categorical feature: distinct tokens in byte
/// order, sentinel included, with index = position.
///
/// Serializes as the plain token array; the token→index map is derived state,
/// rebuilt from the sorted sequence alone (as done after artifact load), so
/// rebuilding always reproduces it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    tokens: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Vocabulary {
    /// Build a vocabulary from an already-sorted, deduplicated token
    /// sequence containing the sentinel.
    pub fn from_sorted(tokens: Vec<String>) -> Self {
        let mut vocab = Self {
            tokens,
            index: HashMap::new(),
        };
        vocab.rebuild_index();
        vocab
    }

    /// Recompute the token→index map from the token sequence.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Index of the sentinel token. Every well-formed vocabulary contains it.
    pub fn sentinel_index(&self) -> usize {
        self.index.get(MISSING_TOKEN).copied().unwrap_or(0)
    }

    pub fn contains_sentinel(&self) -> bool {
        self.index.contains_key(MISSING_TOKEN)
    }
}

/// Single-pass collector of distinct categorical tokens.
///
/// Memory is O(total distinct tokens across all categorical features), the
/// one documented exception to the pipeline's O(feature count) accumulator
/// bound.
#[derive(Debug, Clone)]
pub struct VocabAccumulator {
    seen: BTreeMap<String, BTreeSet<String>>,
}

impl VocabAccumulator {
    pub fn new(schema: &FeatureSchema) -> Self {
        let seen = schema
            .categorical_names()
            .into_iter()
            .map(|name| (name, BTreeSet::new()))
            .collect();
        Self { seen }
    }

    /// Fold one record's categorical tokens into the seen sets.
    pub fn observe(&mut self, record: &Record) {
        for (name, tokens) in self.seen.iter_mut() {
            let token = record
                .get(name)
                .and_then(|v| v.as_token())
                .unwrap_or_else(|| MISSING_TOKEN.to_string());
            tokens.insert(token);
        }
    }

    /// Freeze the seen sets into sorted vocabularies.
    ///
    /// The sentinel is inserted even for fully-complete columns so the
    /// unseen-category fallback always has a target. BTreeSet iteration is
    /// byte order, so two runs over the same logical row set produce
    /// identical vocabularies regardless of row order.
    pub fn finalize(self) -> BTreeMap<String, Vocabulary> {
        self.seen
            .into_iter()
            .map(|(name, mut tokens)| {
                tokens.insert(MISSING_TOKEN.to_string());
                let vocab = Vocabulary::from_sorted(tokens.into_iter().collect());
                (name, vocab)
            })
            .collect()
    }
}
