//! Feature vector layout planning

use super::{FeatureSchema, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One categorical feature's one-hot block in the encoded vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub offset: usize,
    pub size: usize,
}

/// Deterministic contiguous layout: numeric scalars occupy slots
/// `[0, numeric_count)` in schema order, followed by one fixed-width one-hot
/// block per categorical feature in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    numeric_count: usize,
    blocks: BTreeMap<String, Block>,
    total_dim: usize,
}

impl LayoutPlan {
    /// Plan the layout from the schema and the vocabulary sizes.
    ///
    /// Pure and O(categorical feature count). An empty schema yields
    /// `total_dim = 0`, a legal degenerate case.
    pub fn plan(schema: &FeatureSchema, vocabularies: &BTreeMap<String, Vocabulary>) -> Self {
        let numeric_count = schema.numeric_count();
        let mut blocks = BTreeMap::new();
        let mut offset = numeric_count;

        for name in schema.categorical_names() {
            let size = vocabularies.get(&name).map(Vocabulary::len).unwrap_or(0);
            blocks.insert(name, Block { offset, size });
            offset += size;
        }

        Self {
            numeric_count,
            blocks,
            total_dim: offset,
        }
    }

    pub fn numeric_count(&self) -> usize {
        self.numeric_count
    }

    pub fn block(&self, name: &str) -> Option<Block> {
        self.blocks.get(name).copied()
    }

    pub fn blocks(&self) -> &BTreeMap<String, Block> {
        &self.blocks
    }

    pub fn total_dim(&self) -> usize {
        self.total_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{Feature, VocabAccumulator, MISSING_TOKEN};

    fn vocab(tokens: &[&str]) -> Vocabulary {
        let mut all: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        all.push(MISSING_TOKEN.to_string());
        all.sort();
        Vocabulary::from_sorted(all)
    }

    #[test]
    fn test_numeric_prefix_then_blocks() {
        let schema = FeatureSchema::new(vec![
            Feature::numeric("age"),
            Feature::categorical("city"),
            Feature::numeric("income"),
            Feature::categorical("tier"),
        ])
        .unwrap();

        let mut vocabs = BTreeMap::new();
        vocabs.insert("city".to_string(), vocab(&["LA", "NYC"]));
        vocabs.insert("tier".to_string(), vocab(&["gold"]));

        let plan = LayoutPlan::plan(&schema, &vocabs);

        assert_eq!(plan.numeric_count(), 2);
        assert_eq!(plan.block("city"), Some(Block { offset: 2, size: 3 }));
        assert_eq!(plan.block("tier"), Some(Block { offset: 5, size: 2 }));
        assert_eq!(plan.total_dim(), 7);
    }

    #[test]
    fn test_empty_schema() {
        let schema = FeatureSchema::new(vec![]).unwrap();
        let plan = LayoutPlan::plan(&schema, &BTreeMap::new());
        assert_eq!(plan.total_dim(), 0);
    }

    #[test]
    fn test_blocks_non_overlapping() {
        let schema = FeatureSchema::new(vec![
            Feature::categorical("a"),
            Feature::categorical("b"),
        ])
        .unwrap();

        let mut acc = VocabAccumulator::new(&schema);
        let mut record = std::collections::HashMap::new();
        record.insert("a".to_string(), crate::data::RawValue::Text("x".into()));
        record.insert("b".to_string(), crate::data::RawValue::Text("y".into()));
        acc.observe(&record);

        let vocabs = acc.finalize();
        let plan = LayoutPlan::plan(&schema, &vocabs);

        let a = plan.block("a").unwrap();
        let b = plan.block("b").unwrap();
        assert_eq!(a.offset + a.size, b.offset);
        assert_eq!(b.offset + b.size, plan.total_dim());
    }
}
