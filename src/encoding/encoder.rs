//! The shared row encoder

use super::ScalingMode;
use crate::artifact::Artifact;
use crate::data::Record;

/// Encode one raw record into a fixed-length vector of `artifact.total_dim()`
/// floats.
///
/// This is the single encoding path for both training-batch construction and
/// inference; it is a pure function of `(record, artifact)` with no hidden
/// state, so the same inputs always produce the same vector, across calls and
/// across process restarts.
///
/// Per-row issues are policies, not errors: a missing or non-numeric value in
/// a numeric slot is mean-imputed (which is 0 after standard scaling), and an
/// unseen or missing categorical token falls back to the sentinel's one-hot
/// index. Exactly one cell is written per numeric feature and exactly one
/// cell is set per categorical block.
pub fn encode_row(record: &Record, artifact: &Artifact) -> Vec<f64> {
    let mut out = vec![0.0; artifact.total_dim()];

    let stds = artifact.numeric_stds.as_deref();
    for (slot, (name, &mean)) in artifact
        .numeric_feature_names
        .iter()
        .zip(artifact.numeric_means.iter())
        .enumerate()
    {
        let raw = record.get(name).and_then(|v| v.as_finite());
        out[slot] = match artifact.scaling {
            ScalingMode::Standard => {
                let std = stds.and_then(|s| s.get(slot)).copied().unwrap_or(1.0);
                match raw {
                    Some(x) => (x - mean) / std,
                    None => 0.0,
                }
            }
            ScalingMode::MeanOnly => raw.unwrap_or(mean),
        };
    }

    for name in &artifact.categorical_feature_names {
        let (Some(block), Some(vocab)) =
            (artifact.layout.block(name), artifact.vocabularies.get(name))
        else {
            continue;
        };
        let index = match record.get(name).and_then(|v| v.as_token()) {
            Some(token) => vocab
                .index_of(&token)
                .unwrap_or_else(|| vocab.sentinel_index()),
            None => vocab.sentinel_index(),
        };
        if index < block.size {
            out[block.offset + index] = 1.0;
        }
    }

    out
}
