//! Trainable models
//!
//! The pipeline consumes the model through a narrow contract:
//! `fit(batches, epochs)`, `predict_proba(vectors) -> probabilities`, and
//! file persistence. [`mlp::MlpClassifier`] is the shipped implementation.

pub mod mlp;

pub use mlp::{MlpClassifier, MlpConfig, TrainBatch};
