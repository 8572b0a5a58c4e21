//! Training and inference pipeline drivers
//!
//! The training driver composes the streaming passes: schema inference over a
//! peeked sample, one full traversal feeding the statistics and vocabulary
//! accumulators, layout planning, artifact freezing, then a final traversal
//! that encodes training batches for the model. The inference driver replays
//! the persisted artifact over unseen rows. Both paths encode rows through
//! the same pure function.

use crate::artifact::Artifact;
use crate::data::{RawValue, Record, RowSource};
use crate::encoding::{
    encode_row, infer_schema, EncoderConfig, NumericAccumulator, VocabAccumulator,
};
use crate::error::{Result, TabrixError};
use crate::labels::{decode_label, encode_label};
use crate::model::{MlpClassifier, MlpConfig, TrainBatch};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Artifact file name inside a model directory.
pub const ARTIFACT_FILE: &str = "artifact.json";
/// Model file name inside a model directory.
pub const MODEL_FILE: &str = "model.json";

/// Rows encoded per prediction chunk.
const PREDICT_CHUNK: usize = 1024;

/// Training pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Name of the label column
    pub label_column: String,
    /// Optional id column, excluded from features and echoed into predictions
    pub id_column: Option<String>,
    /// Number of training epochs
    pub epochs: usize,
    /// Rows per training batch
    pub batch_size: usize,
    /// Schema inference and encoding options
    pub encoder: EncoderConfig,
    /// Classifier hyperparameters
    pub model: MlpConfig,
}

impl TrainConfig {
    pub fn new(label_column: impl Into<String>) -> Self {
        Self {
            label_column: label_column.into(),
            id_column: None,
            epochs: 30,
            batch_size: 64,
            encoder: EncoderConfig::default(),
            model: MlpConfig::default(),
        }
    }

    /// Builder method to set the id column
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    /// Builder method to set the epoch count
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Builder method to set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Builder method to set encoder options
    pub fn with_encoder(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = encoder;
        self
    }

    /// Builder method to set model hyperparameters
    pub fn with_model(mut self, model: MlpConfig) -> Self {
        self.model = model;
        self
    }
}

/// Summary of a completed training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub rows: usize,
    pub total_dim: usize,
    pub numeric_features: usize,
    pub categorical_features: usize,
    pub epochs: usize,
}

/// End-to-end training driver
pub struct TrainPipeline {
    config: TrainConfig,
}

impl TrainPipeline {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the full training pipeline and persist the artifact and model
    /// into `output_dir`.
    pub fn run(&self, source: &dyn RowSource, output_dir: &Path) -> Result<TrainReport> {
        let config = &self.config;

        let mut columns = source.columns()?;
        if !columns.iter().any(|c| c == &config.label_column) {
            return Err(TabrixError::Data(format!(
                "label column '{}' not present in source",
                config.label_column
            )));
        }
        columns.retain(|c| {
            c != &config.label_column && Some(c.as_str()) != config.id_column.as_deref()
        });

        let sample = source.peek(config.encoder.schema_sample_rows)?;
        let schema = infer_schema(&columns, &sample, &config.encoder)?;
        info!(
            numeric = schema.numeric_count(),
            categorical = schema.len() - schema.numeric_count(),
            "schema inferred"
        );

        // One traversal feeds both accumulators; each owns its own state.
        let mut stats = NumericAccumulator::new(&schema);
        let mut vocab = VocabAccumulator::new(&schema);
        let mut rows_seen = 0usize;
        for record in source.rows()? {
            let record = record?;
            stats.observe(&record);
            vocab.observe(&record);
            rows_seen += 1;
        }

        let artifact = Artifact::new(
            &schema,
            stats.finalize()?,
            vocab.finalize(),
            config.encoder.scaling,
        );
        info!(rows = rows_seen, total_dim = artifact.total_dim(), "artifact frozen");

        let batches = self.build_batches(source, &artifact)?;

        let mut model = MlpClassifier::new(config.model.clone());
        model.fit(&batches, config.epochs)?;

        std::fs::create_dir_all(output_dir)?;
        artifact.save(&output_dir.join(ARTIFACT_FILE))?;
        model.save(&output_dir.join(MODEL_FILE))?;
        info!(dir = %output_dir.display(), "artifact and model persisted");

        Ok(TrainReport {
            rows: rows_seen,
            total_dim: artifact.total_dim(),
            numeric_features: schema.numeric_count(),
            categorical_features: schema.len() - schema.numeric_count(),
            epochs: config.epochs,
        })
    }

    /// Stream the source once more and encode training batches. Encoding is
    /// a pure function of the frozen artifact, so rows within a batch are
    /// encoded in parallel.
    fn build_batches(&self, source: &dyn RowSource, artifact: &Artifact) -> Result<Vec<TrainBatch>> {
        let mut batches = Vec::new();
        let mut buffer: Vec<Record> = Vec::with_capacity(self.config.batch_size);

        for record in source.rows()? {
            buffer.push(record?);
            if buffer.len() == self.config.batch_size {
                batches.push(self.encode_batch(&buffer, artifact)?);
                buffer.clear();
            }
        }
        if !buffer.is_empty() {
            batches.push(self.encode_batch(&buffer, artifact)?);
        }

        Ok(batches)
    }

    fn encode_batch(&self, records: &[Record], artifact: &Artifact) -> Result<TrainBatch> {
        let dim = artifact.total_dim();
        let encoded: Vec<Vec<f64>> = records
            .par_iter()
            .map(|record| encode_row(record, artifact))
            .collect();

        let mut flat = Vec::with_capacity(records.len() * dim);
        for row in &encoded {
            flat.extend_from_slice(row);
        }
        let x = Array2::from_shape_vec((records.len(), dim), flat)
            .map_err(|e| TabrixError::Training(e.to_string()))?;

        let y: Array1<f64> = records
            .iter()
            .map(|record| {
                encode_label(record.get(&self.config.label_column).unwrap_or(&RawValue::Null))
            })
            .collect();

        Ok((x, y))
    }
}

/// One prediction output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub predicted_label: String,
}

/// End-to-end inference driver
#[derive(Debug)]
pub struct InferencePipeline {
    artifact: Artifact,
    model: MlpClassifier,
    id_column: Option<String>,
}

impl InferencePipeline {
    /// Load the persisted artifact and model from a model directory.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let artifact = Artifact::load(&model_dir.join(ARTIFACT_FILE))?;
        let model = MlpClassifier::load(&model_dir.join(MODEL_FILE))?;
        Ok(Self {
            artifact,
            model,
            id_column: None,
        })
    }

    /// Build directly from in-memory parts.
    pub fn new(artifact: Artifact, model: MlpClassifier) -> Self {
        Self {
            artifact,
            model,
            id_column: None,
        }
    }

    /// Set the id column echoed into the output. Rows without it fall back
    /// to their row number.
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Encode, predict, and threshold every row of the source.
    ///
    /// When the artifact's encoded width disagrees with the model's expected
    /// input width, vectors are truncated or zero-padded to the model's
    /// width; the adjustment is logged, never silent, and never fatal.
    pub fn run(&self, source: &dyn RowSource) -> Result<Vec<Prediction>> {
        let model_dim = self.model.input_dim().ok_or(TabrixError::ModelNotFitted)?;
        let encoded_dim = self.artifact.total_dim();
        if model_dim != encoded_dim {
            let adjustment = if model_dim < encoded_dim {
                "truncating"
            } else {
                "zero-padding"
            };
            warn!(
                artifact_dim = encoded_dim,
                model_dim, "encoded width disagrees with model input; {adjustment} vectors"
            );
        }

        let mut predictions = Vec::new();
        let mut buffer: Vec<Record> = Vec::with_capacity(PREDICT_CHUNK);
        let mut row_number = 0usize;

        for record in source.rows()? {
            buffer.push(record?);
            if buffer.len() == PREDICT_CHUNK {
                self.predict_chunk(&buffer, model_dim, &mut row_number, &mut predictions)?;
                buffer.clear();
            }
        }
        if !buffer.is_empty() {
            self.predict_chunk(&buffer, model_dim, &mut row_number, &mut predictions)?;
        }

        Ok(predictions)
    }

    fn predict_chunk(
        &self,
        records: &[Record],
        model_dim: usize,
        row_number: &mut usize,
        out: &mut Vec<Prediction>,
    ) -> Result<()> {
        let encoded: Vec<Vec<f64>> = records
            .par_iter()
            .map(|record| fit_width(encode_row(record, &self.artifact), model_dim))
            .collect();

        let mut flat = Vec::with_capacity(records.len() * model_dim);
        for row in &encoded {
            flat.extend_from_slice(row);
        }
        let x = Array2::from_shape_vec((records.len(), model_dim), flat)
            .map_err(|e| TabrixError::Data(e.to_string()))?;

        let probabilities = self.model.predict_proba(&x)?;

        for (record, probability) in records.iter().zip(probabilities.iter()) {
            let id = self
                .id_column
                .as_deref()
                .and_then(|column| record.get(column))
                .and_then(|value| value.as_token())
                .unwrap_or_else(|| row_number.to_string());
            out.push(Prediction {
                id,
                predicted_label: decode_label(*probability).to_string(),
            });
            *row_number += 1;
        }

        Ok(())
    }
}

/// Adjust an encoded vector to the model's expected width: truncate when too
/// wide, zero-pad when too narrow.
fn fit_width(mut vector: Vec<f64>, width: usize) -> Vec<f64> {
    vector.resize(width, 0.0);
    vector
}

/// Write predictions as a two-column `id,predicted_label` CSV.
pub fn write_predictions(path: &Path, predictions: &[Prediction]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "predicted_label"])?;
    for prediction in predictions {
        writer.write_record([prediction.id.as_str(), prediction.predicted_label.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
