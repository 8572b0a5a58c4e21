//! tabrix - Streaming tabular feature encoder and binary classifier
//!
//! tabrix turns a mixed-type CSV (numeric and categorical columns, with
//! missing values) into a fixed-width numeric feature matrix, trains a binary
//! classifier on it, and persists the fitted preprocessing parameters so the
//! exact same encoding is replayed at inference time.
//!
//! # Modules
//!
//! - [`data`] - Row sources and raw value types
//! - [`encoding`] - Schema inference, streaming statistics, vocabularies,
//!   layout planning, and the shared row encoder
//! - [`artifact`] - The persisted preprocessing artifact
//! - [`labels`] - Binary label codec
//! - [`model`] - The MLP classifier
//! - [`pipeline`] - Training and inference drivers
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data access
pub mod data;

// Feature encoding
pub mod encoding;
pub mod artifact;
pub mod labels;

// Modeling
pub mod model;
pub mod pipeline;

// Services
pub mod cli;

pub use error::{Result, TabrixError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, TabrixError};

    // Data access
    pub use crate::data::{CsvRowSource, RawValue, Record, RowSource};

    // Encoding
    pub use crate::encoding::{
        encode_row, infer_schema, EncoderConfig, Feature, FeatureKind, FeatureSchema,
        LayoutPlan, NumericAccumulator, NumericStats, ScalingMode, VocabAccumulator,
        Vocabulary, MISSING_TOKEN,
    };

    // Artifact
    pub use crate::artifact::{Artifact, ARTIFACT_VERSION};

    // Labels
    pub use crate::labels::{decode_label, encode_label, NEGATIVE_LABEL, POSITIVE_LABEL};

    // Modeling
    pub use crate::model::{MlpClassifier, MlpConfig, TrainBatch};
    pub use crate::pipeline::{
        InferencePipeline, Prediction, TrainConfig, TrainPipeline, TrainReport,
    };
}
