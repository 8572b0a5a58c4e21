//! Streaming numeric statistics

use super::FeatureSchema;
use crate::data::Record;
use crate::error::{Result, TabrixError};
use serde::{Deserialize, Serialize};

/// Lower clamp applied to the population variance before the square root,
/// guarding against negative values from floating-point cancellation.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Running sums for one numeric feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Moments {
    sum: f64,
    sum_sq: f64,
    count: u64,
}

impl Moments {
    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.count += 1;
    }

    /// `(mean, std)` from the accumulated sums.
    ///
    /// A feature with zero observed finite values yields `mean = 0, std = 1`,
    /// making the downstream normalization a no-op. Variance is population
    /// variance, a fixed choice.
    fn finalize(&self) -> (f64, f64) {
        if self.count == 0 {
            return (0.0, 1.0);
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = (self.sum_sq / n - mean * mean).max(VARIANCE_FLOOR);
        (mean, variance.sqrt())
    }
}

/// Imputation/normalization statistics for the numeric features, aligned
/// with the schema's numeric feature order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub names: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl NumericStats {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Single-pass accumulator for numeric statistics.
///
/// Maintains `Σx`, `Σx²`, `count` per numeric feature, updated only for
/// finite numbers: missing and non-finite values are skipped, not
/// zero-filled, so they do not bias the mean. Memory is O(numeric features);
/// the full column is never materialized.
#[derive(Debug, Clone)]
pub struct NumericAccumulator {
    names: Vec<String>,
    moments: Vec<Moments>,
}

impl NumericAccumulator {
    pub fn new(schema: &FeatureSchema) -> Self {
        let names = schema.numeric_names();
        let moments = vec![Moments::default(); names.len()];
        Self { names, moments }
    }

    /// Fold one record into the running sums.
    pub fn observe(&mut self, record: &Record) {
        for (name, moments) in self.names.iter().zip(self.moments.iter_mut()) {
            if let Some(value) = record.get(name).and_then(|v| v.as_finite()) {
                moments.observe(value);
            }
        }
    }

    /// Freeze the accumulated sums into statistics.
    pub fn finalize(self) -> Result<NumericStats> {
        let mut means = Vec::with_capacity(self.names.len());
        let mut stds = Vec::with_capacity(self.names.len());
        for moments in &self.moments {
            let (mean, std) = moments.finalize();
            if !mean.is_finite() || !std.is_finite() {
                return Err(TabrixError::Data(
                    "numeric statistics overflowed; input values out of f64 range".to_string(),
                ));
            }
            means.push(mean);
            stds.push(std);
        }
        Ok(NumericStats {
            names: self.names,
            means,
            stds,
        })
    }
}
