//! Feedforward binary classifier
//!
//! A small multi-layer perceptron with ReLU hidden layers and a sigmoid
//! output, trained by mini-batch gradient descent with momentum and L2
//! shrinkage. Batches are prepared by the caller; `fit` owns only the epoch
//! loop and the weight updates.

use crate::error::{Result, TabrixError};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One training batch: encoded feature rows and their 0/1 labels.
pub type TrainBatch = (Array2<f64>, Array1<f64>);

/// MLP hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
    /// Learning rate
    pub learning_rate: f64,
    /// Momentum
    pub momentum: f64,
    /// L2 regularization strength
    pub alpha: f64,
    /// Random seed for weight initialization and batch shuffling
    pub seed: Option<u64>,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![32],
            learning_rate: 0.05,
            momentum: 0.9,
            alpha: 0.0001,
            seed: Some(42),
        }
    }
}

impl MlpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set hidden layer sizes
    pub fn with_hidden_layers(mut self, layers: Vec<usize>) -> Self {
        self.hidden_layers = layers;
        self
    }

    /// Builder method to set the learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Builder method to set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Multi-layer perceptron for binary classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    config: MlpConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
    is_fitted: bool,
}

impl MlpClassifier {
    pub fn new(config: MlpConfig) -> Self {
        Self {
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Expected input width, once fitted.
    pub fn input_dim(&self) -> Option<usize> {
        if self.is_fitted {
            Some(self.n_features)
        } else {
            None
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit the model on a sequence of batches for the given number of epochs.
    pub fn fit(&mut self, batches: &[TrainBatch], epochs: usize) -> Result<()> {
        let Some((first_x, _)) = batches.first() else {
            return Err(TabrixError::Training("no training batches".to_string()));
        };
        self.n_features = first_x.ncols();

        for (x, y) in batches {
            if x.ncols() != self.n_features {
                return Err(TabrixError::DimensionMismatch {
                    expected: self.n_features,
                    actual: x.ncols(),
                });
            }
            if x.nrows() != y.len() {
                return Err(TabrixError::Training(format!(
                    "batch has {} rows but {} labels",
                    x.nrows(),
                    y.len()
                )));
            }
        }

        self.initialize_weights();

        let mut rng = match self.config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        // Initialize velocity for momentum
        let mut velocities_w: Vec<Array2<f64>> = self
            .weights
            .iter()
            .map(|w| Array2::zeros(w.raw_dim()))
            .collect();
        let mut velocities_b: Vec<Array1<f64>> = self
            .biases
            .iter()
            .map(|b| Array1::zeros(b.len()))
            .collect();

        for epoch in 0..epochs {
            let mut order: Vec<usize> = (0..batches.len()).collect();
            order.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            for &i in &order {
                let (x, y) = &batches[i];

                let (activations, z_values) = self.forward(x);
                epoch_loss += bce_loss(y, activations.last().map(|a| a.column(0)));
                let gradients = self.backward(y, &activations, &z_values);

                for (l, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
                    velocities_w[l] = &velocities_w[l] * self.config.momentum
                        - &grad_w * self.config.learning_rate;
                    velocities_b[l] = &velocities_b[l] * self.config.momentum
                        - &grad_b * self.config.learning_rate;

                    self.weights[l] = &self.weights[l] + &velocities_w[l];
                    self.biases[l] = &self.biases[l] + &velocities_b[l];

                    // L2 regularization
                    self.weights[l] =
                        &self.weights[l] * (1.0 - self.config.alpha * self.config.learning_rate);
                }
            }

            debug!(epoch, loss = epoch_loss / batches.len() as f64, "epoch complete");
        }

        self.is_fitted = true;
        Ok(())
    }

    /// Predict positive-class probabilities for a batch of encoded rows.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(TabrixError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(TabrixError::DimensionMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let (activations, _) = self.forward(x);
        let output = activations
            .last()
            .ok_or(TabrixError::ModelNotFitted)?
            .column(0)
            .to_owned();
        Ok(output)
    }

    /// Save the model to a file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a model from a file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        Ok(model)
    }

    fn initialize_weights(&mut self) {
        self.weights.clear();
        self.biases.clear();

        let mut rng = match self.config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut layer_sizes = vec![self.n_features];
        layer_sizes.extend(&self.config.hidden_layers);
        layer_sizes.push(1);

        for i in 0..layer_sizes.len() - 1 {
            let n_in = layer_sizes[i];
            let n_out = layer_sizes[i + 1];

            // Xavier/Glorot initialization
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();
            let weights: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
                .collect();

            self.weights.push(
                Array2::from_shape_vec((n_in, n_out), weights)
                    .unwrap_or_else(|_| Array2::zeros((n_in, n_out))),
            );
            self.biases.push(Array1::zeros(n_out));
        }
    }

    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut activations = vec![x.clone()];
        let mut z_values = Vec::new();

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations[activations.len() - 1].dot(w) + b;
            z_values.push(z.clone());

            let a = if i < self.weights.len() - 1 {
                z.mapv(|v| v.max(0.0)) // ReLU
            } else {
                z.mapv(|v| 1.0 / (1.0 + (-v).exp())) // Sigmoid output
            };

            activations.push(a);
        }

        (activations, z_values)
    }

    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
        z_values: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let mut gradients = Vec::new();

        // Sigmoid + binary cross-entropy: the output delta reduces to
        // (prediction - label) / n.
        let y_2d = y.clone().insert_axis(Axis(1));
        let output = &activations[activations.len() - 1];
        let mut delta = (output - &y_2d) / n;

        for i in (0..self.weights.len()).rev() {
            let a_prev = &activations[i];

            let grad_w = a_prev.t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            gradients.push((grad_w, grad_b));

            if i > 0 {
                let relu_grad = z_values[i - 1].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                delta = delta.dot(&self.weights[i].t()) * relu_grad;
            }
        }

        gradients.reverse();
        gradients
    }
}

fn bce_loss(y: &Array1<f64>, predictions: Option<ndarray::ArrayView1<f64>>) -> f64 {
    let Some(p) = predictions else { return 0.0 };
    let eps = 1e-12;
    y.iter()
        .zip(p.iter())
        .map(|(t, q)| {
            let q = q.clamp(eps, 1.0 - eps);
            -(t * q.ln() + (1.0 - t) * (1.0 - q).ln())
        })
        .sum::<f64>()
        / y.len().max(1) as f64
}
