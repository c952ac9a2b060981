use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::layers::dense::LayerGradients;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::adam::Adam;
use crate::optim::sgd::Sgd;

/// Applies one parameter update per call, given the gradients of every
/// layer in `network` (in layer order).
pub trait Optimizer {
    fn step(&mut self, network: &mut Network, grads: &[LayerGradients]) -> Result<()>;

    fn learning_rate(&self) -> f64;

    fn name(&self) -> &'static str;
}

/// Selects and parameterizes an optimizer in a `TrainConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Gradient descent; `momentum = 0.0` is plain SGD.
    Sgd { momentum: f64 },
    /// Adam with bias-corrected moment estimates.
    Adam { beta1: f64, beta2: f64, eps: f64 },
}

impl OptimizerKind {
    /// Adam with the usual defaults (β1 0.9, β2 0.999, ε 1e-7).
    pub fn adam() -> Self {
        OptimizerKind::Adam { beta1: 0.9, beta2: 0.999, eps: 1e-7 }
    }

    /// Allocates optimizer state shaped like `network`'s parameters.
    pub fn build(self, network: &Network, learning_rate: f64) -> Result<Box<dyn Optimizer>> {
        match self {
            OptimizerKind::Sgd { momentum } => {
                Ok(Box::new(Sgd::with_momentum(network, learning_rate, momentum)?))
            }
            OptimizerKind::Adam { beta1, beta2, eps } => {
                Ok(Box::new(Adam::new(network, learning_rate, beta1, beta2, eps)?))
            }
        }
    }
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::adam()
    }
}

/// Zeroed (weights, biases) buffers for every layer of `network`.
pub(crate) fn zeros_like_params(network: &Network) -> Vec<(Matrix, Matrix)> {
    network.layers().iter()
        .map(|layer| (
            Matrix::zeros(layer.weights.rows, layer.weights.cols),
            Matrix::zeros(layer.biases.rows, layer.biases.cols),
        ))
        .collect()
}

/// Checks that `grads` lines up with per-layer optimizer state.
pub(crate) fn check_grads(state: &[(Matrix, Matrix)], grads: &[LayerGradients]) -> Result<()> {
    if state.len() != grads.len() {
        return Err(NnError::ShapeMismatch(format!(
            "optimizer tracks {} layers, got gradients for {}",
            state.len(), grads.len()
        )));
    }
    for (i, ((w, b), g)) in state.iter().zip(grads.iter()).enumerate() {
        if w.shape() != g.weights.shape() || b.shape() != g.biases.shape() {
            return Err(NnError::ShapeMismatch(format!(
                "layer {i}: gradient shapes {:?}/{:?}, expected {:?}/{:?}",
                g.weights.shape(), g.biases.shape(), w.shape(), b.shape()
            )));
        }
    }
    Ok(())
}

pub(crate) fn check_learning_rate(learning_rate: f64) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(NnError::NumericError(format!(
            "learning rate must be finite and > 0, got {learning_rate}"
        )));
    }
    Ok(())
}
