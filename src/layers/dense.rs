use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};
use crate::error::{NnError, Result};

/// Bias given to every ReLU unit at construction so no unit starts dead on
/// the all-zero input.
pub const RELU_BIAS_INIT: f64 = 0.1;

/// Values remembered from the last training forward pass.
#[derive(Debug, Clone)]
struct ForwardCache {
    input: Matrix,
    pre_activation: Matrix,
}

/// Gradients produced by one layer's backward pass.
#[derive(Debug, Clone)]
pub struct LayerGradients {
    /// ∂L/∂W, shape `input_size × size`.
    pub weights: Matrix,
    /// ∂L/∂b, shape `1 × size`.
    pub biases: Matrix,
    /// ∂L/∂input, handed to the previous layer.
    pub input: Matrix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub name: String,
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
    #[serde(skip)]
    cache: Option<ForwardCache>,
}

impl Layer {
    /// Initializes weights for the activation: He normal with a small
    /// positive bias for ReLU, Xavier normal with zero bias for Sigmoid.
    pub fn new<R: Rng + ?Sized>(
        name: &str,
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let (weights, biases) = match activation {
            ActivationFunction::ReLU => (
                Matrix::he(input_size, size, rng),
                Matrix::filled(1, size, RELU_BIAS_INIT),
            ),
            ActivationFunction::Sigmoid => (
                Matrix::xavier(input_size, size, rng),
                Matrix::zeros(1, size),
            ),
        };

        Layer {
            name: name.to_string(),
            size,
            input_size,
            weights,
            biases,
            activator: activation,
            cache: None,
        }
    }

    /// Builds a layer from explicit parameters. `weights` must be
    /// `input_size × size` and `biases` `1 × size`.
    pub fn from_parameters(
        name: &str,
        weights: Matrix,
        biases: Matrix,
        activation: ActivationFunction,
    ) -> Result<Layer> {
        if biases.rows != 1 || biases.cols != weights.cols {
            return Err(NnError::ShapeMismatch(format!(
                "layer '{name}': biases are {}x{}, weights {}x{}",
                biases.rows, biases.cols, weights.rows, weights.cols
            )));
        }

        Ok(Layer {
            name: name.to_string(),
            size: weights.cols,
            input_size: weights.rows,
            weights,
            biases,
            activator: activation,
            cache: None,
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    fn pre_activation(&self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size {
            return Err(NnError::ShapeMismatch(format!(
                "layer '{}' expects {} inputs, got {}",
                self.name, self.input_size, input.cols
            )));
        }
        input.matmul(&self.weights)?.add_row(&self.biases)
    }

    /// Training forward pass: activation(input · W + b). Caches the input
    /// and pre-activation for `backward`.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let z = self.pre_activation(input)?;
        let a = self.activator.apply(&z);
        self.cache = Some(ForwardCache {
            input: input.clone(),
            pre_activation: z,
        });
        Ok(a)
    }

    /// Same output as `forward` without touching the cache.
    pub fn infer(&self, input: &Matrix) -> Result<Matrix> {
        let z = self.pre_activation(input)?;
        Ok(self.activator.apply(&z))
    }

    /// `grad_output` is ∂L/∂a for this layer (one row per sample).
    pub fn backward(&self, grad_output: &Matrix) -> Result<LayerGradients> {
        let cache = self.cache.as_ref().ok_or_else(|| NnError::StateError(format!(
            "backward on layer '{}' before any forward pass", self.name
        )))?;

        // δ = ∂L/∂a ⊙ σ'(z)
        let delta = grad_output.hadamard(&self.activator.derivative_of(&cache.pre_activation))?;

        Ok(LayerGradients {
            weights: cache.input.transpose().matmul(&delta)?,
            biases: delta.sum_columns(),
            input: delta.matmul(&self.weights.transpose())?,
        })
    }

    /// Subtracts optimizer steps from the parameters.
    pub fn apply_update(&mut self, weights_step: &Matrix, biases_step: &Matrix) -> Result<()> {
        let weights = self.weights.sub(weights_step)?;
        let biases = self.biases.sub(biases_step)?;
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }
}
