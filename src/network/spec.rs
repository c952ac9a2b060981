use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// Describes one layer in a network architecture.
///
/// Fields:
/// - `name`      : label shown in the model summary
/// - `size`      : number of neurons in this layer
/// - `input_size`: output size of the previous layer, or the raw input
///               dimension for the first layer
/// - `activation`: activation function applied after the linear transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

impl LayerSpec {
    pub fn new(name: &str, size: usize, input_size: usize, activation: ActivationFunction) -> Self {
        LayerSpec {
            name: name.to_string(),
            size,
            input_size,
            activation,
        }
    }
}

/// The 2 → 4 (ReLU) → 1 (Sigmoid) architecture used for XOR.
pub fn xor_architecture() -> Vec<LayerSpec> {
    vec![
        LayerSpec::new("hidden_layer", 4, 2, ActivationFunction::ReLU),
        LayerSpec::new("output_layer", 1, 4, ActivationFunction::Sigmoid),
    ]
}
