use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::layers::dense::{Layer, LayerGradients};
use crate::math::matrix::Matrix;
use crate::network::spec::LayerSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NetworkData")]
pub struct Network {
    layers: Vec<Layer>,
}

/// Unchecked wire form; deserialized networks are rebuilt through `Network::new`.
#[derive(Deserialize)]
struct NetworkData {
    layers: Vec<Layer>,
}

impl TryFrom<NetworkData> for Network {
    type Error = NnError;

    fn try_from(raw: NetworkData) -> Result<Network> {
        Network::new(raw.layers)
    }
}

impl Network {
    /// Wraps an ordered list of layers, checking that every layer's
    /// parameters match its declared sizes and that each layer's output
    /// width equals the next layer's input width.
    pub fn new(layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::ShapeMismatch("a network needs at least one layer".to_string()));
        }
        for layer in &layers {
            if layer.weights.shape() != (layer.input_size, layer.size)
                || layer.biases.shape() != (1, layer.size)
            {
                return Err(NnError::ShapeMismatch(format!(
                    "layer '{}' has inconsistent parameter shapes", layer.name
                )));
            }
        }
        for pair in layers.windows(2) {
            if pair[0].size != pair[1].input_size {
                return Err(NnError::ShapeMismatch(format!(
                    "layer '{}' outputs {} values but layer '{}' expects {}",
                    pair[0].name, pair[0].size, pair[1].name, pair[1].input_size
                )));
            }
        }
        Ok(Network { layers })
    }

    /// Builds and initializes layers from specs. The same seed always
    /// yields the same parameters.
    pub fn from_specs(specs: &[LayerSpec], seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = specs.iter()
            .map(|spec| Layer::new(&spec.name, spec.size, spec.input_size, spec.activation, &mut rng))
            .collect();
        Network::new(layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Forward pass; stores activations in each layer for backprop.
    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Inference-only forward pass. Leaves layer caches untouched.
    pub fn predict(&self, input: &Matrix) -> Result<Matrix> {
        let mut current = input.clone();
        for layer in &self.layers {
            current = layer.infer(&current)?;
        }
        Ok(current)
    }

    /// Backward pass from ∂L/∂output. Returns one gradient record per layer,
    /// in layer order.
    pub fn backward(&self, grad_output: &Matrix) -> Result<Vec<LayerGradients>> {
        let mut grads = Vec::with_capacity(self.layers.len());
        let mut delta = grad_output.clone();
        for layer in self.layers.iter().rev() {
            let layer_grads = layer.backward(&delta)?;
            delta = layer_grads.input.clone();
            grads.push(layer_grads);
        }
        grads.reverse();
        Ok(grads)
    }

    /// Keras-style table of layers, output shapes and parameter counts.
    pub fn summary(&self) -> String {
        let names: Vec<String> = self.layers.iter()
            .map(|layer| format!("{} (Dense, {})", layer.name, layer.activator.name()))
            .collect();
        let width = names.iter()
            .map(|n| n.chars().count())
            .chain(["Layer (type)".len(), "input (Input)".len()])
            .max()
            .unwrap_or(0)
            + 2;
        let rule = "=".repeat(width + 30);
        let thin = "-".repeat(width + 30);

        let mut out = String::new();
        let _ = writeln!(out, "{:<width$}{:<18}{:>12}", "Layer (type)", "Output Shape", "Param #");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:<width$}{:<18}{:>12}", "input (Input)", format!("(None, {})", self.input_size()), 0);
        for (layer, name) in self.layers.iter().zip(&names) {
            let _ = writeln!(out, "{thin}");
            let _ = writeln!(
                out,
                "{:<width$}{:<18}{:>12}",
                name,
                format!("(None, {})", layer.size),
                layer.parameter_count()
            );
        }
        let _ = writeln!(out, "{rule}");
        let _ = write!(out, "Total params: {}", self.parameter_count());
        out
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by
    /// `save_json`. Matrix shapes and the layer chain are re-validated.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
