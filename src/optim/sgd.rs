use crate::error::{NnError, Result};
use crate::layers::dense::LayerGradients;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::optimizer::{check_grads, check_learning_rate, zeros_like_params, Optimizer};

/// Gradient descent with optional momentum:
/// `v = μ·v + g`, `param -= lr·v` (`μ = 0` gives `param -= lr·g`).
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    velocity: Vec<(Matrix, Matrix)>,
}

impl Sgd {
    pub fn new(network: &Network, learning_rate: f64) -> Result<Sgd> {
        Sgd::with_momentum(network, learning_rate, 0.0)
    }

    pub fn with_momentum(network: &Network, learning_rate: f64, momentum: f64) -> Result<Sgd> {
        check_learning_rate(learning_rate)?;
        if !(momentum.is_finite() && (0.0..1.0).contains(&momentum)) {
            return Err(NnError::NumericError(format!(
                "momentum must be in [0, 1), got {momentum}"
            )));
        }
        Ok(Sgd {
            learning_rate,
            momentum,
            velocity: zeros_like_params(network),
        })
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, network: &mut Network, grads: &[LayerGradients]) -> Result<()> {
        check_grads(&self.velocity, grads)?;

        let layers = network.layers_mut();
        for ((layer, (v_w, v_b)), g) in layers.iter_mut().zip(self.velocity.iter_mut()).zip(grads) {
            let mut next_w = v_w.scale(self.momentum);
            next_w.accumulate(&g.weights)?;
            let mut next_b = v_b.scale(self.momentum);
            next_b.accumulate(&g.biases)?;
            layer.apply_update(&next_w.scale(self.learning_rate), &next_b.scale(self.learning_rate))?;
            *v_w = next_w;
            *v_b = next_b;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn name(&self) -> &'static str {
        "SGD"
    }
}
