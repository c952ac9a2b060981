use crate::error::{NnError, Result};
use crate::layers::dense::LayerGradients;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::optimizer::{check_grads, check_learning_rate, zeros_like_params, Optimizer};

/// Adam with bias correction.
///
/// First and second moment estimates are allocated once, shaped like the
/// network's parameters, and carried across every `step`.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    t: u64,
    m: Vec<(Matrix, Matrix)>,
    v: Vec<(Matrix, Matrix)>,
}

impl Adam {
    pub fn new(network: &Network, learning_rate: f64, beta1: f64, beta2: f64, eps: f64) -> Result<Adam> {
        check_learning_rate(learning_rate)?;
        for (name, beta) in [("beta1", beta1), ("beta2", beta2)] {
            if !(beta.is_finite() && (0.0..1.0).contains(&beta)) {
                return Err(NnError::NumericError(format!("adam {name} must be in [0, 1), got {beta}")));
            }
        }
        if !(eps.is_finite() && eps > 0.0) {
            return Err(NnError::NumericError(format!("adam eps must be finite and > 0, got {eps}")));
        }

        Ok(Adam {
            learning_rate,
            beta1,
            beta2,
            eps,
            t: 0,
            m: zeros_like_params(network),
            v: zeros_like_params(network),
        })
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> u64 {
        self.t
    }

    fn update_moments(&self, m: &Matrix, v: &Matrix, g: &Matrix) -> Result<(Matrix, Matrix)> {
        let m = m.scale(self.beta1).add(&g.scale(1.0 - self.beta1))?;
        let v = v.scale(self.beta2).add(&g.map(|x| x * x).scale(1.0 - self.beta2))?;
        Ok((m, v))
    }

    fn update_step(&self, m: &Matrix, v: &Matrix, bias1: f64, bias2: f64) -> Result<Matrix> {
        let m_hat = m.scale(1.0 / bias1);
        let inv_denom = v.map(|x| 1.0 / ((x / bias2).sqrt() + self.eps));
        Ok(m_hat.hadamard(&inv_denom)?.scale(self.learning_rate))
    }
}

impl Optimizer for Adam {
    fn step(&mut self, network: &mut Network, grads: &[LayerGradients]) -> Result<()> {
        check_grads(&self.m, grads)?;

        let t = self.t + 1;
        let bias1 = 1.0 - self.beta1.powf(t as f64);
        let bias2 = 1.0 - self.beta2.powf(t as f64);

        for i in 0..grads.len() {
            let (m_w, v_w) = self.update_moments(&self.m[i].0, &self.v[i].0, &grads[i].weights)?;
            let (m_b, v_b) = self.update_moments(&self.m[i].1, &self.v[i].1, &grads[i].biases)?;

            let w_step = self.update_step(&m_w, &v_w, bias1, bias2)?;
            let b_step = self.update_step(&m_b, &v_b, bias1, bias2)?;
            network.layers_mut()[i].apply_update(&w_step, &b_step)?;

            self.m[i] = (m_w, m_b);
            self.v[i] = (v_w, v_b);
        }
        self.t = t;
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn name(&self) -> &'static str {
        "Adam"
    }
}
