use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// Element-wise activations available to a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    Sigmoid,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Sigmoid => sigmoid(x),
        }
    }

    /// Element-wise derivative, taken at the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                fx * (1.0 - fx)
            }
        }
    }

    pub fn apply(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.function(x))
    }

    pub fn derivative_of(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.derivative(x))
    }

    /// Short lowercase name used by the model summary.
    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Sigmoid => "sigmoid",
        }
    }
}

// Split form so exp() never overflows for large |x|.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clips_negatives() {
        let relu = ActivationFunction::ReLU;
        assert_eq!(relu.function(-2.0), 0.0);
        assert_eq!(relu.function(3.0), 3.0);
        assert_eq!(relu.derivative(-2.0), 0.0);
        assert_eq!(relu.derivative(0.0), 0.0);
        assert_eq!(relu.derivative(3.0), 1.0);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        let sig = ActivationFunction::Sigmoid;
        assert!((sig.function(0.0) - 0.5).abs() < 1e-12);
        assert!((sig.derivative(0.0) - 0.25).abs() < 1e-12);

        for x in [-1000.0, -50.0, 50.0, 1000.0] {
            let y = sig.function(x);
            assert!(y.is_finite());
            assert!((0.0..=1.0).contains(&y));
            assert!(sig.derivative(x).is_finite());
        }
        assert!(sig.function(-1000.0) < 1e-300);
        assert_eq!(sig.function(1000.0), 1.0);
    }

    #[test]
    fn sigmoid_derivative_matches_finite_difference() {
        let sig = ActivationFunction::Sigmoid;
        let h = 1e-6;
        for x in [-3.0, -0.5, 0.7, 2.0] {
            let numeric = (sig.function(x + h) - sig.function(x - h)) / (2.0 * h);
            assert!((numeric - sig.derivative(x)).abs() < 1e-8);
        }
    }

    #[test]
    fn apply_maps_every_element() {
        let z = Matrix::from_data(vec![vec![-1.0, 2.0], vec![0.5, -0.5]]).unwrap();
        let a = ActivationFunction::ReLU.apply(&z);
        assert_eq!(a.data, vec![vec![0.0, 2.0], vec![0.5, 0.0]]);
        let d = ActivationFunction::ReLU.derivative_of(&z);
        assert_eq!(d.data, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
    }
}
