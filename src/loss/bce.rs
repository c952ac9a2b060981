use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Binary cross-entropy over a batch of sigmoid outputs.
pub struct BceLoss;

/// Predictions are clamped into [EPS, 1 - EPS] before any log or division.
pub const EPS: f64 = 1e-7;

impl BceLoss {
    fn check(predicted: &Matrix, expected: &Matrix) -> Result<()> {
        if predicted.shape() != expected.shape() {
            return Err(NnError::ShapeMismatch(format!(
                "predictions are {}x{}, targets {}x{}",
                predicted.rows, predicted.cols, expected.rows, expected.cols
            )));
        }
        if predicted.is_empty() {
            return Err(NnError::ShapeMismatch("empty batch".to_string()));
        }
        if let Some(p) = predicted.iter().find(|p| !p.is_finite()) {
            return Err(NnError::NumericError(format!("non-finite prediction {p}")));
        }
        if let Some(y) = expected.iter().find(|y| !(0.0..=1.0).contains(*y)) {
            return Err(NnError::NumericError(format!("target {y} outside [0, 1]")));
        }
        Ok(())
    }

    fn clamp(p: f64) -> f64 {
        p.clamp(EPS, 1.0 - EPS)
    }

    /// Scalar BCE: -mean(y·ln(p) + (1-y)·ln(1-p)), p clamped.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        BceLoss::check(predicted, expected)?;
        let n = predicted.len() as f64;
        let total: f64 = predicted.iter().zip(expected.iter())
            .map(|(&p, &y)| {
                let p = BceLoss::clamp(p);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum();
        Ok(total / n)
    }

    /// ∂L/∂p = (p - y) / (p·(1-p)·N), p clamped, N = batch size.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        BceLoss::check(predicted, expected)?;
        let n = predicted.len() as f64;
        let data = predicted.data.iter().zip(expected.data.iter())
            .map(|(p_row, y_row)| {
                p_row.iter().zip(y_row.iter())
                    .map(|(&p, &y)| {
                        let p = BceLoss::clamp(p);
                        (p - y) / (p * (1.0 - p) * n)
                    })
                    .collect()
            })
            .collect();
        Ok(Matrix { rows: predicted.rows, cols: predicted.cols, data })
    }

    /// Fraction of predictions whose rounded value equals the target.
    pub fn accuracy(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        BceLoss::check(predicted, expected)?;
        let correct = predicted.iter().zip(expected.iter())
            .filter(|(p, y)| p.round() == y.round())
            .count();
        Ok(correct as f64 / predicted.len() as f64)
    }
}
