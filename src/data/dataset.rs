use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Immutable full-batch training set: one sample per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Matrix,
    targets: Matrix,
}

impl Dataset {
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Dataset> {
        let inputs = Matrix::from_data(inputs)?;
        let targets = Matrix::from_data(targets)?;
        if inputs.rows != targets.rows {
            return Err(NnError::ShapeMismatch(format!(
                "{} input rows but {} target rows",
                inputs.rows, targets.rows
            )));
        }
        Ok(Dataset { inputs, targets })
    }

    /// The four exclusive-or pairs.
    pub fn xor() -> Dataset {
        Dataset {
            inputs: Matrix {
                rows: 4,
                cols: 2,
                data: vec![
                    vec![0.0, 0.0],
                    vec![0.0, 1.0],
                    vec![1.0, 0.0],
                    vec![1.0, 1.0],
                ],
            },
            targets: Matrix {
                rows: 4,
                cols: 1,
                data: vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
            },
        }
    }

    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    pub fn targets(&self) -> &Matrix {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.inputs.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_size(&self) -> usize {
        self.inputs.cols
    }

    pub fn target_size(&self) -> usize {
        self.targets.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_labels_are_exclusive_or_of_inputs() {
        let data = Dataset::xor();
        assert_eq!(data.len(), 4);
        assert_eq!(data.input_size(), 2);
        assert_eq!(data.target_size(), 1);
        for (x, y) in data.inputs().data.iter().zip(data.targets().data.iter()) {
            let expected = ((x[0] as u8) ^ (x[1] as u8)) as f64;
            assert_eq!(y[0], expected);
        }
    }

    #[test]
    fn new_rejects_mismatched_rows() {
        let err = Dataset::new(vec![vec![0.0, 1.0], vec![1.0, 1.0]], vec![vec![1.0]]);
        assert!(matches!(err, Err(NnError::ShapeMismatch(_))));
        assert!(Dataset::new(vec![], vec![]).is_err());
    }
}
