use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::error::{NnError, Result};

/// Row-major 2D buffer of `f64`.
///
/// A batch of samples is laid out one sample per row, so a batch of four
/// 2-feature inputs is a 4×2 matrix and a layer's weights map
/// `input_size → size` as an `input_size × size` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixData")]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    ///
    /// Shape: (rows, cols). `rows` is the fan-in, since weights are stored
    /// `input_size × size`.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / rows as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    ///
    /// Recommended before Sigmoid layers. Keeps the variance of activations
    /// and gradients roughly equal across layers.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / rows as f64).sqrt(), rng)
    }

    /// Builds a matrix from row vectors. Fails on empty or ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = match data.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(NnError::ShapeMismatch("matrix data must be non-empty".to_string())),
        };
        if let Some(bad) = data.iter().position(|row| row.len() != cols) {
            return Err(NnError::ShapeMismatch(format!(
                "row {bad} has {} columns, expected {cols}",
                data[bad].len()
            )));
        }

        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// A single-row matrix.
    pub fn row(values: Vec<f64>) -> Result<Matrix> {
        Matrix::from_data(vec![values])
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter().flat_map(|row| row.iter())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(rhs, op)?;
        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&a, &b)| functor(a, b)).collect()
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    fn check_same_shape(&self, rhs: &Matrix, op: &str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(NnError::ShapeMismatch(format!(
                "{op}: {}x{} vs {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        Ok(())
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    /// Standard matrix product `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NnError::ShapeMismatch(format!(
                "matmul: {}x{} · {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Adds a 1×cols row to every row (bias broadcast).
    pub fn add_row(&self, row: &Matrix) -> Result<Matrix> {
        if row.rows != 1 || row.cols != self.cols {
            return Err(NnError::ShapeMismatch(format!(
                "add_row: {}x{} + {}x{}",
                self.rows, self.cols, row.rows, row.cols
            )));
        }

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|r| r.iter().zip(row.data[0].iter()).map(|(a, b)| a + b).collect())
                .collect()
        })
    }

    /// Column sums as a 1×cols row.
    pub fn sum_columns(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, x) in res.data[0].iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        res
    }

    /// In-place `self += rhs`, used for gradient summation.
    pub fn accumulate(&mut self, rhs: &Matrix) -> Result<()> {
        self.check_same_shape(rhs, "accumulate")?;
        for (row_a, row_b) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (a, b) in row_a.iter_mut().zip(row_b.iter()) {
                *a += b;
            }
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }
}

/// Unchecked wire form of a `Matrix`; deserialization goes through
/// `TryFrom` so `data` must really be `rows × cols`.
#[derive(Deserialize)]
struct MatrixData {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl TryFrom<MatrixData> for Matrix {
    type Error = NnError;

    fn try_from(raw: MatrixData) -> Result<Matrix> {
        if raw.data.len() != raw.rows {
            return Err(NnError::ShapeMismatch(format!(
                "declared {} rows, found {}", raw.rows, raw.data.len()
            )));
        }
        if let Some(bad) = raw.data.iter().position(|row| row.len() != raw.cols) {
            return Err(NnError::ShapeMismatch(format!(
                "row {bad} has {} columns, declared {}", raw.data[bad].len(), raw.cols
            )));
        }
        Ok(Matrix { rows: raw.rows, cols: raw.cols, data: raw.data })
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn m(data: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_data(data).unwrap()
    }

    #[test]
    fn matmul_follows_row_by_column() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0], vec![6.0]]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), (2, 1));
        assert_eq!(c.data, vec![vec![17.0], vec![39.0]]);
    }

    #[test]
    fn matmul_rejects_inner_dimension_mismatch() {
        let a = Matrix::zeros(4, 2);
        let b = Matrix::zeros(4, 1);
        assert!(matches!(a.matmul(&b), Err(NnError::ShapeMismatch(_))));
    }

    #[test]
    fn elementwise_ops_check_shapes() {
        let a = m(vec![vec![1.0, 2.0]]);
        let b = m(vec![vec![3.0, 4.0]]);
        assert_eq!(a.add(&b).unwrap().data, vec![vec![4.0, 6.0]]);
        assert_eq!(b.sub(&a).unwrap().data, vec![vec![2.0, 2.0]]);
        assert_eq!(a.hadamard(&b).unwrap().data, vec![vec![3.0, 8.0]]);

        let c = Matrix::zeros(2, 1);
        assert!(a.add(&c).is_err());
        assert!(a.hadamard(&c).is_err());
    }

    #[test]
    fn from_data_rejects_ragged_and_empty() {
        assert!(Matrix::from_data(vec![]).is_err());
        assert!(Matrix::from_data(vec![vec![]]).is_err());
        assert!(Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn transpose_swaps_axes() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(2, 1), 6.0);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn add_row_broadcasts_and_sum_columns_reduces() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let bias = m(vec![vec![10.0, 20.0]]);
        let b = a.add_row(&bias).unwrap();
        assert_eq!(b.data[2], vec![15.0, 26.0]);
        assert_eq!(a.sum_columns().data, vec![vec![9.0, 12.0]]);

        assert!(a.add_row(&Matrix::zeros(1, 3)).is_err());
    }

    #[test]
    fn accumulate_sums_in_place() {
        let mut acc = Matrix::zeros(1, 2);
        acc.accumulate(&m(vec![vec![1.0, -1.0]])).unwrap();
        acc.accumulate(&m(vec![vec![0.5, 0.5]])).unwrap();
        assert_eq!(acc.data, vec![vec![1.5, -0.5]]);
        assert!(acc.accumulate(&Matrix::zeros(2, 2)).is_err());
    }

    #[test]
    fn deserialize_rejects_data_that_disagrees_with_shape() {
        let ok: Matrix = serde_json::from_str(r#"{"rows":1,"cols":2,"data":[[1.0,2.0]]}"#).unwrap();
        assert_eq!(ok.shape(), (1, 2));

        let missing_row = r#"{"rows":2,"cols":2,"data":[[1.0,2.0]]}"#;
        assert!(serde_json::from_str::<Matrix>(missing_row).is_err());
        let short_row = r#"{"rows":2,"cols":2,"data":[[1.0,2.0],[3.0]]}"#;
        assert!(serde_json::from_str::<Matrix>(short_row).is_err());
    }

    #[test]
    fn seeded_initializers_are_reproducible() {
        let a = Matrix::he(2, 4, &mut StdRng::seed_from_u64(7));
        let b = Matrix::he(2, 4, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.shape(), (2, 4));
        assert!(a.is_finite());

        let x = Matrix::xavier(4, 1, &mut StdRng::seed_from_u64(8));
        assert_ne!(x, Matrix::xavier(4, 1, &mut StdRng::seed_from_u64(9)));
    }
}
