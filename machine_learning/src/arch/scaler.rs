use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// Z-score standardization learned from a feature table.
///
/// Each column is shifted by its mean and divided by its (population) standard deviation.
/// Columns without variance keep a scale of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl Standardizer {
    /// Learns the per-column statistics of `x`.
    ///
    /// # Arguments
    /// * `x` - A `(samples, features)` matrix with at least one row.
    pub fn fit(x: ArrayView2<f32>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(MlErr::EmptyInput { what: "feature table" });
        }

        let n = x.nrows() as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());

        for col in x.axis_iter(Axis(1)) {
            let mu = col.iter().map(|&v| v as f64).sum::<f64>() / n;
            let var = col.iter().map(|&v| (v as f64 - mu).powi(2)).sum::<f64>() / n;
            let sigma = var.sqrt();

            mean.push(mu as f32);
            scale.push(if sigma > f64::EPSILON { sigma as f32 } else { 1.0 });
        }

        Ok(Self { mean, scale })
    }

    /// Rebuilds a `Standardizer` from previously learned statistics.
    pub fn from_parts(mean: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(MlErr::SizeMismatch {
                what: "standardization scales",
                got: scale.len(),
                expected: mean.len(),
            });
        }

        if let Some(&bad) = scale.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(MlErr::InvalidValue {
                what: "standardization scale",
                value: bad,
            });
        }

        Ok(Self { mean, scale })
    }

    /// Returns the amount of features this instance was fitted on.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    /// Standardizes every row of `x`.
    pub fn transform(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.len() {
            return Err(MlErr::SizeMismatch {
                what: "input columns",
                got: x.ncols(),
                expected: self.len(),
            });
        }

        let mut out = x.to_owned();
        for (mut col, (mu, sigma)) in out
            .axis_iter_mut(Axis(1))
            .zip(self.mean.iter().zip(&self.scale))
        {
            col.mapv_inplace(|v| (v - mu) / sigma);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn transformed_columns_are_centered_and_unit_scaled() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = Standardizer::fit(x.view()).unwrap();
        let xs = scaler.transform(x.view()).unwrap();

        let means = xs.mean_axis(Axis(0)).unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-6));
        assert!((xs[[0, 0]] + 1.224_744_9).abs() < 1e-5);
        // constant column keeps scale 1
        assert_eq!(scaler.scale()[1], 1.0);
        assert_eq!(xs.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn transform_rejects_other_widths() {
        let scaler = Standardizer::fit(array![[1.0, 2.0]].view()).unwrap();
        assert!(scaler.transform(array![[1.0]].view()).is_err());
    }

    #[test]
    fn from_parts_rejects_zero_scale() {
        assert!(Standardizer::from_parts(vec![0.0], vec![0.0]).is_err());
        assert!(Standardizer::from_parts(vec![0.0], vec![1.0, 1.0]).is_err());
    }
}
