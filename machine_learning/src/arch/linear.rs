use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result};

/// A fully connected layer without activation: `z = x·W + b`.
///
/// The layer owns no parameters, it only knows how to interpret a flat parameter slice as a
/// `(n_in, n_out)` weight matrix followed by `n_out` biases.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    dim: (usize, usize),
    size: usize,
}

impl Linear {
    /// Creates a new `Linear`.
    ///
    /// # Arguments
    /// * `dim` - The `(inputs, outputs)` dimension of the layer.
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Returns the amount of weights, that is, the parameters preceding the biases.
    pub fn weights_size(&self) -> usize {
        self.size - self.dim.1
    }

    /// Computes the scores of every row in `x`.
    ///
    /// # Arguments
    /// * `params` - The parameters of this layer.
    /// * `x` - A `(samples, inputs)` matrix.
    ///
    /// # Returns
    /// A `(samples, outputs)` matrix of scores.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "input columns",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        Ok(z)
    }

    /// Writes the gradient of the loss with respect to the parameters into `grad`.
    ///
    /// # Arguments
    /// * `x` - The input given to the matching `forward` call.
    /// * `d` - The derivative of the loss with respect to the scores.
    /// * `grad` - A buffer of `size` values to write the gradient to.
    pub fn backward(&self, x: ArrayView2<f32>, d: ArrayView2<f32>, grad: &mut [f32]) -> Result<()> {
        if d.dim() != (x.nrows(), self.dim.1) {
            return Err(MlErr::SizeMismatch {
                what: "score deltas",
                got: d.len(),
                expected: x.nrows() * self.dim.1,
            });
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        Ok(())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("gradient", grad.len())?;

        let (dw_raw, db_raw) = grad.split_at_mut(self.weights_size());
        // SAFETY: `check_len` guarantees both halves have the right amount of values.
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).unwrap();
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).unwrap();
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    pub fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("parameters", params.len())?;

        let (w_raw, b_raw) = params.split_at(self.weights_size());
        // SAFETY: `check_len` guarantees both halves have the right amount of values.
        let w = ArrayView2::from_shape(self.dim, w_raw).unwrap();
        let b = ArrayView1::from_shape(self.dim.1, b_raw).unwrap();
        Ok((w, b))
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }
}
