use ndarray::{Array2, ArrayView2};

/// A loss over raw model scores and one-hot encoded targets.
pub trait LossFn {
    /// Returns the mean loss over the rows of `scores`.
    fn loss(&self, scores: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// Returns the derivative of `loss` with respect to `scores`.
    fn loss_prime(&self, scores: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}
