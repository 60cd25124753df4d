use ndarray::{Array2, ArrayView2, Axis};

use super::LossFn;

/// Softmax cross-entropy loss, the multinomial logistic regression objective.
#[derive(Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, scores: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let n = scores.nrows().max(1) as f32;
        let p = softmax(scores);

        let total: f32 = p
            .iter()
            .zip(y.iter())
            .filter(|&(_, &t)| t > 0.0)
            .map(|(&p, &t)| -t * p.max(f32::MIN_POSITIVE).ln())
            .sum();

        total / n
    }

    fn loss_prime(&self, scores: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = scores.nrows().max(1) as f32;
        (softmax(scores) - &y) / n
    }
}

/// Turns every row of `scores` into a probability distribution.
///
/// Each row is shifted by its maximum before exponentiating so large scores don't overflow.
pub fn softmax(scores: ArrayView2<f32>) -> Array2<f32> {
    let mut p = scores.to_owned();

    for mut row in p.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }

    p
}
