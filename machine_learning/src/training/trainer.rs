use std::num::NonZeroUsize;

use log::{debug, warn};
use ndarray::Array2;

use crate::{
    MlErr, Result,
    arch::{
        Linear, LogisticRegression, Standardizer,
        loss::{CrossEntropy, LossFn},
    },
    dataset::Dataset,
    optimization::{GradientDescent, Optimizer},
};

/// The step length used by `Trainer::logistic`.
pub const LEARNING_RATE: f32 = 1.0;

/// Fitting stops once no gradient component is larger than this.
pub const TOLERANCE: f32 = 1e-4;

/// Inverse of the L2 regularization strength, smaller values regularize more.
pub const INVERSE_REGULARIZATION: f32 = 1.0;

const LOG_EVERY: usize = 100;

/// Summary of a `Trainer::fit` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// The amount of parameter updates performed.
    pub iterations: usize,
    /// The regularized loss at the last evaluated parameters.
    pub loss: f32,
    /// Whether the gradient fell below the tolerance before the iteration cap.
    pub converged: bool,
}

/// Fits `LogisticRegression` models with full-batch gradient steps.
///
/// Features are standardized, parameters start at zero and every iteration evaluates the loss
/// over the whole dataset, adds an L2 penalty over the weights (not the intercepts) and lets the
/// optimizer take one step.
pub struct Trainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    optimizer: O,
    loss_fn: L,
    max_iters: NonZeroUsize,
    tolerance: f32,
    inverse_regularization: f32,
}

impl Trainer<GradientDescent, CrossEntropy> {
    /// Returns the standard logistic regression trainer.
    ///
    /// # Arguments
    /// * `max_iters` - The iteration cap.
    pub fn logistic(max_iters: NonZeroUsize) -> Self {
        Self::new(
            GradientDescent::new(LEARNING_RATE),
            CrossEntropy::new(),
            max_iters,
        )
    }
}

impl<O, L> Trainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `optimizer` - The algorithm that updates the parameters.
    /// * `loss_fn` - The loss being minimized.
    /// * `max_iters` - The iteration cap.
    pub fn new(optimizer: O, loss_fn: L, max_iters: NonZeroUsize) -> Self {
        Self {
            optimizer,
            loss_fn,
            max_iters,
            tolerance: TOLERANCE,
            inverse_regularization: INVERSE_REGULARIZATION,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_inverse_regularization(mut self, c: f32) -> Self {
        self.inverse_regularization = c;
        self
    }

    /// Fits a model to every sample of `dataset`.
    ///
    /// Hitting the iteration cap without converging is not an error, it's reported through
    /// `FitReport::converged`.
    ///
    /// # Returns
    /// The fitted model and a summary of the fit, or an error if the loss diverges.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(LogisticRegression, FitReport)> {
        if dataset.is_empty() {
            return Err(MlErr::EmptyInput { what: "training set" });
        }

        let n = dataset.len();
        let n_classes = dataset.n_classes();
        let scaler = Standardizer::fit(dataset.features())?;
        let x = scaler.transform(dataset.features())?;
        let y = one_hot(dataset.labels(), n_classes);

        let linear = Linear::new((dataset.x_size(), n_classes));
        let w_size = linear.weights_size();
        let lambda = 1.0 / (self.inverse_regularization * n as f32);

        let mut params = vec![0.0; linear.size()];
        let mut grad = vec![0.0; linear.size()];
        let mut report = FitReport {
            iterations: 0,
            loss: f32::NAN,
            converged: false,
        };

        for i in 0..self.max_iters.get() {
            let scores = linear.forward(&params, x.view())?;

            let penalty: f32 = params[..w_size].iter().map(|w| w * w).sum();
            let loss = self.loss_fn.loss(scores.view(), y.view()) + 0.5 * lambda * penalty;
            if !loss.is_finite() {
                return Err(MlErr::Diverged { iteration: i });
            }
            report.loss = loss;

            let d = self.loss_fn.loss_prime(scores.view(), y.view());
            linear.backward(x.view(), d.view(), &mut grad)?;
            for (g, w) in grad[..w_size].iter_mut().zip(&params[..w_size]) {
                *g += lambda * w;
            }

            let max_grad = grad.iter().fold(0f32, |m, g| m.max(g.abs()));
            if i % LOG_EVERY == 0 {
                debug!(iteration = i, loss = loss, max_grad = max_grad; "fitting");
            }

            if max_grad < self.tolerance {
                report.converged = true;
                break;
            }

            self.optimizer.update_params(&mut params, &grad)?;
            report.iterations += 1;
        }

        if !report.converged {
            warn!(
                iterations = report.iterations, loss = report.loss;
                "reached the iteration cap before converging"
            );
        }

        let model = LogisticRegression::from_parts(
            dataset.feature_names().to_vec(),
            scaler,
            n_classes,
            params,
        )?;

        Ok((model, report))
    }
}

/// Encodes class ids as rows of a `(samples, classes)` indicator matrix.
fn one_hot(labels: &[u32], n_classes: usize) -> Array2<f32> {
    let mut y = Array2::zeros((labels.len(), n_classes));
    for (i, &class) in labels.iter().enumerate() {
        y[[i, class as usize]] = 1.0;
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> Dataset {
        Dataset::new(
            vec!["x".into()],
            vec!["low".into(), "high".into()],
            vec![-3.0, -2.0, -1.0, 1.0, 2.0, 3.0],
            vec![0, 0, 0, 1, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn one_hot_marks_each_label() {
        let y = one_hot(&[2, 0], 3);
        assert_eq!(y.as_slice().unwrap(), &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn fits_a_separable_problem() {
        let ds = separable();
        let mut trainer = Trainer::logistic(NonZeroUsize::new(500).unwrap());
        let (model, report) = trainer.fit(&ds).unwrap();

        assert!(report.loss < 0.5);
        assert_eq!(model.predict(ds.features()).unwrap(), ds.labels());
    }

    #[test]
    fn iteration_cap_is_respected() {
        let ds = separable();
        let mut trainer = Trainer::logistic(NonZeroUsize::new(3).unwrap());
        let (_, report) = trainer.fit(&ds).unwrap();

        assert_eq!(report.iterations, 3);
        assert!(!report.converged);
    }

    #[test]
    fn loose_tolerance_converges_early() {
        let ds = separable();
        let mut trainer =
            Trainer::logistic(NonZeroUsize::new(1000).unwrap()).with_tolerance(1e-1);
        let (_, report) = trainer.fit(&ds).unwrap();

        assert!(report.converged);
        assert!(report.iterations < 1000);
    }

    #[test]
    fn huge_steps_diverge() {
        let ds = Dataset::new(
            vec!["x".into()],
            vec!["a".into(), "b".into()],
            vec![1e30, -1e30],
            vec![0, 1],
        )
        .unwrap();
        let mut trainer = Trainer::new(
            GradientDescent::new(1e30),
            CrossEntropy,
            NonZeroUsize::new(50).unwrap(),
        )
        .with_inverse_regularization(1e-30);

        assert!(matches!(trainer.fit(&ds), Err(MlErr::Diverged { .. })));
    }
}
