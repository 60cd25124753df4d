use ndarray::{Array2, ArrayView2, Axis};

use super::{Linear, Standardizer, loss::softmax};
use crate::{MlErr, Result, dataset::Dataset};

/// A fitted multinomial logistic regression classifier.
///
/// The model is bound to the feature ordering it was fitted on: inputs are standardized with the
/// statistics learned at fit time and scored by a single linear layer, one output per class.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    feature_names: Vec<String>,
    scaler: Standardizer,
    linear: Linear,
    params: Vec<f32>,
}

impl LogisticRegression {
    /// Assembles a model from its parts.
    ///
    /// # Arguments
    /// * `feature_names` - The feature ordering the model expects.
    /// * `scaler` - The standardization learned at fit time.
    /// * `n_classes` - The amount of classes.
    /// * `params` - The flat weights (`features × classes`) followed by the intercepts.
    ///
    /// # Returns
    /// A new `LogisticRegression` or an error if the parts don't agree on their sizes.
    pub fn from_parts(
        feature_names: Vec<String>,
        scaler: Standardizer,
        n_classes: usize,
        params: Vec<f32>,
    ) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(MlErr::EmptyInput { what: "feature set" });
        }

        if n_classes == 0 {
            return Err(MlErr::EmptyInput { what: "class set" });
        }

        if scaler.len() != feature_names.len() {
            return Err(MlErr::SizeMismatch {
                what: "standardization statistics",
                got: scaler.len(),
                expected: feature_names.len(),
            });
        }

        let linear = Linear::new((feature_names.len(), n_classes));
        if params.len() != linear.size() {
            return Err(MlErr::SizeMismatch {
                what: "parameters",
                got: params.len(),
                expected: linear.size(),
            });
        }

        Ok(Self {
            feature_names,
            scaler,
            linear,
            params,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.linear.dim().0
    }

    pub fn n_classes(&self) -> usize {
        self.linear.dim().1
    }

    pub fn scaler(&self) -> &Standardizer {
        &self.scaler
    }

    /// Returns the flat parameter slice, weights first and intercepts last.
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// Computes the raw class scores of every row in `x`.
    pub fn decision_function(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let xs = self.scaler.transform(x)?;
        self.linear.forward(&self.params, xs.view())
    }

    /// Computes the class probabilities of every row in `x`.
    pub fn predict_proba(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let scores = self.decision_function(x)?;
        Ok(softmax(scores.view()))
    }

    /// Predicts the class id of every row in `x`.
    ///
    /// Ties resolve to the lowest class id.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Vec<u32>> {
        let scores = self.decision_function(x)?;
        let preds = scores
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best = 0;
                for (class, &score) in row.iter().enumerate() {
                    if score > row[best] {
                        best = class;
                    }
                }
                best as u32
            })
            .collect();

        Ok(preds)
    }

    /// Predicts the class id of every sample in `dataset`.
    ///
    /// # Returns
    /// The predictions or an error if the dataset's features differ from the fitted ones.
    pub fn predict_dataset(&self, dataset: &Dataset) -> Result<Vec<u32>> {
        if dataset.feature_names() != self.feature_names.as_slice() {
            return Err(MlErr::FeatureMismatch {
                got: dataset.feature_names().to_vec(),
                expected: self.feature_names.clone(),
            });
        }

        self.predict(dataset.features())
    }
}
