//! Classification metrics over aligned true/predicted label slices.

use std::{collections::BTreeSet, fmt};

use crate::{MlErr, Result};

/// The evaluation of a classifier over a held-out set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub accuracy: f64,
    pub f1: f64,
}

impl Metrics {
    /// Computes the accuracy and the weighted F1 score of `y_pred` against `y_true`.
    pub fn evaluate(y_true: &[u32], y_pred: &[u32]) -> Result<Self> {
        Ok(Self {
            accuracy: accuracy_score(y_true, y_pred)?,
            f1: f1_score_weighted(y_true, y_pred)?,
        })
    }
}

/// The plain text record written next to every published model.
impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {}", self.accuracy)?;
        writeln!(f, "F1 Score: {}", self.f1)
    }
}

/// Returns the fraction of predictions equal to the true label.
pub fn accuracy_score(y_true: &[u32], y_pred: &[u32]) -> Result<f64> {
    check_aligned(y_true, y_pred)?;

    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(hits as f64 / y_true.len() as f64)
}

/// Returns the F1 score of every class averaged with weights equal to the class support.
///
/// Classes appearing only in the predictions take part with zero weight. A class whose precision
/// or recall is undefined scores 0.
pub fn f1_score_weighted(y_true: &[u32], y_pred: &[u32]) -> Result<f64> {
    check_aligned(y_true, y_pred)?;

    let classes: BTreeSet<u32> = y_true.iter().chain(y_pred).copied().collect();
    let total = y_true.len() as f64;

    let score = classes
        .into_iter()
        .map(|class| {
            let support = y_true.iter().filter(|&&t| t == class).count();
            f1_score_of(class, y_true, y_pred) * support as f64 / total
        })
        .sum();

    Ok(score)
}

fn f1_score_of(class: u32, y_true: &[u32], y_pred: &[u32]) -> f64 {
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);

    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t == class, p == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    if precision + recall == 0.0 {
        return 0.0;
    }

    2.0 * precision * recall / (precision + recall)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn check_aligned(y_true: &[u32], y_pred: &[u32]) -> Result<()> {
    if y_true.is_empty() {
        return Err(MlErr::EmptyInput { what: "label set" });
    }

    if y_true.len() != y_pred.len() {
        return Err(MlErr::SizeMismatch {
            what: "predictions",
            got: y_pred.len(),
            expected: y_true.len(),
        });
    }

    Ok(())
}
