#![cfg(test)]

use std::num::NonZeroUsize;

use crate::{Metrics, Trainer, artifact, dataset::load_iris};

const SEED: u64 = 42;
const TEST_SIZE: f64 = 0.2;

fn iris_run(max_iters: usize) -> (Vec<u32>, Vec<u32>, Metrics) {
    let dataset = load_iris().unwrap();
    let (train, test) = dataset.train_test_split(TEST_SIZE, SEED).unwrap();

    let mut trainer = Trainer::logistic(NonZeroUsize::new(max_iters).unwrap());
    let (model, _) = trainer.fit(&train).unwrap();
    let y_pred = model.predict_dataset(&test).unwrap();
    let metrics = Metrics::evaluate(test.labels(), &y_pred).unwrap();

    (test.labels().to_vec(), y_pred, metrics)
}

#[test]
fn test_iris_split_sizes() {
    let dataset = load_iris().unwrap();
    let (train, test) = dataset.train_test_split(TEST_SIZE, SEED).unwrap();

    assert_eq!(train.len(), 120);
    assert_eq!(test.len(), 30);
    assert_eq!(train.x_size(), 4);
}

#[test]
fn test_iris_logistic_regression_convergence() {
    let dataset = load_iris().unwrap();
    let (train, _) = dataset.train_test_split(TEST_SIZE, SEED).unwrap();

    let mut trainer = Trainer::logistic(NonZeroUsize::new(5000).unwrap());
    let (model, report) = trainer.fit(&train).unwrap();

    assert!(report.converged, "{report:?}");
    assert!(report.loss < 0.3, "{report:?}");

    let y_pred = model.predict_dataset(&train).unwrap();
    let train_metrics = Metrics::evaluate(train.labels(), &y_pred).unwrap();
    assert!(train_metrics.accuracy > 0.9, "{train_metrics:?}");
}

#[test]
fn test_iris_held_out_metrics() {
    let (_, _, metrics) = iris_run(1000);

    assert!(metrics.accuracy > 0.85, "{metrics:?}");
    assert!(metrics.f1 > 0.85, "{metrics:?}");
    assert!(metrics.accuracy <= 1.0 && metrics.f1 <= 1.0);
}

#[test]
fn test_iris_runs_are_reproducible() {
    assert_eq!(iris_run(200), iris_run(200));
}

#[test]
fn test_iris_model_survives_encoding() {
    let dataset = load_iris().unwrap();
    let mut trainer = Trainer::logistic(NonZeroUsize::new(300).unwrap());
    let (model, _) = trainer.fit(&dataset).unwrap();

    let decoded = artifact::decode(&artifact::encode(&model).unwrap()).unwrap();
    assert_eq!(
        decoded.predict_dataset(&dataset).unwrap(),
        model.predict_dataset(&dataset).unwrap()
    );
}
