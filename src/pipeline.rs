use std::{fs, io::Write};

use log::{info, warn};
use machine_learning::{FitReport, Metrics, Trainer, artifact, load_iris};
use registry::{ObjectStore, PublishReport, Publisher};

use crate::{Result, config::PipelineConfig};

/// Seed of the train/test shuffle.
pub const SEED: u64 = 42;

/// Fraction of the samples held out for evaluation.
pub const TEST_SIZE: f64 = 0.2;

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub version: u64,
    pub fit: FitReport,
    pub metrics: Metrics,
    pub publish: PublishReport,
}

/// Trains, evaluates and publishes a model.
///
/// Progress goes to `out`, one header per step, ending with `MODEL_VERSION=<n>`. Failed uploads
/// are reported there and don't fail the run; anything else does.
///
/// # Arguments
/// * `config` - The run's settings.
/// * `store` - Where artifacts get published.
/// * `out` - The progress sink.
///
/// # Returns
/// The run's summary or the error that stopped it.
pub fn run<S, W>(config: &PipelineConfig, store: S, out: &mut W) -> Result<RunSummary>
where
    S: ObjectStore,
    W: Write,
{
    writeln!(out, "==> Loading dataset")?;
    let dataset = load_iris()?;
    writeln!(
        out,
        "{} samples, {} features, {} classes",
        dataset.len(),
        dataset.x_size(),
        dataset.n_classes()
    )?;

    writeln!(out, "==> Splitting (test size {TEST_SIZE}, seed {SEED})")?;
    let (train, test) = dataset.train_test_split(TEST_SIZE, SEED)?;
    writeln!(out, "train: {} samples, test: {} samples", train.len(), test.len())?;

    writeln!(out, "==> Training (max {} iterations)", config.max_iters)?;
    let mut trainer = Trainer::logistic(config.max_iters);
    let (model, fit) = trainer.fit(&train)?;
    writeln!(
        out,
        "{} iterations, loss {:.6}, converged: {}",
        fit.iterations, fit.loss, fit.converged
    )?;

    writeln!(out, "==> Evaluating")?;
    let y_pred = model.predict_dataset(&test)?;
    let metrics = Metrics::evaluate(test.labels(), &y_pred)?;
    write!(out, "{metrics}")?;
    info!(accuracy = metrics.accuracy, f1 = metrics.f1; "evaluated model");

    writeln!(out, "==> Reading model version")?;
    let publisher = Publisher::new(store, &config.version_key);
    let version = publisher.next_version()?;
    writeln!(out, "current version {}, publishing version {version}", version - 1)?;

    let model_bytes = artifact::encode(&model)?;
    if let Some(path) = &config.local_model_path {
        writeln!(out, "==> Saving model locally")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &model_bytes)?;
        writeln!(out, "model saved to {}", path.display())?;
    }

    writeln!(out, "==> Publishing")?;
    let publish = publisher.publish(version, &model_bytes, &metrics.to_string());
    for upload in &publish.uploads {
        match &upload.result {
            Ok(()) => writeln!(out, "uploaded {} to {}", upload.kind, upload.uri)?,
            Err(e) => writeln!(out, "failed to upload {} to {}: {e}", upload.kind, upload.uri)?,
        }
    }
    if !publish.is_complete() {
        warn!("{} of {} uploads failed", publish.failures().count(), publish.uploads.len());
    }

    writeln!(out, "MODEL_VERSION={version}")?;

    Ok(RunSummary {
        version,
        fit,
        metrics,
        publish,
    })
}
