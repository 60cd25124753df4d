use std::{fs, num::NonZeroUsize};

use machine_learning::artifact;
use model_pipeline::{Backend, PipelineConfig, PipelineErr, run};
use registry::{
    LocalStore, MemoryStore, ObjectStore, RegistryErr, Result as RegistryResult,
    publisher::{latest_metrics_key, latest_model_key, versioned_model_key},
};

const VERSION_KEY: &str = "model_version.txt";

fn config() -> PipelineConfig {
    PipelineConfig {
        version_key: VERSION_KEY.to_string(),
        max_iters: NonZeroUsize::new(1000).unwrap(),
        local_model_path: None,
        ..PipelineConfig::default()
    }
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

/// A store that is down for everything.
struct Outage;

impl ObjectStore for Outage {
    fn get(&self, _: &str) -> RegistryResult<Option<Vec<u8>>> {
        Err(RegistryErr::Transport("connection refused".into()))
    }

    fn put(&self, _: &str, _: &[u8], _: &str) -> RegistryResult<()> {
        Err(RegistryErr::Transport("connection refused".into()))
    }

    fn uri(&self, key: &str) -> String {
        format!("gs://down/{key}")
    }
}

#[test]
fn first_run_publishes_version_one() {
    let store = MemoryStore::new();
    let mut out = Vec::new();

    let summary = run(&config(), &store, &mut out).unwrap();

    assert_eq!(summary.version, 1);
    assert!(summary.publish.is_complete());
    assert!(summary.metrics.accuracy > 0.85, "{:?}", summary.metrics);
    assert!(summary.metrics.f1 > 0.85, "{:?}", summary.metrics);

    assert_eq!(store.object(VERSION_KEY).unwrap(), b"1");
    assert_eq!(store.keys().len(), 6);
    assert_eq!(
        store.object(&versioned_model_key(1)),
        store.object(&latest_model_key())
    );

    let metrics = String::from_utf8(store.object(&latest_metrics_key()).unwrap()).unwrap();
    assert_eq!(metrics, summary.metrics.to_string());

    let out = output(out);
    assert!(out.ends_with("MODEL_VERSION=1\n"), "{out}");
}

#[test]
fn existing_counter_is_incremented() {
    let store = MemoryStore::new().with_object(VERSION_KEY, "4\n");
    let mut out = Vec::new();

    let summary = run(&config(), &store, &mut out).unwrap();

    assert_eq!(summary.version, 5);
    assert_eq!(store.object(VERSION_KEY).unwrap(), b"5");
    assert!(store.object(&versioned_model_key(5)).is_some());
    assert!(output(out).contains("MODEL_VERSION=5"));
}

#[test]
fn malformed_counter_fails_before_publishing() {
    let store = MemoryStore::new().with_object(VERSION_KEY, "latest");
    let mut out = Vec::new();

    let err = run(&config(), &store, &mut out).unwrap_err();

    assert!(matches!(
        err,
        PipelineErr::Registry(RegistryErr::MalformedVersion { .. })
    ));
    assert_eq!(store.keys(), [VERSION_KEY]);
    assert!(!output(out).contains("MODEL_VERSION"));
}

#[test]
fn malformed_counter_leaves_no_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("models/model.bin");
    let config = PipelineConfig {
        local_model_path: Some(model_path.clone()),
        ..config()
    };
    let store = MemoryStore::new().with_object(VERSION_KEY, "abc");
    let mut out = Vec::new();

    assert!(run(&config, &store, &mut out).is_err());

    assert!(!model_path.exists());
    assert!(!output(out).contains("Saving model locally"));
}

#[test]
fn store_outage_does_not_fail_the_run() {
    let mut out = Vec::new();

    let summary = run(&config(), Outage, &mut out).unwrap();

    assert_eq!(summary.version, 1);
    assert_eq!(summary.publish.failures().count(), 6);

    let out = output(out);
    assert!(out.contains("failed to upload latest model to gs://down/"), "{out}");
    assert!(out.ends_with("MODEL_VERSION=1\n"), "{out}");
}

#[test]
fn runs_are_reproducible() {
    let first = run(&config(), MemoryStore::new(), &mut Vec::new()).unwrap();
    let second = run(&config(), MemoryStore::new(), &mut Vec::new()).unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.fit, second.fit);
}

#[test]
fn local_backend_round_trips_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        backend: Backend::Local {
            root: dir.path().join("bucket"),
        },
        local_model_path: Some(dir.path().join("models/model.bin")),
        ..config()
    };

    let store = config.open_store().unwrap();
    run(&config, store, &mut Vec::new()).unwrap();
    let store = config.open_store().unwrap();
    let summary = run(&config, store, &mut Vec::new()).unwrap();
    assert_eq!(summary.version, 2);

    let local = fs::read(dir.path().join("models/model.bin")).unwrap();
    let published = LocalStore::new(dir.path().join("bucket"))
        .get(&versioned_model_key(2))
        .unwrap()
        .unwrap();
    assert_eq!(local, published);

    let model = artifact::decode(&published).unwrap();
    assert_eq!(model.n_features(), 4);
    assert_eq!(model.n_classes(), 3);
}
