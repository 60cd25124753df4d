use std::fmt;

use log::{error, info};
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::{
    Result,
    store::{OCTET_STREAM, ObjectStore, TEXT_PLAIN},
    version,
};

pub const MODELS_PREFIX: &str = "trained_models";
pub const METRICS_PREFIX: &str = "metrics";

/// What a published object holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    VersionedModel,
    TimestampedModel,
    LatestModel,
    TimestampedMetrics,
    LatestMetrics,
    Version,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::VersionedModel => "versioned model",
            ArtifactKind::TimestampedModel => "timestamped model",
            ArtifactKind::LatestModel => "latest model",
            ArtifactKind::TimestampedMetrics => "timestamped metrics",
            ArtifactKind::LatestMetrics => "latest metrics",
            ArtifactKind::Version => "version",
        };
        f.write_str(name)
    }
}

/// The outcome of a single write.
#[derive(Debug)]
pub struct Upload {
    pub kind: ArtifactKind,
    pub key: String,
    pub uri: String,
    pub result: Result<()>,
}

/// Every write attempted by a publish, in the order they were made.
#[derive(Debug)]
pub struct PublishReport {
    pub version: u64,
    pub uploads: Vec<Upload>,
}

impl PublishReport {
    pub fn failures(&self) -> impl Iterator<Item = &Upload> {
        self.uploads.iter().filter(|u| u.result.is_err())
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

pub fn versioned_model_key(version: u64) -> String {
    format!("{MODELS_PREFIX}/model_v{version}.bin")
}

pub fn timestamped_model_key(timestamp: &str) -> String {
    format!("{MODELS_PREFIX}/model_{timestamp}.bin")
}

pub fn latest_model_key() -> String {
    format!("{MODELS_PREFIX}/latest_model.bin")
}

pub fn timestamped_metrics_key(timestamp: &str) -> String {
    format!("{METRICS_PREFIX}/evaluation_{timestamp}.txt")
}

pub fn latest_metrics_key() -> String {
    format!("{METRICS_PREFIX}/latest_evaluation.txt")
}

/// Formats `at` as `YYYYMMDD-HHMMSS` in UTC.
pub fn timestamp(at: OffsetDateTime) -> String {
    const FORMAT: &[FormatItem<'_>] =
        format_description!("[year][month][day]-[hour][minute][second]");
    let at = at.to_offset(time::UtcOffset::UTC);
    at.format(&FORMAT).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Publishes trained models, their metrics and the version counter to an object store.
pub struct Publisher<S> {
    store: S,
    version_key: String,
}

impl<S: ObjectStore> Publisher<S> {
    /// Creates a new `Publisher`.
    ///
    /// # Arguments
    /// * `store` - The destination store.
    /// * `version_key` - The key of the version counter object.
    pub fn new(store: S, version_key: impl Into<String>) -> Self {
        Self {
            store,
            version_key: version_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the counter and returns the version the next publish should carry.
    ///
    /// # Returns
    /// The current version plus one, or an error if the counter is malformed.
    pub fn next_version(&self) -> Result<u64> {
        let current = version::read_version(&self.store, &self.version_key)?;
        info!(current = current; "read model version");
        Ok(current + 1)
    }

    /// Publishes with the current time as timestamp. See `publish_at`.
    pub fn publish(&self, version: u64, model: &[u8], metrics: &str) -> PublishReport {
        self.publish_at(version, model, metrics, &timestamp(OffsetDateTime::now_utc()))
    }

    /// Writes the model, the metrics and the new version counter.
    ///
    /// Writes happen in a fixed order: the model under its versioned, timestamped and latest keys,
    /// then the metrics under their timestamped and latest keys, and the counter last. A failed
    /// write is logged and doesn't stop the ones after it.
    ///
    /// # Arguments
    /// * `version` - The version of this model, usually from `next_version`.
    /// * `model` - The encoded model.
    /// * `metrics` - The metrics record.
    /// * `timestamp` - The tag used in the timestamped keys.
    ///
    /// # Returns
    /// The outcome of every write.
    pub fn publish_at(
        &self,
        version: u64,
        model: &[u8],
        metrics: &str,
        timestamp: &str,
    ) -> PublishReport {
        let version_text = version.to_string();
        let writes: [(ArtifactKind, String, &[u8], &str); 6] = [
            (
                ArtifactKind::VersionedModel,
                versioned_model_key(version),
                model,
                OCTET_STREAM,
            ),
            (
                ArtifactKind::TimestampedModel,
                timestamped_model_key(timestamp),
                model,
                OCTET_STREAM,
            ),
            (
                ArtifactKind::LatestModel,
                latest_model_key(),
                model,
                OCTET_STREAM,
            ),
            (
                ArtifactKind::TimestampedMetrics,
                timestamped_metrics_key(timestamp),
                metrics.as_bytes(),
                TEXT_PLAIN,
            ),
            (
                ArtifactKind::LatestMetrics,
                latest_metrics_key(),
                metrics.as_bytes(),
                TEXT_PLAIN,
            ),
            (
                ArtifactKind::Version,
                self.version_key.clone(),
                version_text.as_bytes(),
                TEXT_PLAIN,
            ),
        ];

        let uploads = writes
            .into_iter()
            .map(|(kind, key, bytes, content_type)| {
                let uri = self.store.uri(&key);
                let result = self.store.put(&key, bytes, content_type);
                match &result {
                    Ok(()) => info!(len = bytes.len(); "uploaded {kind} to {uri}"),
                    Err(e) => error!("failed to upload {kind} to {uri}: {e}"),
                }

                Upload {
                    kind,
                    key,
                    uri,
                    result,
                }
            })
            .collect();

        PublishReport { version, uploads }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use time::macros::datetime;

    use super::*;
    use crate::{RegistryErr, store::MemoryStore};

    const VERSION_KEY: &str = "model_version.txt";
    const TS: &str = "20240102-030405";

    /// Rejects writes to keys containing `reject`, remembering every attempt.
    struct FlakyStore {
        inner: MemoryStore,
        reject: &'static str,
        attempts: Mutex<Vec<String>>,
    }

    impl FlakyStore {
        fn new(reject: &'static str) -> Self {
            Self {
                inner: MemoryStore::new(),
                reject,
                attempts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ObjectStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
            self.attempts.lock().push(key.to_string());
            if key.contains(self.reject) {
                return Err(RegistryErr::Http {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            self.inner.put(key, bytes, content_type)
        }

        fn uri(&self, key: &str) -> String {
            self.inner.uri(key)
        }
    }

    #[test]
    fn timestamps_are_utc_and_sortable() {
        assert_eq!(timestamp(datetime!(2024-01-02 03:04:05 UTC)), TS);
        assert_eq!(timestamp(datetime!(2024-01-02 05:04:05 +2)), TS);
    }

    #[test]
    fn next_version_starts_at_one() {
        let publisher = Publisher::new(MemoryStore::new(), VERSION_KEY);
        assert_eq!(publisher.next_version().unwrap(), 1);

        let store = MemoryStore::new().with_object(VERSION_KEY, "4");
        assert_eq!(Publisher::new(store, VERSION_KEY).next_version().unwrap(), 5);
    }

    #[test]
    fn publish_writes_every_artifact_in_order() {
        let publisher = Publisher::new(MemoryStore::new(), VERSION_KEY);
        let report = publisher.publish_at(3, b"model", "Accuracy: 1\n", TS);

        assert!(report.is_complete());
        let keys: Vec<_> = report.uploads.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "trained_models/model_v3.bin",
                "trained_models/model_20240102-030405.bin",
                "trained_models/latest_model.bin",
                "metrics/evaluation_20240102-030405.txt",
                "metrics/latest_evaluation.txt",
                VERSION_KEY,
            ]
        );

        let store = publisher.store();
        assert_eq!(store.object("trained_models/latest_model.bin").unwrap(), b"model");
        assert_eq!(
            store.content_type("trained_models/model_v3.bin").as_deref(),
            Some(OCTET_STREAM)
        );
        assert_eq!(
            store.object("metrics/latest_evaluation.txt").unwrap(),
            b"Accuracy: 1\n"
        );
        assert_eq!(store.object(VERSION_KEY).unwrap(), b"3");
        assert_eq!(store.content_type(VERSION_KEY).as_deref(), Some(TEXT_PLAIN));
    }

    #[test]
    fn failed_writes_do_not_stop_the_rest() {
        let publisher = Publisher::new(FlakyStore::new("trained_models"), VERSION_KEY);
        let report = publisher.publish_at(1, b"model", "m", TS);

        assert_eq!(publisher.store().attempts.lock().len(), 6);
        let failed: Vec<_> = report.failures().map(|u| u.kind).collect();
        assert_eq!(
            failed,
            [
                ArtifactKind::VersionedModel,
                ArtifactKind::TimestampedModel,
                ArtifactKind::LatestModel,
            ]
        );
        assert_eq!(publisher.store().inner.object(VERSION_KEY).unwrap(), b"1");
    }
}
