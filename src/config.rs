use std::{env, num::NonZeroUsize, path::PathBuf};

use registry::{GcsStore, LocalStore, ObjectStore};

use crate::error::ConfigErr;

pub const DEFAULT_BUCKET: &str = "your-bucket-name";
pub const DEFAULT_VERSION_KEY: &str = "model_version.txt";
pub const DEFAULT_STORE_ROOT: &str = "bucket";
pub const DEFAULT_MAX_ITERS: NonZeroUsize = NonZeroUsize::new(1000).unwrap();
pub const DEFAULT_LOCAL_MODEL_PATH: &str = "trained_models/model.bin";

/// Where artifacts get published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Gcs {
        endpoint: String,
        token: Option<String>,
    },
    Local {
        root: PathBuf,
    },
}

/// The settings of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub bucket: String,
    pub version_key: String,
    pub backend: Backend,
    pub max_iters: NonZeroUsize,
    /// Where to keep a local copy of the model, `None` to skip it.
    pub local_model_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            version_key: DEFAULT_VERSION_KEY.to_string(),
            backend: Backend::Gcs {
                endpoint: GcsStore::DEFAULT_ENDPOINT.to_string(),
                token: None,
            },
            max_iters: DEFAULT_MAX_ITERS,
            local_model_path: Some(PathBuf::from(DEFAULT_LOCAL_MODEL_PATH)),
        }
    }
}

impl PipelineConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, unset variables take their default.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, if set.
    ///
    /// # Returns
    /// The configuration or an error if a value can't be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErr>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let backend = match or("STORE_BACKEND", "gcs").trim().to_ascii_lowercase().as_str() {
            "gcs" => Backend::Gcs {
                endpoint: or("GCS_ENDPOINT", GcsStore::DEFAULT_ENDPOINT),
                token: lookup("GCS_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
            },
            "local" => Backend::Local {
                root: PathBuf::from(or("STORE_ROOT", DEFAULT_STORE_ROOT)),
            },
            other => return Err(ConfigErr::UnknownBackend(other.to_string())),
        };

        let max_iters = match lookup("MAX_ITERS") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigErr::InvalidNumber {
                    var: "MAX_ITERS",
                    value,
                })?,
            None => DEFAULT_MAX_ITERS,
        };

        let local_model_path = Some(or("LOCAL_MODEL_PATH", DEFAULT_LOCAL_MODEL_PATH))
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bucket: or("GCS_BUCKET_NAME", DEFAULT_BUCKET),
            version_key: or("VERSION_FILE_NAME", DEFAULT_VERSION_KEY),
            backend,
            max_iters,
            local_model_path,
        })
    }

    /// Opens the configured object store.
    pub fn open_store(&self) -> registry::Result<Box<dyn ObjectStore>> {
        let store: Box<dyn ObjectStore> = match &self.backend {
            Backend::Gcs { endpoint, token } => {
                Box::new(GcsStore::new(endpoint, &self.bucket, token.clone())?)
            }
            Backend::Local { root } => Box::new(LocalStore::new(root)),
        };

        Ok(store)
    }
}
