use std::{error::Error, fmt, io};

use machine_learning::MlErr;
use registry::RegistryErr;

/// The pipeline's result type.
pub type Result<T> = std::result::Result<T, PipelineErr>;

/// An environment variable that couldn't be turned into a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErr {
    InvalidNumber { var: &'static str, value: String },
    UnknownBackend(String),
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::InvalidNumber { var, value } => {
                write!(f, "{var} must be a positive integer, got {value:?}")
            }
            ConfigErr::UnknownBackend(backend) => {
                write!(f, "unknown store backend {backend:?}, expected \"gcs\" or \"local\"")
            }
        }
    }
}

impl Error for ConfigErr {}

/// Every failure that stops a pipeline run.
///
/// Uploads are not in here, a failed upload is reported and the run goes on.
#[derive(Debug)]
pub enum PipelineErr {
    Config(ConfigErr),
    Ml(MlErr),
    Registry(RegistryErr),
    Io(io::Error),
}

impl fmt::Display for PipelineErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineErr::Config(_) => write!(f, "configuration error"),
            PipelineErr::Ml(_) => write!(f, "training error"),
            PipelineErr::Registry(_) => write!(f, "registry error"),
            PipelineErr::Io(_) => write!(f, "io error"),
        }
    }
}

impl Error for PipelineErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineErr::Config(e) => Some(e),
            PipelineErr::Ml(e) => Some(e),
            PipelineErr::Registry(e) => Some(e),
            PipelineErr::Io(e) => Some(e),
        }
    }
}

impl From<ConfigErr> for PipelineErr {
    fn from(value: ConfigErr) -> Self {
        Self::Config(value)
    }
}

impl From<MlErr> for PipelineErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

impl From<RegistryErr> for PipelineErr {
    fn from(value: RegistryErr) -> Self {
        Self::Registry(value)
    }
}

impl From<io::Error> for PipelineErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
