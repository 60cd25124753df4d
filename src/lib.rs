pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{Backend, PipelineConfig};
pub use error::{ConfigErr, PipelineErr, Result};
pub use pipeline::{RunSummary, run};
