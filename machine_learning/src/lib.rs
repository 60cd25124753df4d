pub mod arch;
pub mod artifact;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod optimization;
mod test;
pub mod training;

pub use arch::LogisticRegression;
pub use dataset::{Dataset, load_iris};
pub use error::{MlErr, Result};
pub use metrics::Metrics;
pub use training::{FitReport, Trainer};
