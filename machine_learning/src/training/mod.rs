mod trainer;

pub use trainer::{FitReport, Trainer};
