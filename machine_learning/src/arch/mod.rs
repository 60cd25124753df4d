pub mod loss;
mod linear;
mod logistic;
mod scaler;

pub use linear::Linear;
pub use logistic::LogisticRegression;
pub use scaler::Standardizer;
