use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyInput {
        what: &'static str,
    },
    InvalidTestSize {
        test_size: f64,
        samples: usize,
    },
    FeatureMismatch {
        got: Vec<String>,
        expected: Vec<String>,
    },
    InvalidValue {
        what: &'static str,
        value: f32,
    },
    Diverged {
        iteration: usize,
    },
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::EmptyInput { what } => write!(f, "Tried to operate on an empty {what}"),
            MlErr::InvalidTestSize { test_size, samples } => write!(
                f,
                "A test size of {test_size} leaves an empty partition for {samples} samples"
            ),
            MlErr::FeatureMismatch { got, expected } => write!(
                f,
                "The model was fitted on features {expected:?} but got {got:?}"
            ),
            MlErr::InvalidValue { what, value } => write!(f, "Got an invalid {what}: {value}"),
            MlErr::Diverged { iteration } => {
                write!(f, "The loss stopped being finite at iteration {iteration}")
            }
        }
    }
}

impl Error for MlErr {}
