use crate::Result;

/// An optimization algorithm that updates parameters given their gradient.
pub trait Optimizer {
    /// Takes one step over `params` following `grad`.
    ///
    /// # Errors
    /// Returns `MlErr::SizeMismatch` if `params` and `grad` have different lengths.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;
}
