use super::Optimizer;
use crate::{MlErr, Result};

/// Plain gradient descent with a fixed step length.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent` taking steps scaled by `learning_rate`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Moves every parameter against its gradient component: `w -= learning_rate * g`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        if params.len() != grad.len() {
            return Err(MlErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: params.len(),
            });
        }

        params
            .iter_mut()
            .zip(grad)
            .for_each(|(w, g)| *w -= self.learning_rate * g);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut params = [1.0, -1.0];
        GradientDescent::new(0.5)
            .update_params(&mut params, &[2.0, -4.0])
            .unwrap();
        assert_eq!(params, [0.0, 1.0]);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut params = [0.0; 2];
        let res = GradientDescent::new(0.1).update_params(&mut params, &[0.0; 3]);
        assert!(res.is_err());
    }
}
