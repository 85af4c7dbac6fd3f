//! AdaGrad per-element adaptive learning rates.

use vmc_core::{Optimizer, Parameters, VmcError};

use crate::elementwise;

/// AdaGrad: `a <- a + g^2`, `p <- p - eta * g / sqrt(a + eps)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaGrad {
    /// Base step size.
    pub learning_rate: f64,
    /// Stabilizer added inside the square root.
    pub epsilon: f64,
    accumulator: Option<Parameters>,
}

impl AdaGrad {
    /// Creates an AdaGrad rule with the given base step size.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            epsilon: 1e-8,
            accumulator: None,
        }
    }
}

impl Optimizer for AdaGrad {
    fn update(
        &mut self,
        gradient: &Parameters,
        parameters: Parameters,
    ) -> Result<Parameters, VmcError> {
        let eta = self.learning_rate;
        let eps = self.epsilon;
        let accumulator = match self.accumulator.take() {
            Some(accumulator) => accumulator,
            None => gradient.zeros_like(),
        };
        let accumulator = accumulator.try_zip_with(gradient, &mut |a, g| {
            elementwise(a, g, |a, g| a + g * g)
        })?;
        let scaled = accumulator.try_zip_with(gradient, &mut |a, g| {
            elementwise(a, g, |a, g| g / (a + eps).sqrt())
        })?;
        let updated = parameters.try_zip_with(&scaled, &mut |p, s| {
            elementwise(p, s, |p, s| p - eta * s)
        })?;
        self.accumulator = Some(accumulator);
        Ok(updated)
    }
}
