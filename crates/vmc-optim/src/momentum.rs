//! Momentum-accelerated gradient descent.

use vmc_core::{Optimizer, Parameters, VmcError};

use crate::elementwise;

/// Classic momentum: `v <- beta * v + g`, `p <- p - eta * v`.
///
/// The velocity tree is created lazily from the first gradient, so the rule
/// adapts to whatever parameter structure the machine uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Momentum {
    /// Step size applied to the velocity.
    pub learning_rate: f64,
    /// Velocity decay factor in `[0, 1)`.
    pub beta: f64,
    velocity: Option<Parameters>,
}

impl Momentum {
    /// Creates a momentum rule with the given step size and decay.
    pub fn new(learning_rate: f64, beta: f64) -> Self {
        Self {
            learning_rate,
            beta,
            velocity: None,
        }
    }
}

impl Optimizer for Momentum {
    fn update(
        &mut self,
        gradient: &Parameters,
        parameters: Parameters,
    ) -> Result<Parameters, VmcError> {
        let eta = self.learning_rate;
        let beta = self.beta;
        let velocity = match self.velocity.take() {
            Some(velocity) => velocity,
            None => gradient.zeros_like(),
        };
        let velocity = velocity.try_zip_with(gradient, &mut |v, g| {
            elementwise(v, g, |v, g| beta * v + g)
        })?;
        let updated = parameters.try_zip_with(&velocity, &mut |p, v| {
            elementwise(p, v, |p, v| p - eta * v)
        })?;
        self.velocity = Some(velocity);
        Ok(updated)
    }
}
