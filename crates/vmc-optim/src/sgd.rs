//! Plain stochastic gradient descent.

use serde::{Deserialize, Serialize};

use vmc_core::{Optimizer, Parameters, VmcError};

use crate::elementwise;

/// Stochastic gradient descent with optional L2 regularization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    /// Step size applied to the gradient.
    pub learning_rate: f64,
    /// L2 regularization strength added to the gradient.
    #[serde(default)]
    pub l2_reg: f64,
}

impl Sgd {
    /// Creates an unregularized SGD rule.
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            l2_reg: 0.0,
        }
    }

    /// Adds L2 regularization.
    pub fn with_l2_reg(mut self, l2_reg: f64) -> Self {
        self.l2_reg = l2_reg;
        self
    }
}

impl Optimizer for Sgd {
    fn update(
        &mut self,
        gradient: &Parameters,
        parameters: Parameters,
    ) -> Result<Parameters, VmcError> {
        let eta = self.learning_rate;
        let reg = self.l2_reg;
        parameters.try_zip_with(gradient, &mut |p, g| {
            elementwise(p, g, |p, g| p - eta * (g + reg * p))
        })
    }
}
