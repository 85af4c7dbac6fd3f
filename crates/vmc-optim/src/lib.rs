#![deny(missing_docs)]

//! Optimizer hook implementations operating on parameter trees.
//!
//! Every update rule is structure preserving: the returned tree mirrors the
//! incoming parameters exactly, and a gradient whose structure disagrees
//! with the parameters fails with a shape error.

mod adagrad;
mod momentum;
mod sgd;

pub use adagrad::AdaGrad;
pub use momentum::Momentum;
pub use sgd::Sgd;

use vmc_core::{ErrorInfo, VmcError};

pub(crate) fn elementwise(
    a: &[f64],
    b: &[f64],
    f: impl Fn(f64, f64) -> f64,
) -> Result<Vec<f64>, VmcError> {
    if a.len() != b.len() {
        return Err(VmcError::Shape(
            ErrorInfo::new("leaf-length-mismatch", "leaf arrays differ in length")
                .with_context("left", a.len().to_string())
                .with_context("right", b.len().to_string()),
        ));
    }
    Ok(a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect())
}
