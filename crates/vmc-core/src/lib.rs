#![deny(missing_docs)]

//! Core traits and data types for the VMC driver stack.
//!
//! The driver crates treat the parameterized model ("machine") and the
//! optimizer as pluggable capabilities behind the narrow contracts defined
//! here. Everything a driver moves between those hooks is a [`Tree`] of
//! numeric leaves, and everything it measures comes back as [`Stats`].

pub mod errors;
pub mod provenance;
pub mod rng;
pub mod stats;
pub mod tree;

pub use errors::{ErrorInfo, VmcError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{substream_seed, SampleRng};
pub use stats::Stats;
pub use tree::{Parameters, Tree};

/// Parameterized model optimized by a driver.
///
/// The machine owns its parameter container. The driver never copies it;
/// [`Machine::take_parameters`] transfers ownership out for the optimizer
/// update and [`Machine::set_parameters`] installs the replacement.
pub trait Machine {
    /// Returns a view of the current parameters.
    fn parameters(&self) -> &Parameters;

    /// Transfers ownership of the parameters out of the machine.
    ///
    /// The machine is left parameterless until [`Machine::set_parameters`]
    /// installs a replacement; callers must restore a tree of the original
    /// structure before using the machine again.
    fn take_parameters(&mut self) -> Parameters;

    /// Installs a new parameter tree.
    fn set_parameters(&mut self, parameters: Parameters);

    /// Returns the total number of scalar parameters.
    fn n_parameters(&self) -> usize {
        self.parameters().total_len()
    }
}

/// Update rule advancing parameters along a gradient proposal.
///
/// Implementations may carry internal state (momenta, accumulators), but
/// must not mutate anything visible to the driver beyond the returned
/// parameter tree. `gradient` and `parameters` share identical structure.
pub trait Optimizer {
    /// Consumes the current parameters and returns their replacement.
    fn update(&mut self, gradient: &Parameters, parameters: Parameters)
        -> Result<Parameters, VmcError>;
}

impl<T: Optimizer + ?Sized> Optimizer for Box<T> {
    fn update(
        &mut self,
        gradient: &Parameters,
        parameters: Parameters,
    ) -> Result<Parameters, VmcError> {
        (**self).update(gradient, parameters)
    }
}
