#![deny(missing_docs)]

//! Transverse-field Ising engine exercising the VMC driver stack end to
//! end: spin-chain configurations, a Jastrow log-amplitude machine, a
//! seeded single-flip Metropolis sampler, local operators, and the
//! concrete [`Vmc`] driver built on `vmc-driver`.

pub mod machine;
pub mod operator;
pub mod sampler;
pub mod spins;
pub mod vmc;

pub use machine::JastrowMachine;
pub use operator::{LocalOperator, Magnetization, SpinCorrelation, TransverseFieldIsing};
pub use sampler::MetropolisSampler;
pub use spins::{SpinChain, SpinState};
pub use vmc::{observable, Observable, Vmc};
