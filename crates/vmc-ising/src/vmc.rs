//! Concrete variational Monte Carlo driver.

use std::sync::Arc;

use vmc_core::{ErrorInfo, Machine, Optimizer, Parameters, Stats, Tree, VmcError};
use vmc_driver::{DistributedInfo, DriverState, LogRecord, LogValue, VariationalDriver};

use crate::machine::JastrowMachine;
use crate::operator::{LocalOperator, TransverseFieldIsing};
use crate::sampler::MetropolisSampler;
use crate::spins::SpinState;

/// Shareable operator handle estimated by the driver.
pub type Observable = Arc<dyn LocalOperator>;

/// Variational Monte Carlo driver for the transverse-field Ising chain.
///
/// Uses the joint forward/backward strategy: one sampling pass per step
/// produces both the energy snapshot and the covariance gradient estimator
/// `2 (⟨O E⟩ − ⟨O⟩⟨E⟩)`, which becomes the update proposal handed to the
/// optimizer. The sample batch is retained until the next step so that
/// observable estimates share the step's sampling state.
pub struct Vmc<O: Optimizer> {
    state: DriverState<JastrowMachine, O, Observable>,
    hamiltonian: TransverseFieldIsing,
    sampler: MetropolisSampler,
    n_samples: usize,
    n_discard: usize,
    samples: Vec<SpinState>,
}

impl<O: Optimizer> Vmc<O> {
    /// Creates a single-process driver.
    pub fn new(
        machine: JastrowMachine,
        optimizer: O,
        sampler: MetropolisSampler,
        hamiltonian: TransverseFieldIsing,
        n_samples: usize,
        n_discard: usize,
    ) -> Self {
        Self::with_distributed(
            machine,
            optimizer,
            sampler,
            hamiltonian,
            n_samples,
            n_discard,
            DistributedInfo::default(),
        )
    }

    /// Creates a driver with an explicit process-fleet description.
    pub fn with_distributed(
        machine: JastrowMachine,
        optimizer: O,
        sampler: MetropolisSampler,
        hamiltonian: TransverseFieldIsing,
        n_samples: usize,
        n_discard: usize,
        distributed: DistributedInfo,
    ) -> Self {
        Self {
            state: DriverState::new(machine, optimizer, "Energy", distributed),
            hamiltonian,
            sampler,
            n_samples,
            n_discard,
            samples: Vec::new(),
        }
    }

    /// The sampler driving this optimization.
    pub fn sampler(&self) -> &MetropolisSampler {
        &self.sampler
    }

    /// The sample batch of the current step.
    pub fn samples(&self) -> &[SpinState] {
        &self.samples
    }

    fn refresh_samples(&mut self) -> Result<(), VmcError> {
        self.samples = self
            .sampler
            .sample(self.state.machine(), self.n_samples, self.n_discard);
        if self.samples.is_empty() {
            return Err(VmcError::Sampling(
                ErrorInfo::new("empty-sample-batch", "the sampler produced no configurations")
                    .with_hint("configure at least one sample per step"),
            ));
        }
        Ok(())
    }
}

fn accumulate(total: &[f64], increment: &[f64], weight: f64) -> Vec<f64> {
    total
        .iter()
        .zip(increment.iter())
        .map(|(t, x)| t + weight * x)
        .collect()
}

impl<O: Optimizer> VariationalDriver for Vmc<O> {
    type Machine = JastrowMachine;
    type Optimizer = O;
    type Observable = Observable;

    fn state(&self) -> &DriverState<JastrowMachine, O, Observable> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DriverState<JastrowMachine, O, Observable> {
        &mut self.state
    }

    fn forward_and_backward(&mut self) -> Result<Parameters, VmcError> {
        self.refresh_samples()?;

        let machine = self.state.machine();
        let energies: Vec<f64> = self
            .samples
            .iter()
            .map(|state| self.hamiltonian.local_value(machine, state))
            .collect();
        let stats = Stats::from_samples(&energies);

        let n = self.samples.len() as f64;
        let mut deriv_sum = machine.parameters().zeros_like();
        let mut weighted_sum = machine.parameters().zeros_like();
        for (state, &energy) in self.samples.iter().zip(energies.iter()) {
            let derivatives = machine.log_derivatives(state);
            deriv_sum = deriv_sum.zip_with(&derivatives, &mut |total, d| accumulate(total, d, 1.0))?;
            weighted_sum =
                weighted_sum.zip_with(&derivatives, &mut |total, d| accumulate(total, d, energy))?;
        }
        let energy_mean = stats.mean;
        let gradient = deriv_sum.zip_with(&weighted_sum, &mut |mean_part, weighted_part| {
            mean_part
                .iter()
                .zip(weighted_part.iter())
                .map(|(o, oe)| 2.0 * (oe / n - (o / n) * energy_mean))
                .collect::<Vec<f64>>()
        })?;

        self.state.set_loss_stats(stats);
        Ok(gradient)
    }

    fn estimate_stats(&mut self, observable: &Observable) -> Result<Stats, VmcError> {
        if self.samples.is_empty() {
            self.refresh_samples().map_err(|err| {
                VmcError::Estimator(
                    ErrorInfo::new("estimate-without-samples", err.info().message.clone())
                        .with_context("observable", observable.name()),
                )
            })?;
        }
        let machine = self.state.machine();
        let values: Vec<f64> = self
            .samples
            .iter()
            .map(|state| observable.local_value(machine, state))
            .collect();
        Ok(Stats::from_samples(&values))
    }

    fn reset_sampler(&mut self) {
        let chain = self.state.machine().chain();
        self.sampler.reset(&chain);
        self.samples.clear();
    }

    fn info(&self, depth: usize) -> String {
        let pad = "  ".repeat(depth);
        let chain = self.state.machine().chain();
        format!(
            "{pad}Variational Monte Carlo driver\n\
             {pad}  model: Jastrow on {} sites ({} parameters, {})\n\
             {pad}  hamiltonian: J={} h={}\n\
             {pad}  sampling: {} samples per step, {} discarded\n\
             {pad}  step count: {}",
            chain.n_sites,
            self.state.machine().n_parameters(),
            if chain.periodic { "periodic" } else { "open" },
            self.hamiltonian.coupling,
            self.hamiltonian.field,
            self.n_samples,
            self.n_discard,
            self.state.step_count(),
        )
    }

    fn log_additional_data(&mut self, record: &mut LogRecord, _step: u64) {
        record.insert(
            "Acceptance".to_string(),
            LogValue::Scalar(self.sampler.acceptance()),
        );
    }
}

/// Builds a shareable observable handle from a concrete operator.
pub fn observable(operator: impl LocalOperator + 'static) -> Tree<Observable> {
    Tree::Leaf(Arc::new(operator))
}
