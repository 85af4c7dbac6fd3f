//! Abstract driver contract and the final iteration/estimation operations.

use indexmap::IndexMap;

use vmc_core::{ErrorInfo, Machine, Optimizer, Parameters, Stats, Tree, VmcError};

use crate::distributed::DistributedInfo;
use crate::logging::{LogRecord, LogValue};
use crate::run::{self, RunArg, RunOptions};
use crate::stepper::StepIter;
use crate::warnings::warn_deprecation;

/// Common state embedded in every concrete driver.
///
/// Holds the machine, the optimizer hook, the monotonic step counter, the
/// most recent loss snapshot, and the process-fleet description. Concrete
/// drivers expose it through [`VariationalDriver::state`] so the final
/// operations in [`DriverExt`] can operate on any driver uniformly.
pub struct DriverState<M, O, Obs> {
    machine: M,
    optimizer: O,
    step_count: u64,
    loss_stats: Option<Stats>,
    loss_name: String,
    distributed: DistributedInfo,
    registry: IndexMap<String, Obs>,
}

impl<M, O, Obs> DriverState<M, O, Obs> {
    /// Creates driver state around a machine and an optimizer hook.
    ///
    /// `loss_name` is the key under which the driver's loss snapshot shows
    /// up in logged records and the progress label (for example `"Energy"`).
    pub fn new(
        machine: M,
        optimizer: O,
        loss_name: impl Into<String>,
        distributed: DistributedInfo,
    ) -> Self {
        Self {
            machine,
            optimizer,
            step_count: 0,
            loss_stats: None,
            loss_name: loss_name.into(),
            distributed,
            registry: IndexMap::new(),
        }
    }

    /// Returns the machine being optimized.
    pub fn machine(&self) -> &M {
        &self.machine
    }

    /// Returns mutable access to the machine.
    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    /// Returns the optimizer hook.
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Returns mutable access to the optimizer hook.
    pub fn optimizer_mut(&mut self) -> &mut O {
        &mut self.optimizer
    }

    /// Replaces the optimizer hook.
    pub fn set_optimizer(&mut self, optimizer: O) {
        self.optimizer = optimizer;
    }

    /// Monotonic count of optimization steps performed so far.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Most recent loss statistics, if a step has produced one.
    pub fn loss_stats(&self) -> Option<&Stats> {
        self.loss_stats.as_ref()
    }

    /// Stores the loss snapshot for the current step.
    pub fn set_loss_stats(&mut self, stats: Stats) {
        self.loss_stats = Some(stats);
    }

    /// Name under which the loss snapshot is reported.
    pub fn loss_name(&self) -> &str {
        &self.loss_name
    }

    /// Process-fleet description captured at construction.
    pub fn distributed(&self) -> DistributedInfo {
        self.distributed
    }

    pub(crate) fn registry(&self) -> &IndexMap<String, Obs> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut IndexMap<String, Obs> {
        &mut self.registry
    }

    pub(crate) fn bump_step(&mut self) {
        self.step_count += 1;
    }

    pub(crate) fn reset_step(&mut self) {
        self.step_count = 0;
    }
}

fn missing_strategy(half: &str) -> VmcError {
    VmcError::Contract(
        ErrorInfo::new(
            "driver-strategy-missing",
            format!("the driver supplies no `{half}` implementation"),
        )
        .with_hint("override forward_and_backward jointly, or forward and backward separately"),
    )
}

/// Capability set a concrete driver must supply.
///
/// A driver chooses exactly one strategy for producing update proposals:
/// override [`VariationalDriver::forward_and_backward`] jointly (when the
/// two halves share sampling state), or override both
/// [`VariationalDriver::forward`] and [`VariationalDriver::backward`]. A
/// driver overriding neither fails with a contract error on the first
/// advance, not at construction. Drivers that minimize a loss should store
/// its statistics via [`DriverState::set_loss_stats`] each step so the run
/// controller can report it.
pub trait VariationalDriver {
    /// Machine hook type.
    type Machine: Machine;
    /// Optimizer hook type.
    type Optimizer: Optimizer;
    /// Opaque operator handle understood by the driver's estimator.
    type Observable;

    /// Returns the embedded common state.
    fn state(&self) -> &DriverState<Self::Machine, Self::Optimizer, Self::Observable>;

    /// Returns mutable access to the embedded common state.
    fn state_mut(&mut self) -> &mut DriverState<Self::Machine, Self::Optimizer, Self::Observable>;

    /// Forward half of the split strategy: evaluates the loss.
    fn forward(&mut self) -> Result<(), VmcError> {
        Err(missing_strategy("forward"))
    }

    /// Backward half of the split strategy: produces the update proposal.
    fn backward(&mut self) -> Result<Parameters, VmcError> {
        Err(missing_strategy("backward"))
    }

    /// Produces this step's update proposal.
    ///
    /// The default composes [`VariationalDriver::forward`] and
    /// [`VariationalDriver::backward`].
    fn forward_and_backward(&mut self) -> Result<Parameters, VmcError> {
        self.forward()?;
        self.backward()
    }

    /// Computes Monte Carlo statistics for one observable using the
    /// driver's current sampling state.
    fn estimate_stats(&mut self, observable: &Self::Observable) -> Result<Stats, VmcError>;

    /// Resets sampler-internal state; invoked by [`DriverExt::reset`] after
    /// the step counter has been zeroed.
    fn reset_sampler(&mut self);

    /// Human-readable self-description, indentable by `depth`.
    fn info(&self, depth: usize) -> String;

    /// Monotonic progress measure used only for progress display.
    ///
    /// Defaults to the step counter; time-evolution drivers override this
    /// with continuous time.
    fn step_value(&self) -> f64 {
        self.state().step_count() as f64
    }

    /// Appends driver-specific fields to a record about to be logged.
    fn log_additional_data(&mut self, _record: &mut LogRecord, _step: u64) {}
}

/// Final operations available on every driver.
///
/// Blanket-implemented; concrete drivers cannot override these.
pub trait DriverExt: VariationalDriver {
    /// Monotonic count of optimization steps performed so far.
    fn step_count(&self) -> u64 {
        self.state().step_count()
    }

    /// Most recent loss statistics, if a step has produced one.
    fn loss_stats(&self) -> Option<&Stats> {
        self.state().loss_stats()
    }

    /// Returns the machine being optimized.
    fn machine(&self) -> &Self::Machine {
        self.state().machine()
    }

    /// Resets the step counter to zero, then the sampler state.
    fn reset(&mut self) {
        self.state_mut().reset_step();
        self.reset_sampler();
    }

    /// Applies one optimizer update.
    ///
    /// This is the sole mutation point for the machine's parameters and the
    /// primary advance path of the step counter: ownership of the
    /// parameters transfers to the optimizer hook, the replacement is
    /// installed, and the counter advances by exactly one.
    fn update_parameters(&mut self, dp: Parameters) -> Result<(), VmcError> {
        let state = self.state_mut();
        let current = state.machine_mut().take_parameters();
        let updated = state.optimizer_mut().update(&dp, current)?;
        state.machine_mut().set_parameters(updated);
        state.bump_step();
        Ok(())
    }

    /// Returns a resumable iterator advancing the optimization.
    ///
    /// Performs `n_steps` total advances grouped into batches of `step`,
    /// yielding the step counter value once per batch before that batch's
    /// advances. Dropping the iterator between yields cancels the pending
    /// batch; no cleanup is required beyond normal scope exit.
    fn iter(&mut self, n_steps: u64, step: u64) -> StepIter<'_, Self>
    where
        Self: Sized,
    {
        StepIter::new(self, n_steps, step)
    }

    /// Performs `steps` optimization steps, discarding yielded values.
    fn advance(&mut self, steps: u64) -> Result<(), VmcError>
    where
        Self: Sized,
    {
        for yielded in self.iter(steps, 1) {
            yielded?;
        }
        Ok(())
    }

    /// Maps [`VariationalDriver::estimate_stats`] over an arbitrary
    /// observable tree, preserving its structure.
    fn estimate(
        &mut self,
        observables: &Tree<Self::Observable>,
    ) -> Result<Tree<Stats>, VmcError> {
        observables.try_map_ref(&mut |observable| self.estimate_stats(observable))
    }

    /// Executes the optimization with logging, observable estimation, and
    /// progress reporting. See the crate docs for the accepted argument
    /// shapes; the legacy reversed order `run(prefix, n_iter)` is detected
    /// by type and corrected with a deprecation notice.
    fn run<A, B>(
        &mut self,
        first: A,
        second: B,
        options: RunOptions<Self::Observable>,
    ) -> Result<(), VmcError>
    where
        Self: Sized,
        Self::Observable: Clone,
        A: Into<RunArg>,
        B: Into<RunArg>,
    {
        run::execute(self, first.into(), second.into(), options)
    }

    /// Registers an observable on the legacy implicit registry.
    #[deprecated(note = "pass observables to `run` through RunOptions instead")]
    fn add_observable(&mut self, name: impl Into<String>, observable: Self::Observable)
    where
        Self: Sized,
    {
        warn_deprecation("add_observable is deprecated; pass observables to `run` instead");
        self.state_mut().registry_mut().insert(name.into(), observable);
    }

    /// Estimates every observable on the legacy registry.
    #[deprecated(note = "use `estimate` with an explicit observable tree instead")]
    fn get_observable_stats(&mut self, include_loss: bool) -> Result<LogRecord, VmcError>
    where
        Self: Sized,
        Self::Observable: Clone,
    {
        warn_deprecation("get_observable_stats is deprecated; use `estimate` instead");
        let named: Vec<(String, Self::Observable)> = self
            .state()
            .registry()
            .iter()
            .map(|(name, observable)| (name.clone(), observable.clone()))
            .collect();
        let mut record = LogRecord::new();
        for (name, observable) in named {
            record.insert(name, LogValue::Stats(self.estimate_stats(&observable)?));
        }
        if include_loss {
            if let Some(stats) = self.state().loss_stats().copied() {
                record.insert(self.state().loss_name().to_string(), LogValue::Stats(stats));
            }
        }
        Ok(record)
    }
}

impl<D: VariationalDriver + ?Sized> DriverExt for D {}
