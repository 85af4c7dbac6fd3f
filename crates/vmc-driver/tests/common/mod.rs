#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use vmc_core::{Machine, Parameters, Stats, Tree, VmcError};
use vmc_driver::{DistributedInfo, DriverState, ProgressSink, VariationalDriver};
use vmc_optim::Sgd;

/// Machine holding a single flat leaf of parameters.
pub struct VecMachine {
    params: Parameters,
}

impl VecMachine {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            params: Tree::Leaf(values),
        }
    }
}

impl Machine for VecMachine {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn take_parameters(&mut self) -> Parameters {
        std::mem::replace(&mut self.params, Tree::Leaf(Vec::new()))
    }

    fn set_parameters(&mut self, parameters: Parameters) {
        self.params = parameters;
    }
}

fn first_value(params: &Parameters) -> f64 {
    match params {
        Tree::Leaf(values) => values.first().copied().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn unit_gradient(params: &Parameters) -> Parameters {
    params.map_ref(&mut |values: &Vec<f64>| vec![1.0; values.len()])
}

/// Driver overriding the joint forward/backward strategy.
///
/// Each step proposes a unit gradient and records the first parameter entry
/// as the loss, so counter and parameter trajectories are fully predictable.
pub struct JointDriver {
    state: DriverState<VecMachine, Sgd, String>,
    pub evals: usize,
    pub resets: usize,
}

impl JointDriver {
    pub fn new() -> Self {
        Self::with_rank(0, 1)
    }

    pub fn with_rank(rank: usize, n_processes: usize) -> Self {
        Self {
            state: DriverState::new(
                VecMachine::new(vec![1.0, 2.0]),
                Sgd::new(0.1),
                "Loss",
                DistributedInfo::new(rank, n_processes),
            ),
            evals: 0,
            resets: 0,
        }
    }
}

impl VariationalDriver for JointDriver {
    type Machine = VecMachine;
    type Optimizer = Sgd;
    type Observable = String;

    fn state(&self) -> &DriverState<VecMachine, Sgd, String> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DriverState<VecMachine, Sgd, String> {
        &mut self.state
    }

    fn forward_and_backward(&mut self) -> Result<Parameters, VmcError> {
        self.evals += 1;
        let loss = first_value(self.state.machine().parameters());
        self.state.set_loss_stats(Stats::from_samples(&[loss]));
        Ok(unit_gradient(self.state.machine().parameters()))
    }

    fn estimate_stats(&mut self, observable: &String) -> Result<Stats, VmcError> {
        Ok(Stats::from_samples(&[observable.len() as f64]))
    }

    fn reset_sampler(&mut self) {
        self.resets += 1;
    }

    fn info(&self, depth: usize) -> String {
        format!("{}toy driver with a joint update strategy", "  ".repeat(depth))
    }
}

/// Driver overriding the split forward/backward strategy.
///
/// Semantically identical to [`JointDriver`], with the loss evaluation and
/// the gradient split across the two halves.
pub struct SplitDriver {
    state: DriverState<VecMachine, Sgd, String>,
}

impl SplitDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::new(
                VecMachine::new(vec![1.0, 2.0]),
                Sgd::new(0.1),
                "Loss",
                DistributedInfo::default(),
            ),
        }
    }
}

impl VariationalDriver for SplitDriver {
    type Machine = VecMachine;
    type Optimizer = Sgd;
    type Observable = String;

    fn state(&self) -> &DriverState<VecMachine, Sgd, String> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DriverState<VecMachine, Sgd, String> {
        &mut self.state
    }

    fn forward(&mut self) -> Result<(), VmcError> {
        let loss = first_value(self.state.machine().parameters());
        self.state.set_loss_stats(Stats::from_samples(&[loss]));
        Ok(())
    }

    fn backward(&mut self) -> Result<Parameters, VmcError> {
        Ok(unit_gradient(self.state.machine().parameters()))
    }

    fn estimate_stats(&mut self, observable: &String) -> Result<Stats, VmcError> {
        Ok(Stats::from_samples(&[observable.len() as f64]))
    }

    fn reset_sampler(&mut self) {}

    fn info(&self, depth: usize) -> String {
        format!("{}toy driver with a split update strategy", "  ".repeat(depth))
    }
}

/// Driver overriding neither strategy; every advance must fail lazily.
pub struct BrokenDriver {
    state: DriverState<VecMachine, Sgd, String>,
}

impl BrokenDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::new(
                VecMachine::new(vec![0.0]),
                Sgd::new(0.1),
                "Loss",
                DistributedInfo::default(),
            ),
        }
    }
}

impl VariationalDriver for BrokenDriver {
    type Machine = VecMachine;
    type Optimizer = Sgd;
    type Observable = String;

    fn state(&self) -> &DriverState<VecMachine, Sgd, String> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DriverState<VecMachine, Sgd, String> {
        &mut self.state
    }

    fn estimate_stats(&mut self, _observable: &String) -> Result<Stats, VmcError> {
        Ok(Stats::from_samples(&[0.0]))
    }

    fn reset_sampler(&mut self) {}

    fn info(&self, depth: usize) -> String {
        format!("{}driver with no update strategy", "  ".repeat(depth))
    }
}

/// Progress sink recording every event for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }
}

impl ProgressSink for RecordingProgress {
    fn begin(&mut self, total: f64) {
        if let Ok(mut events) = self.events.lock() {
            events.push(format!("begin {total}"));
        }
    }

    fn set_label(&mut self, label: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(format!("label {label}"));
        }
    }

    fn advance_by(&mut self, delta: f64) {
        if let Ok(mut events) = self.events.lock() {
            events.push(format!("advance {delta}"));
        }
    }

    fn finish(&mut self) {
        if let Ok(mut events) = self.events.lock() {
            events.push("finish".to_string());
        }
    }
}

pub fn leaf_values(params: &Parameters) -> Vec<f64> {
    match params {
        Tree::Leaf(values) => values.clone(),
        other => panic!("expected leaf parameters, got {other:?}"),
    }
}
