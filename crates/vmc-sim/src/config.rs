//! YAML configuration schema and defaults for simulator runs.

use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Lattice geometry.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Hamiltonian couplings.
    #[serde(default)]
    pub hamiltonian: HamiltonianConfig,
    /// Sampling batch settings.
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Optimizer selection and hyperparameters.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Iteration and logging cadence settings.
    #[serde(default)]
    pub run: RunSection,
    /// Master seed for all randomness.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    2024
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            hamiltonian: HamiltonianConfig::default(),
            sampler: SamplerConfig::default(),
            optimizer: OptimizerConfig::default(),
            run: RunSection::default(),
            seed: default_seed(),
        }
    }
}

/// Lattice geometry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Number of lattice sites.
    #[serde(default = "default_sites")]
    pub sites: usize,
    /// Whether the chain closes periodically.
    #[serde(default = "default_periodic")]
    pub periodic: bool,
}

fn default_sites() -> usize {
    16
}

fn default_periodic() -> bool {
    true
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            periodic: default_periodic(),
        }
    }
}

/// Transverse-field Ising couplings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HamiltonianConfig {
    /// Nearest-neighbour coupling `J`.
    #[serde(default = "default_coupling")]
    pub coupling: f64,
    /// Transverse field strength `h`.
    #[serde(default = "default_field")]
    pub field: f64,
}

fn default_coupling() -> f64 {
    1.0
}

fn default_field() -> f64 {
    0.5
}

impl Default for HamiltonianConfig {
    fn default() -> Self {
        Self {
            coupling: default_coupling(),
            field: default_field(),
        }
    }
}

/// Sampling batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Samples gathered per optimization step.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Burn-in sweeps discarded before each batch.
    #[serde(default = "default_discard")]
    pub discard: usize,
}

fn default_samples() -> usize {
    512
}

fn default_discard() -> usize {
    64
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            discard: default_discard(),
        }
    }
}

/// Supported optimizer rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OptimizerConfig {
    /// Plain stochastic gradient descent.
    Sgd {
        /// Step size applied to the gradient.
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        /// L2 regularization strength.
        #[serde(default)]
        l2_reg: f64,
    },
    /// Momentum-accelerated gradient descent.
    Momentum {
        /// Step size applied to the velocity.
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        /// Velocity decay factor.
        #[serde(default = "default_beta")]
        beta: f64,
    },
    /// AdaGrad per-element adaptive learning rates.
    AdaGrad {
        /// Base step size.
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
    },
}

fn default_learning_rate() -> f64 {
    0.05
}

fn default_beta() -> f64 {
    0.9
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Sgd {
            learning_rate: default_learning_rate(),
            l2_reg: 0.0,
        }
    }
}

/// Iteration and logging cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    /// Total optimization steps to perform.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Internal advances between reported samples.
    #[serde(default = "default_step_size")]
    pub step_size: u64,
    /// Parameter snapshot cadence of the JSON log.
    #[serde(default = "default_cadence")]
    pub save_params_every: u64,
    /// Flush cadence of the JSON log.
    #[serde(default = "default_cadence")]
    pub write_every: u64,
    /// Whether to display a progress bar.
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_iterations() -> u64 {
    200
}

fn default_step_size() -> u64 {
    1
}

fn default_cadence() -> u64 {
    50
}

fn default_progress() -> bool {
    true
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            step_size: default_step_size(),
            save_params_every: default_cadence(),
            write_every: default_cadence(),
            progress: default_progress(),
        }
    }
}
