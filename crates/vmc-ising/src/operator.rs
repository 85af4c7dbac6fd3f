//! Local operators estimated over sampled configurations.

use crate::machine::JastrowMachine;
use crate::spins::SpinState;

/// Operator with a local estimator `O_loc(s) = <s|O|ψ> / <s|ψ>`.
///
/// The driver averages local values over its current sample batch to form
/// Monte Carlo statistics; off-diagonal matrix elements enter through the
/// machine's flip ratios.
pub trait LocalOperator {
    /// Local estimator value at one sampled configuration.
    fn local_value(&self, machine: &JastrowMachine, state: &SpinState) -> f64;

    /// Short display name used in diagnostics.
    fn name(&self) -> &str;
}

/// Transverse-field Ising Hamiltonian
/// `H = -J Σ σᶻᵢ σᶻᵢ₊₁ - h Σ σˣᵢ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseFieldIsing {
    /// Nearest-neighbour coupling `J`.
    pub coupling: f64,
    /// Transverse field strength `h`.
    pub field: f64,
}

impl TransverseFieldIsing {
    /// Creates the Hamiltonian with coupling `J` and transverse field `h`.
    pub fn new(coupling: f64, field: f64) -> Self {
        Self { coupling, field }
    }
}

impl LocalOperator for TransverseFieldIsing {
    fn local_value(&self, machine: &JastrowMachine, state: &SpinState) -> f64 {
        let mut diagonal = 0.0;
        for (i, j) in machine.chain().bonds() {
            diagonal -= self.coupling * state.spin(i) * state.spin(j);
        }
        if self.field == 0.0 {
            return diagonal;
        }
        let mut off_diagonal = 0.0;
        for site in 0..machine.chain().n_sites {
            off_diagonal -= self.field * machine.log_psi_ratio_flip(state, site).exp();
        }
        diagonal + off_diagonal
    }

    fn name(&self) -> &str {
        "TransverseFieldIsing"
    }
}

/// Mean longitudinal magnetization `Σ σᶻᵢ / N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Magnetization;

impl LocalOperator for Magnetization {
    fn local_value(&self, _machine: &JastrowMachine, state: &SpinState) -> f64 {
        state.magnetization()
    }

    fn name(&self) -> &str {
        "Magnetization"
    }
}

/// Two-point correlator `Σ σᶻᵢ σᶻᵢ₊d / N` at fixed distance `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinCorrelation {
    /// Site separation of the correlator.
    pub distance: usize,
}

impl SpinCorrelation {
    /// Creates the correlator at separation `distance`.
    pub fn new(distance: usize) -> Self {
        Self { distance }
    }
}

impl LocalOperator for SpinCorrelation {
    fn local_value(&self, machine: &JastrowMachine, state: &SpinState) -> f64 {
        let n_sites = machine.chain().n_sites;
        if n_sites == 0 {
            return 0.0;
        }
        if machine.chain().periodic {
            (0..n_sites)
                .map(|site| state.spin(site) * state.spin((site + self.distance) % n_sites))
                .sum::<f64>()
                / n_sites as f64
        } else {
            let pairs = n_sites.saturating_sub(self.distance);
            if pairs == 0 {
                return 0.0;
            }
            (0..pairs)
                .map(|site| state.spin(site) * state.spin(site + self.distance))
                .sum::<f64>()
                / pairs as f64
        }
    }

    fn name(&self) -> &str {
        "SpinCorrelation"
    }
}
