//! Single-spin-flip Metropolis sampler over `|ψ|²`.

use vmc_core::SampleRng;

use crate::machine::JastrowMachine;
use crate::spins::{SpinChain, SpinState};

/// Metropolis-Hastings walker proposing single spin flips.
///
/// Acceptance uses `|ψ(s')/ψ(s)|² = exp(2 Δ log ψ)`, which the machine
/// evaluates exactly. All randomness flows through one [`SampleRng`], so
/// identical seeds reproduce identical chains.
#[derive(Debug, Clone)]
pub struct MetropolisSampler {
    rng: SampleRng,
    state: SpinState,
    n_accepted: u64,
    n_proposed: u64,
}

impl MetropolisSampler {
    /// Creates a walker at a random configuration.
    pub fn new(chain: &SpinChain, seed: u64) -> Self {
        let mut rng = SampleRng::from_seed(seed);
        let state = SpinState::random(chain, &mut rng);
        Self {
            rng,
            state,
            n_accepted: 0,
            n_proposed: 0,
        }
    }

    /// Current configuration of the walker.
    pub fn state(&self) -> &SpinState {
        &self.state
    }

    /// Performs one sweep of `n_sites` single-flip proposals.
    pub fn sweep(&mut self, machine: &JastrowMachine) {
        let n_sites = self.state.len();
        if n_sites == 0 {
            return;
        }
        for _ in 0..n_sites {
            let site = self.rng.index(n_sites);
            let delta = machine.log_psi_ratio_flip(&self.state, site);
            self.n_proposed += 1;
            if delta >= 0.0 || self.rng.uniform() < (2.0 * delta).exp() {
                self.state.flip(site);
                self.n_accepted += 1;
            }
        }
    }

    /// Discards `n_discard` sweeps, then collects one configuration per
    /// sweep until `n_samples` are gathered.
    pub fn sample(
        &mut self,
        machine: &JastrowMachine,
        n_samples: usize,
        n_discard: usize,
    ) -> Vec<SpinState> {
        for _ in 0..n_discard {
            self.sweep(machine);
        }
        (0..n_samples)
            .map(|_| {
                self.sweep(machine);
                self.state.clone()
            })
            .collect()
    }

    /// Fraction of accepted proposals since construction or reset.
    pub fn acceptance(&self) -> f64 {
        if self.n_proposed == 0 {
            return 1.0;
        }
        self.n_accepted as f64 / self.n_proposed as f64
    }

    /// Re-randomizes the walker and clears the acceptance counters.
    pub fn reset(&mut self, chain: &SpinChain) {
        self.state = SpinState::random(chain, &mut self.rng);
        self.n_accepted = 0;
        self.n_proposed = 0;
    }
}
