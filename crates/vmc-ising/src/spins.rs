//! Spin-chain geometry and configurations.

use serde::{Deserialize, Serialize};

use vmc_core::SampleRng;

/// One-dimensional lattice of ±1 spins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinChain {
    /// Number of lattice sites.
    pub n_sites: usize,
    /// Whether the last site bonds back to the first.
    pub periodic: bool,
}

impl SpinChain {
    /// Creates a chain with the given site count and boundary condition.
    pub fn new(n_sites: usize, periodic: bool) -> Self {
        Self { n_sites, periodic }
    }

    /// Number of nearest-neighbour bonds.
    pub fn n_bonds(&self) -> usize {
        if self.periodic {
            self.n_sites
        } else {
            self.n_sites.saturating_sub(1)
        }
    }

    /// Iterates over nearest-neighbour bonds as `(site, site)` pairs.
    pub fn bonds(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n_sites = self.n_sites;
        (0..self.n_bonds()).map(move |bond| (bond, (bond + 1) % n_sites))
    }
}

/// Spin configuration on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinState {
    spins: Vec<i8>,
}

impl SpinState {
    /// Draws a uniformly random configuration.
    pub fn random(chain: &SpinChain, rng: &mut SampleRng) -> Self {
        let spins = (0..chain.n_sites)
            .map(|_| if rng.uniform() < 0.5 { -1 } else { 1 })
            .collect();
        Self { spins }
    }

    /// The fully polarized configuration.
    pub fn all_up(chain: &SpinChain) -> Self {
        Self {
            spins: vec![1; chain.n_sites],
        }
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    /// Whether the configuration is empty.
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    /// Spin value at `site` as a float in `{-1, +1}`.
    pub fn spin(&self, site: usize) -> f64 {
        self.spins[site] as f64
    }

    /// Flips the spin at `site`.
    pub fn flip(&mut self, site: usize) {
        self.spins[site] = -self.spins[site];
    }

    /// Mean spin value.
    pub fn magnetization(&self) -> f64 {
        if self.spins.is_empty() {
            return 0.0;
        }
        self.spins.iter().map(|&s| s as f64).sum::<f64>() / self.spins.len() as f64
    }
}
