//! Jastrow log-amplitude machine on a spin chain.

use vmc_core::{Machine, Parameters, SampleRng, Tree};

use crate::spins::{SpinChain, SpinState};

/// Log-amplitude model `log ψ(s) = Σ aᵢ sᵢ + Σ w_b s_b s_{b+1}`.
///
/// Parameters live in a two-leaf tree: `field` holds one on-site bias per
/// lattice site and `coupling` one pair weight per nearest-neighbour bond.
/// Amplitudes are strictly positive, so the model targets wave functions
/// with a positive ground state (the transverse-field Ising chain is one).
#[derive(Debug, Clone)]
pub struct JastrowMachine {
    chain: SpinChain,
    params: Parameters,
}

impl JastrowMachine {
    /// Creates a machine with all parameters at zero.
    pub fn new(chain: SpinChain) -> Self {
        Self {
            chain,
            params: Tree::map_of(vec![
                ("field".to_string(), Tree::Leaf(vec![0.0; chain.n_sites])),
                ("coupling".to_string(), Tree::Leaf(vec![0.0; chain.n_bonds()])),
            ]),
        }
    }

    /// Creates a machine with small random initial parameters.
    pub fn with_random_init(chain: SpinChain, scale: f64, rng: &mut SampleRng) -> Self {
        let mut machine = Self::new(chain);
        machine.params = machine
            .params
            .map_ref(&mut |values: &Vec<f64>| {
                values
                    .iter()
                    .map(|_| scale * (2.0 * rng.uniform() - 1.0))
                    .collect()
            });
        machine
    }

    /// The chain geometry the machine is defined on.
    pub fn chain(&self) -> SpinChain {
        self.chain
    }

    fn leaf(&self, key: &str) -> &[f64] {
        if let Tree::Map(entries) = &self.params {
            if let Some(Tree::Leaf(values)) = entries.get(key) {
                return values;
            }
        }
        &[]
    }

    /// Log amplitude of a configuration.
    pub fn log_psi(&self, state: &SpinState) -> f64 {
        let mut total = 0.0;
        for (site, bias) in self.leaf("field").iter().enumerate() {
            total += bias * state.spin(site);
        }
        let coupling = self.leaf("coupling");
        for (bond, (i, j)) in self.chain.bonds().enumerate() {
            total += coupling[bond] * state.spin(i) * state.spin(j);
        }
        total
    }

    /// Change in log amplitude caused by flipping the spin at `site`.
    pub fn log_psi_ratio_flip(&self, state: &SpinState, site: usize) -> f64 {
        let s = state.spin(site);
        let mut delta = -2.0 * self.leaf("field")[site] * s;
        let coupling = self.leaf("coupling");
        for (bond, (i, j)) in self.chain.bonds().enumerate() {
            if i == site {
                delta += -2.0 * coupling[bond] * s * state.spin(j);
            } else if j == site {
                delta += -2.0 * coupling[bond] * state.spin(i) * s;
            }
        }
        delta
    }

    /// Log derivatives `O_k(s) = ∂ log ψ / ∂ p_k`, mirroring the parameter
    /// structure.
    pub fn log_derivatives(&self, state: &SpinState) -> Parameters {
        let field: Vec<f64> = (0..self.chain.n_sites).map(|site| state.spin(site)).collect();
        let coupling: Vec<f64> = self
            .chain
            .bonds()
            .map(|(i, j)| state.spin(i) * state.spin(j))
            .collect();
        Tree::map_of(vec![
            ("field".to_string(), Tree::Leaf(field)),
            ("coupling".to_string(), Tree::Leaf(coupling)),
        ])
    }
}

impl Machine for JastrowMachine {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn take_parameters(&mut self) -> Parameters {
        std::mem::replace(&mut self.params, Tree::Leaf(Vec::new()))
    }

    fn set_parameters(&mut self, parameters: Parameters) {
        debug_assert_eq!(
            parameters.total_len(),
            self.chain.n_sites + self.chain.n_bonds(),
            "parameter tree must keep the machine's field/coupling structure"
        );
        self.params = parameters;
    }
}
