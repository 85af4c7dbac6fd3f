use vmc_core::SampleRng;
use vmc_driver::DriverExt;
use vmc_ising::{
    JastrowMachine, LocalOperator, Magnetization, MetropolisSampler, SpinChain,
    SpinCorrelation, SpinState, TransverseFieldIsing, Vmc,
};
use vmc_optim::Sgd;

#[test]
fn classical_limit_energy_is_exact() {
    let chain = SpinChain::new(8, true);
    let machine = JastrowMachine::new(chain);
    let hamiltonian = TransverseFieldIsing::new(1.0, 0.0);

    let all_up = SpinState::all_up(&chain);
    assert_eq!(hamiltonian.local_value(&machine, &all_up), -8.0);

    let mut one_flipped = all_up.clone();
    one_flipped.flip(3);
    // Two bonds change sign: -8 + 2 * 2 = -4.
    assert_eq!(hamiltonian.local_value(&machine, &one_flipped), -4.0);
}

#[test]
fn transverse_term_is_exact_for_a_flat_amplitude() {
    let chain = SpinChain::new(8, true);
    let machine = JastrowMachine::new(chain);
    // All flip ratios are 1 at zero parameters.
    let hamiltonian = TransverseFieldIsing::new(1.0, 0.3);
    let all_up = SpinState::all_up(&chain);
    let expected = -8.0 - 0.3 * 8.0;
    assert!((hamiltonian.local_value(&machine, &all_up) - expected).abs() < 1e-12);
}

#[test]
fn flip_ratio_matches_log_amplitude_difference() {
    let chain = SpinChain::new(6, true);
    let mut rng = SampleRng::from_seed(3);
    let machine = JastrowMachine::with_random_init(chain, 0.4, &mut rng);
    let state = SpinState::random(&chain, &mut rng);

    for site in 0..chain.n_sites {
        let mut flipped = state.clone();
        flipped.flip(site);
        let direct = machine.log_psi(&flipped) - machine.log_psi(&state);
        let ratio = machine.log_psi_ratio_flip(&state, site);
        assert!((direct - ratio).abs() < 1e-10, "site {site}");
    }
}

#[test]
fn diagnostic_operators_read_polarized_configurations() {
    let chain = SpinChain::new(6, true);
    let machine = JastrowMachine::new(chain);
    let all_up = SpinState::all_up(&chain);

    assert_eq!(Magnetization.local_value(&machine, &all_up), 1.0);
    assert_eq!(
        SpinCorrelation::new(1).local_value(&machine, &all_up),
        1.0
    );
    assert_eq!(
        SpinCorrelation::new(3).local_value(&machine, &all_up),
        1.0
    );
}

#[test]
fn optimization_lowers_the_energy() {
    let chain = SpinChain::new(8, true);
    let machine = JastrowMachine::new(chain);
    let sampler = MetropolisSampler::new(&chain, 2718);
    let mut driver = Vmc::new(
        machine,
        Sgd::new(0.05),
        sampler,
        TransverseFieldIsing::new(1.0, 0.5),
        256,
        32,
    );

    driver.advance(1).unwrap();
    let initial = driver.loss_stats().unwrap().mean;

    driver.advance(29).unwrap();
    let optimized = driver.loss_stats().unwrap().mean;

    assert!(
        optimized < initial - 0.5,
        "expected a clear energy drop, got {initial} -> {optimized}"
    );
}
