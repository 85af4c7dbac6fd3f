use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use vmc_core::Tree;
use vmc_driver::{DriverExt, LogValue, MemoryLog, RunOptions, VariationalDriver};
use vmc_ising::{
    JastrowMachine, Magnetization, MetropolisSampler, Observable, SpinChain, SpinCorrelation,
    TransverseFieldIsing, Vmc,
};
use vmc_optim::Momentum;

fn build_driver(seed: u64) -> Vmc<Momentum> {
    let chain = SpinChain::new(6, true);
    let machine = JastrowMachine::new(chain);
    let sampler = MetropolisSampler::new(&chain, seed);
    Vmc::new(
        machine,
        Momentum::new(0.05, 0.9),
        sampler,
        TransverseFieldIsing::new(1.0, 0.5),
        64,
        8,
    )
}

#[test]
fn estimate_preserves_observable_names() {
    let mut driver = build_driver(5);
    driver.advance(1).unwrap();

    let observables: Tree<Observable> = Tree::map_of(vec![
        (
            "Magnetization".to_string(),
            Tree::Leaf(Arc::new(Magnetization) as Observable),
        ),
        (
            "Correlation".to_string(),
            Tree::Leaf(Arc::new(SpinCorrelation::new(1)) as Observable),
        ),
    ]);

    let estimated = driver.estimate(&observables).unwrap();
    let direct: Observable = Arc::new(Magnetization);
    let direct_stats = driver.estimate_stats(&direct).unwrap();

    match estimated {
        Tree::Map(entries) => {
            assert_eq!(entries.len(), 2);
            assert!(entries.contains_key("Correlation"));
            assert_eq!(entries["Magnetization"], Tree::Leaf(direct_stats));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn reset_clears_counter_and_sampling_state() {
    let mut driver = build_driver(9);
    driver.advance(2).unwrap();
    assert_eq!(driver.step_count(), 2);
    assert!(!driver.samples().is_empty());

    driver.reset();
    assert_eq!(driver.step_count(), 0);
    assert!(driver.samples().is_empty());

    driver.advance(1).unwrap();
    assert_eq!(driver.step_count(), 1);
}

#[test]
fn run_logs_energy_and_acceptance() {
    let mut driver = build_driver(13);
    let sink = MemoryLog::new();
    driver
        .run(
            4,
            sink.clone(),
            RunOptions::default()
                .with_show_progress(false)
                .with_step_size(2),
        )
        .unwrap();

    let entries = sink.entries();
    assert_eq!(entries.len(), 2);
    for (_, record) in &entries {
        assert!(matches!(&record["Energy"], LogValue::Stats(_)));
        match &record["Acceptance"] {
            LogValue::Scalar(acceptance) => assert!((0.0..=1.0).contains(acceptance)),
            other => panic!("expected scalar, got {other:?}"),
        }
    }
}

#[test]
fn run_with_prefix_writes_a_parseable_json_log() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("tfim").display().to_string();

    let mut driver = build_driver(17);
    driver
        .run(
            3,
            prefix.as_str(),
            RunOptions::default().with_show_progress(false),
        )
        .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(format!("{prefix}.log")).unwrap()).unwrap();
    let entries = parsed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[0]["Energy"]["mean"].is_number());
    assert!(entries[0]["Acceptance"].is_number());
    assert!(fs::metadata(format!("{prefix}.params.json")).is_ok());
}

#[test]
fn info_describes_the_driver() {
    let driver = build_driver(1);
    let info = driver.info(0);
    assert!(info.contains("Variational Monte Carlo"));
    assert!(info.contains("6 sites"));

    let indented = driver.info(1);
    assert!(indented.starts_with("  "));
}
