mod common;

use std::collections::BTreeMap;

use common::{leaf_values, BrokenDriver, JointDriver, SplitDriver};
use vmc_core::{Machine, Tree, VmcError};
use vmc_driver::{DriverExt, RunOptions, VariationalDriver};

#[test]
fn missing_strategy_fails_on_first_advance_not_at_construction() {
    let mut driver = BrokenDriver::new();
    assert_eq!(driver.step_count(), 0);

    let err = driver.advance(1);
    match err {
        Err(VmcError::Contract(info)) => assert_eq!(info.code, "driver-strategy-missing"),
        other => panic!("expected contract error, got {other:?}"),
    }
    assert_eq!(driver.step_count(), 0);
}

#[test]
fn missing_strategy_fails_run_as_well() {
    let mut driver = BrokenDriver::new();
    let err = driver.run(1, (), RunOptions::default().with_show_progress(false));
    assert!(matches!(err, Err(VmcError::Contract(_))));
}

#[test]
fn split_strategy_matches_joint_strategy() {
    let mut joint = JointDriver::new();
    let mut split = SplitDriver::new();

    joint.advance(8).unwrap();
    split.advance(8).unwrap();

    assert_eq!(joint.step_count(), split.step_count());
    assert_eq!(
        leaf_values(joint.machine().parameters()),
        leaf_values(split.machine().parameters())
    );
    let joint_loss = joint.loss_stats().unwrap().mean;
    let split_loss = split.loss_stats().unwrap().mean;
    assert!((joint_loss - split_loss).abs() < 1e-12);
}

#[test]
fn estimate_preserves_flat_map_structure() {
    let mut driver = JointDriver::new();
    let observables = Tree::map_of(vec![
        ("A".to_string(), Tree::Leaf("aa".to_string())),
        ("B".to_string(), Tree::Leaf("bbbb".to_string())),
    ]);
    let estimated = driver.estimate(&observables).unwrap();

    let direct_a = driver.estimate_stats(&"aa".to_string()).unwrap();
    let direct_b = driver.estimate_stats(&"bbbb".to_string()).unwrap();

    match estimated {
        Tree::Map(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries["A"], Tree::Leaf(direct_a));
            assert_eq!(entries["B"], Tree::Leaf(direct_b));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn estimate_supports_arbitrary_nesting() {
    let mut driver = JointDriver::new();
    let mut inner = BTreeMap::new();
    inner.insert("deep".to_string(), Tree::Leaf("xyz".to_string()));
    let observables = Tree::Seq(vec![
        Tree::Leaf("a".to_string()),
        Tree::Map(inner),
        Tree::Seq(vec![Tree::Leaf("ab".to_string())]),
    ]);

    let estimated = driver.estimate(&observables).unwrap();
    match estimated {
        Tree::Seq(items) => {
            assert_eq!(items.len(), 3);
            match &items[1] {
                Tree::Map(entries) => match &entries["deep"] {
                    Tree::Leaf(stats) => assert_eq!(stats.mean, 3.0),
                    other => panic!("expected leaf, got {other:?}"),
                },
                other => panic!("expected map, got {other:?}"),
            }
        }
        other => panic!("expected sequence, got {other:?}"),
    }
}

#[test]
fn info_is_indentable() {
    let driver = JointDriver::new();
    assert!(driver.info(0).starts_with("toy"));
    assert!(driver.info(2).starts_with("    "));
}
