mod common;

use common::{JointDriver, RecordingProgress};
use vmc_core::Tree;
use vmc_driver::{DriverExt, LogValue, MemoryLog, Observables, RunOptions, RunOutput};

fn quiet<Obs>() -> RunOptions<Obs> {
    RunOptions::default().with_show_progress(false)
}

#[test]
fn run_without_output_target_only_advances() {
    let mut driver = JointDriver::new();
    driver.run(5, (), quiet()).unwrap();
    assert_eq!(driver.step_count(), 5);
}

#[test]
fn memory_sink_receives_one_record_per_reporting_step() {
    let mut driver = JointDriver::new();
    let sink = MemoryLog::new();
    driver
        .run(6, sink.clone(), quiet().with_step_size(2))
        .unwrap();

    let entries = sink.entries();
    let steps: Vec<u64> = entries.iter().map(|(step, _)| *step).collect();
    assert_eq!(steps, vec![0, 2, 4]);
    assert_eq!(sink.flush_count(), 1);
    assert_eq!(driver.step_count(), 6);
}

#[test]
fn loss_snapshot_is_merged_under_its_configured_name() {
    let mut driver = JointDriver::new();
    let sink = MemoryLog::new();
    driver.run(3, sink.clone(), quiet()).unwrap();

    let entries = sink.entries();
    assert_eq!(entries.len(), 3);
    match &entries[0].1["Loss"] {
        LogValue::Stats(stats) => assert!((stats.mean - 1.0).abs() < 1e-12),
        other => panic!("expected stats, got {other:?}"),
    }
    // Loss at yield k reflects the parameters before that batch's update.
    match &entries[2].1["Loss"] {
        LogValue::Stats(stats) => assert!((stats.mean - 0.8).abs() < 1e-12),
        other => panic!("expected stats, got {other:?}"),
    }
}

#[test]
fn named_observables_are_estimated_every_reporting_step() {
    let mut driver = JointDriver::new();
    let sink = MemoryLog::new();
    let mut observables: Observables<String> = Observables::new();
    observables.insert("A".to_string(), Tree::Leaf("aa".to_string()));
    observables.insert("B".to_string(), Tree::Leaf("bbbb".to_string()));

    driver
        .run(2, sink.clone(), quiet().with_observables(observables))
        .unwrap();

    let entries = sink.entries();
    for (_, record) in &entries {
        match &record["A"] {
            LogValue::Stats(stats) => assert_eq!(stats.mean, 2.0),
            other => panic!("expected stats, got {other:?}"),
        }
        match &record["B"] {
            LogValue::Stats(stats) => assert_eq!(stats.mean, 4.0),
            other => panic!("expected stats, got {other:?}"),
        }
        assert!(record.contains_key("Loss"));
    }
}

#[test]
fn sinks_are_invoked_in_registration_order() {
    let mut driver = JointDriver::new();
    let first = MemoryLog::new();
    let second = MemoryLog::new();
    let sinks = RunOutput::Sinks(vec![Box::new(first.clone()), Box::new(second.clone())]);

    driver.run(4, sinks, quiet()).unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 4);
    assert_eq!(first.flush_count(), 1);
    assert_eq!(second.flush_count(), 1);
}

#[test]
fn non_primary_process_advances_without_output_or_progress() {
    let mut driver = JointDriver::with_rank(1, 4);
    let sink = MemoryLog::new();
    let progress = RecordingProgress::new();
    let options = RunOptions::default()
        .with_show_progress(true)
        .with_progress(Box::new(progress.clone()));

    driver.run(5, sink.clone(), options).unwrap();

    assert_eq!(driver.step_count(), 5);
    assert!(sink.is_empty());
    assert_eq!(sink.flush_count(), 0);
    assert_eq!(progress.event_count(), 0);
}

#[test]
fn progress_advances_by_step_value_deltas() {
    let mut driver = JointDriver::new();
    let progress = RecordingProgress::new();
    let options = RunOptions::default()
        .with_step_size(2)
        .with_show_progress(true)
        .with_progress(Box::new(progress.clone()));

    driver.run(4, (), options).unwrap();

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(events.first().unwrap(), "begin 4");
    assert_eq!(events.last().unwrap(), "finish");
    let advances: Vec<&String> = events
        .iter()
        .filter(|event| event.starts_with("advance"))
        .collect();
    // The first yield reports before any advance of its batch has landed;
    // the final delta tops the bar up to the full total.
    assert_eq!(advances, vec!["advance 0", "advance 2", "advance 2"]);
    assert!(events.iter().any(|event| event.starts_with("label Loss=")));
}

#[test]
fn step_size_zero_is_clamped_to_one() {
    let mut driver = JointDriver::new();
    let sink = MemoryLog::new();
    driver
        .run(3, sink.clone(), quiet().with_step_size(0))
        .unwrap();
    assert_eq!(sink.len(), 3);
    assert_eq!(driver.step_count(), 3);
}
