//! Log records and the sink contract shared by all logging backends.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde::Serialize;

use vmc_core::{ErrorInfo, Parameters, Stats, Tree, VmcError};

/// A single logged value.
///
/// Statistics keep their full uncertainty payload; nested observable trees
/// log as groups/lists so the on-disk record mirrors the tree the caller
/// supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogValue {
    /// Monte Carlo statistics for an estimated quantity.
    Stats(Stats),
    /// Plain scalar diagnostic (acceptance rates, timings, ...).
    Scalar(f64),
    /// Integer diagnostic.
    Int(i64),
    /// Free-form text.
    Text(String),
    /// Named group of nested values.
    Group(IndexMap<String, LogValue>),
    /// Ordered list of nested values.
    List(Vec<LogValue>),
}

/// Ordered field map delivered to sinks once per reporting step.
pub type LogRecord = IndexMap<String, LogValue>;

impl From<Stats> for LogValue {
    fn from(stats: Stats) -> Self {
        LogValue::Stats(stats)
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        LogValue::Scalar(value)
    }
}

impl From<i64> for LogValue {
    fn from(value: i64) -> Self {
        LogValue::Int(value)
    }
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        LogValue::Text(value.to_string())
    }
}

impl From<Tree<Stats>> for LogValue {
    fn from(tree: Tree<Stats>) -> Self {
        match tree {
            Tree::Leaf(stats) => LogValue::Stats(stats),
            Tree::Seq(items) => LogValue::List(items.into_iter().map(LogValue::from).collect()),
            Tree::Map(entries) => LogValue::Group(
                entries
                    .into_iter()
                    .map(|(name, subtree)| (name, LogValue::from(subtree)))
                    .collect(),
            ),
        }
    }
}

/// Receiver for `(step, record, parameters)` tuples at reporting cadence.
///
/// Sinks are invoked synchronously and sequentially in registration order;
/// a sink error aborts the remainder of the run, including the final flush
/// of sinks not yet reached.
pub trait LogSink {
    /// Delivers one reporting step.
    fn log(&mut self, step: u64, record: &LogRecord, parameters: &Parameters)
        -> Result<(), VmcError>;

    /// Persists any buffered output.
    fn flush(&mut self, parameters: &Parameters) -> Result<(), VmcError>;
}

#[derive(Debug, Default)]
struct MemoryLogInner {
    entries: Vec<(u64, LogRecord)>,
    flush_count: usize,
}

/// In-memory sink retaining every delivered record.
///
/// The handle is cheaply cloneable; clones share the same buffer, so a
/// caller can hand one clone to `run` and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    inner: Arc<Mutex<MemoryLogInner>>,
}

impl MemoryLog {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded `(step, record)` pairs.
    pub fn entries(&self) -> Vec<(u64, LogRecord)> {
        self.inner
            .lock()
            .map(|inner| inner.entries.clone())
            .unwrap_or_default()
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many times `flush` has been invoked.
    pub fn flush_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.flush_count).unwrap_or(0)
    }
}

impl LogSink for MemoryLog {
    fn log(
        &mut self,
        step: u64,
        record: &LogRecord,
        _parameters: &Parameters,
    ) -> Result<(), VmcError> {
        let mut inner = self.inner.lock().map_err(|_| {
            VmcError::Logging(ErrorInfo::new(
                "memory-log-poisoned",
                "memory log mutex was poisoned",
            ))
        })?;
        inner.entries.push((step, record.clone()));
        Ok(())
    }

    fn flush(&mut self, _parameters: &Parameters) -> Result<(), VmcError> {
        let mut inner = self.inner.lock().map_err(|_| {
            VmcError::Logging(ErrorInfo::new(
                "memory-log-poisoned",
                "memory log mutex was poisoned",
            ))
        })?;
        inner.flush_count += 1;
        Ok(())
    }
}
