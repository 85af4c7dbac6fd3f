//! Structured JSON log with parameter snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use vmc_core::{ErrorInfo, Parameters, RunProvenance, SchemaVersion, VmcError};

use crate::logging::{LogRecord, LogSink};

/// One logged reporting step.
#[derive(Debug, Clone, Serialize)]
struct LogEntry {
    /// Step counter value when the record was delivered.
    step: u64,
    /// Logged fields, in registration order.
    #[serde(flatten)]
    fields: LogRecord,
}

#[derive(Serialize)]
struct LogFileContents<'a> {
    schema: SchemaVersion,
    provenance: &'a RunProvenance,
    entries: &'a [LogEntry],
}

/// Default sink writing scalar entries to `<prefix>.log` and full parameter
/// snapshots to `<prefix>.params.json`.
///
/// Entries accumulate in memory and the log file is rewritten every
/// `write_every` delivered records; parameters are snapshotted every
/// `save_params_every` records. Both files are written unconditionally on
/// `flush`, so a run that ends between cadences still persists its tail.
pub struct JsonLog {
    prefix: PathBuf,
    save_params_every: u64,
    write_every: u64,
    entries: Vec<LogEntry>,
    since_write: u64,
    since_params: u64,
    provenance: RunProvenance,
}

impl JsonLog {
    /// Creates a log at `prefix`, removing any prior output at that prefix.
    pub fn overwrite(
        prefix: impl Into<PathBuf>,
        save_params_every: u64,
        write_every: u64,
    ) -> Result<Self, VmcError> {
        let prefix = prefix.into();
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert("vmc-driver".to_string(), env!("CARGO_PKG_VERSION").to_string());
        let log = Self {
            prefix,
            save_params_every,
            write_every,
            entries: Vec::new(),
            since_write: 0,
            since_params: 0,
            provenance: RunProvenance {
                seed: None,
                created_at: chrono::Utc::now().to_rfc3339(),
                tool_versions,
            },
        };
        for path in [log.log_path(), log.params_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(|err| {
                    VmcError::Logging(
                        ErrorInfo::new("log-truncate", err.to_string())
                            .with_context("path", path.display().to_string()),
                    )
                })?;
            }
        }
        Ok(log)
    }

    /// Records the master seed in the provenance header.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.provenance.seed = Some(seed);
        self
    }

    /// Path of the scalar log file.
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.log", self.prefix.display()))
    }

    /// Path of the parameter snapshot file.
    pub fn params_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.params.json", self.prefix.display()))
    }

    fn write_json(path: &Path, payload: &impl Serialize) -> Result<(), VmcError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    VmcError::Logging(
                        ErrorInfo::new("log-mkdir", err.to_string())
                            .with_context("path", parent.display().to_string()),
                    )
                })?;
            }
        }
        let json = serde_json::to_string_pretty(payload).map_err(|err| {
            VmcError::Logging(
                ErrorInfo::new("log-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            VmcError::Logging(
                ErrorInfo::new("log-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    fn write_log_file(&self) -> Result<(), VmcError> {
        let contents = LogFileContents {
            schema: SchemaVersion::default(),
            provenance: &self.provenance,
            entries: &self.entries,
        };
        Self::write_json(&self.log_path(), &contents)
    }

    fn write_params(&self, parameters: &Parameters) -> Result<(), VmcError> {
        Self::write_json(&self.params_path(), parameters)
    }
}

impl LogSink for JsonLog {
    fn log(
        &mut self,
        step: u64,
        record: &LogRecord,
        parameters: &Parameters,
    ) -> Result<(), VmcError> {
        self.entries.push(LogEntry {
            step,
            fields: record.clone(),
        });
        self.since_write += 1;
        self.since_params += 1;
        if self.write_every > 0 && self.since_write >= self.write_every {
            self.write_log_file()?;
            self.since_write = 0;
        }
        if self.save_params_every > 0 && self.since_params >= self.save_params_every {
            self.write_params(parameters)?;
            self.since_params = 0;
        }
        Ok(())
    }

    fn flush(&mut self, parameters: &Parameters) -> Result<(), VmcError> {
        self.write_log_file()?;
        self.write_params(parameters)?;
        self.since_write = 0;
        self.since_params = 0;
        Ok(())
    }
}
