//! Flat CSV sink for scalar fields.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use vmc_core::{ErrorInfo, Parameters, VmcError};

use crate::logging::{LogRecord, LogSink, LogValue};

struct CsvRow {
    step: u64,
    field: String,
    mean: f64,
    error: f64,
}

/// Sink collecting one `(step, field, mean, error)` row per scalar field.
///
/// Nested groups flatten into dotted field names; free-form text fields are
/// skipped. The file is written on `flush`.
pub struct CsvLog {
    path: PathBuf,
    rows: Vec<CsvRow>,
}

impl CsvLog {
    /// Creates a CSV sink writing to `path` on flush.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
        }
    }

    /// Path of the CSV file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn collect(&mut self, step: u64, field: &str, value: &LogValue) {
        match value {
            LogValue::Stats(stats) => self.rows.push(CsvRow {
                step,
                field: field.to_string(),
                mean: stats.mean,
                error: stats.error_of_mean,
            }),
            LogValue::Scalar(mean) => self.rows.push(CsvRow {
                step,
                field: field.to_string(),
                mean: *mean,
                error: 0.0,
            }),
            LogValue::Int(mean) => self.rows.push(CsvRow {
                step,
                field: field.to_string(),
                mean: *mean as f64,
                error: 0.0,
            }),
            LogValue::Group(entries) => {
                for (name, nested) in entries {
                    self.collect(step, &format!("{field}.{name}"), nested);
                }
            }
            LogValue::List(items) => {
                for (index, nested) in items.iter().enumerate() {
                    self.collect(step, &format!("{field}.{index}"), nested);
                }
            }
            LogValue::Text(_) => {}
        }
    }
}

impl LogSink for CsvLog {
    fn log(
        &mut self,
        step: u64,
        record: &LogRecord,
        _parameters: &Parameters,
    ) -> Result<(), VmcError> {
        for (field, value) in record {
            self.collect(step, field, value);
        }
        Ok(())
    }

    fn flush(&mut self, _parameters: &Parameters) -> Result<(), VmcError> {
        let mut file = File::create(&self.path).map_err(|err| write_error(&self.path, err))?;
        writeln!(file, "step,field,mean,error").map_err(|err| write_error(&self.path, err))?;
        for row in &self.rows {
            writeln!(
                file,
                "{},{},{:.12},{:.12}",
                row.step, row.field, row.mean, row.error
            )
            .map_err(|err| write_error(&self.path, err))?;
        }
        Ok(())
    }
}

fn write_error(path: &Path, err: std::io::Error) -> VmcError {
    VmcError::Logging(
        ErrorInfo::new("csv-write", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}
