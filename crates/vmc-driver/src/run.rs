//! Run controller: logging cadence, observable estimation, progress
//! reporting, and multi-process output gating around the step iterator.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use vmc_core::{ErrorInfo, Machine, Tree, VmcError};

use crate::csv_log::CsvLog;
use crate::driver::{DriverExt, VariationalDriver};
use crate::json_log::JsonLog;
use crate::logging::{LogRecord, LogSink, LogValue, MemoryLog};
use crate::progress::{ConsoleProgress, NullProgress, ProgressSink};
use crate::stepper::StepIter;
use crate::warnings::warn_deprecation;

/// Named observable trees estimated and logged at reporting cadence.
pub type Observables<Obs> = IndexMap<String, Tree<Obs>>;

/// Output target of a run.
pub enum RunOutput {
    /// No persistence; a console notice is printed and the run proceeds
    /// with progress display only.
    None,
    /// Prefix for an auto-constructed [`JsonLog`] in overwrite mode.
    Prefix(PathBuf),
    /// Explicit sinks, invoked in order on every reporting step.
    Sinks(Vec<Box<dyn LogSink>>),
}

impl fmt::Debug for RunOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutput::None => write!(f, "RunOutput::None"),
            RunOutput::Prefix(prefix) => write!(f, "RunOutput::Prefix({})", prefix.display()),
            RunOutput::Sinks(sinks) => write!(f, "RunOutput::Sinks(len={})", sinks.len()),
        }
    }
}

impl From<()> for RunOutput {
    fn from(_: ()) -> Self {
        RunOutput::None
    }
}

impl From<&str> for RunOutput {
    fn from(prefix: &str) -> Self {
        RunOutput::Prefix(PathBuf::from(prefix))
    }
}

impl From<String> for RunOutput {
    fn from(prefix: String) -> Self {
        RunOutput::Prefix(PathBuf::from(prefix))
    }
}

impl From<&Path> for RunOutput {
    fn from(prefix: &Path) -> Self {
        RunOutput::Prefix(prefix.to_path_buf())
    }
}

impl From<PathBuf> for RunOutput {
    fn from(prefix: PathBuf) -> Self {
        RunOutput::Prefix(prefix)
    }
}

impl From<Box<dyn LogSink>> for RunOutput {
    fn from(sink: Box<dyn LogSink>) -> Self {
        RunOutput::Sinks(vec![sink])
    }
}

impl From<Vec<Box<dyn LogSink>>> for RunOutput {
    fn from(sinks: Vec<Box<dyn LogSink>>) -> Self {
        RunOutput::Sinks(sinks)
    }
}

impl From<JsonLog> for RunOutput {
    fn from(sink: JsonLog) -> Self {
        RunOutput::Sinks(vec![Box::new(sink)])
    }
}

impl From<CsvLog> for RunOutput {
    fn from(sink: CsvLog) -> Self {
        RunOutput::Sinks(vec![Box::new(sink)])
    }
}

impl From<MemoryLog> for RunOutput {
    fn from(sink: MemoryLog) -> Self {
        RunOutput::Sinks(vec![Box::new(sink)])
    }
}

/// One of the two leading `run` arguments.
///
/// `run` historically accepted its iteration count and output target in
/// either order; both arguments convert into this sum type so the legacy
/// reversed shape can be detected by the runtime type of each value and
/// corrected. Only the string-prefix/count pair is ever swapped.
#[derive(Debug)]
pub enum RunArg {
    /// Total iteration count.
    Iterations(u64),
    /// Output target.
    Output(RunOutput),
}

impl From<u64> for RunArg {
    fn from(n: u64) -> Self {
        RunArg::Iterations(n)
    }
}

impl From<u32> for RunArg {
    fn from(n: u32) -> Self {
        RunArg::Iterations(n as u64)
    }
}

impl From<usize> for RunArg {
    fn from(n: usize) -> Self {
        RunArg::Iterations(n as u64)
    }
}

impl From<i32> for RunArg {
    fn from(n: i32) -> Self {
        RunArg::Iterations(n.max(0) as u64)
    }
}

impl From<i64> for RunArg {
    fn from(n: i64) -> Self {
        RunArg::Iterations(n.max(0) as u64)
    }
}

impl From<()> for RunArg {
    fn from(_: ()) -> Self {
        RunArg::Output(RunOutput::None)
    }
}

impl From<&str> for RunArg {
    fn from(prefix: &str) -> Self {
        RunArg::Output(prefix.into())
    }
}

impl From<String> for RunArg {
    fn from(prefix: String) -> Self {
        RunArg::Output(prefix.into())
    }
}

impl From<&Path> for RunArg {
    fn from(prefix: &Path) -> Self {
        RunArg::Output(prefix.into())
    }
}

impl From<PathBuf> for RunArg {
    fn from(prefix: PathBuf) -> Self {
        RunArg::Output(prefix.into())
    }
}

impl From<RunOutput> for RunArg {
    fn from(output: RunOutput) -> Self {
        RunArg::Output(output)
    }
}

impl From<JsonLog> for RunArg {
    fn from(sink: JsonLog) -> Self {
        RunArg::Output(sink.into())
    }
}

impl From<CsvLog> for RunArg {
    fn from(sink: CsvLog) -> Self {
        RunArg::Output(sink.into())
    }
}

impl From<MemoryLog> for RunArg {
    fn from(sink: MemoryLog) -> Self {
        RunArg::Output(sink.into())
    }
}

impl From<Box<dyn LogSink>> for RunArg {
    fn from(sink: Box<dyn LogSink>) -> Self {
        RunArg::Output(sink.into())
    }
}

impl From<Vec<Box<dyn LogSink>>> for RunArg {
    fn from(sinks: Vec<Box<dyn LogSink>>) -> Self {
        RunArg::Output(sinks.into())
    }
}

/// Cadence and display knobs for a run.
pub struct RunOptions<Obs> {
    pub(crate) observables: Option<Observables<Obs>>,
    pub(crate) step_size: u64,
    pub(crate) save_params_every: u64,
    pub(crate) write_every: u64,
    pub(crate) show_progress: bool,
    pub(crate) progress: Option<Box<dyn ProgressSink>>,
}

impl<Obs> Default for RunOptions<Obs> {
    fn default() -> Self {
        Self {
            observables: None,
            step_size: 1,
            save_params_every: 50,
            write_every: 50,
            show_progress: true,
            progress: None,
        }
    }
}

impl<Obs> RunOptions<Obs> {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the named observables estimated on every reporting step.
    pub fn with_observables(mut self, observables: Observables<Obs>) -> Self {
        self.observables = Some(observables);
        self
    }

    /// Number of internal advances between reported samples.
    pub fn with_step_size(mut self, step_size: u64) -> Self {
        self.step_size = step_size;
        self
    }

    /// Parameter snapshot cadence of the auto-constructed JSON log.
    pub fn with_save_params_every(mut self, every: u64) -> Self {
        self.save_params_every = every;
        self
    }

    /// Flush cadence of the auto-constructed JSON log.
    pub fn with_write_every(mut self, every: u64) -> Self {
        self.write_every = every;
        self
    }

    /// Toggles progress display.
    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Overrides the progress renderer.
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }
}

fn resolve_run_args(first: RunArg, second: RunArg) -> Result<(u64, RunOutput), VmcError> {
    match (first, second) {
        (RunArg::Iterations(n_iter), RunArg::Output(output)) => Ok((n_iter, output)),
        // Legacy reversed shape, detected purely by the runtime type of the
        // two leading arguments.
        (RunArg::Output(RunOutput::Prefix(prefix)), RunArg::Iterations(n_iter)) => {
            warn_deprecation(
                "the positional form run(out, n_iter) is deprecated; use run(n_iter, out) instead",
            );
            Ok((n_iter, RunOutput::Prefix(prefix)))
        }
        (RunArg::Output(output), RunArg::Iterations(_)) => Err(VmcError::Config(
            ErrorInfo::new(
                "run-args-reversed",
                "only a string prefix is accepted in the legacy reversed position",
            )
            .with_context("output", format!("{output:?}")),
        )),
        (RunArg::Iterations(_), RunArg::Iterations(_)) => Err(VmcError::Config(ErrorInfo::new(
            "run-args-ambiguous",
            "run received two iteration counts and no output target",
        ))),
        (RunArg::Output(_), RunArg::Output(_)) => Err(VmcError::Config(ErrorInfo::new(
            "run-args-missing-count",
            "run received two output targets and no iteration count",
        ))),
    }
}

pub(crate) fn execute<D>(
    driver: &mut D,
    first: RunArg,
    second: RunArg,
    mut options: RunOptions<D::Observable>,
) -> Result<(), VmcError>
where
    D: VariationalDriver,
    D::Observable: Clone,
{
    let (n_iter, output) = resolve_run_args(first, second)?;
    let step_size = options.step_size.max(1);

    let observables: Observables<D::Observable> = match options.observables.take() {
        Some(observables) => observables,
        None => {
            let registry = driver.state().registry();
            if registry.is_empty() {
                Observables::new()
            } else {
                warn_deprecation(
                    "the implicit observable registry is deprecated; pass observables to `run`",
                );
                registry
                    .iter()
                    .map(|(name, observable)| (name.clone(), Tree::Leaf(observable.clone())))
                    .collect()
            }
        }
    };

    let primary = driver.state().distributed().is_primary();
    let mut sinks: Vec<Box<dyn LogSink>> = if primary {
        match output {
            RunOutput::None => {
                println!(
                    "No output target given (prefix path or log sink); \
                     running the optimization without saving results."
                );
                Vec::new()
            }
            RunOutput::Prefix(prefix) => vec![Box::new(JsonLog::overwrite(
                prefix,
                options.save_params_every,
                options.write_every,
            )?)],
            RunOutput::Sinks(sinks) => sinks,
        }
    } else {
        Vec::new()
    };

    let mut progress: Box<dyn ProgressSink> = if options.show_progress && primary {
        options
            .progress
            .take()
            .unwrap_or_else(|| Box::new(ConsoleProgress::new()))
    } else {
        Box::new(NullProgress)
    };

    progress.begin(n_iter as f64);
    let mut reported_value = driver.step_value();

    let mut steps = StepIter::new(driver, n_iter, step_size);
    while let Some(yielded) = steps.next() {
        yielded?;
        let driver = steps.driver_mut();

        let mut record = LogRecord::new();
        for (name, subtree) in &observables {
            let stats = driver.estimate(subtree)?;
            record.insert(name.clone(), LogValue::from(stats));
        }
        if let Some(stats) = driver.state().loss_stats().copied() {
            let loss_name = driver.state().loss_name().to_string();
            progress.set_label(&format!("{loss_name}={stats}"));
            record.insert(loss_name, LogValue::Stats(stats));
        }
        if !sinks.is_empty() {
            let step_count = driver.step_count();
            driver.log_additional_data(&mut record, step_count);
            for sink in sinks.iter_mut() {
                sink.log(step_count, &record, driver.state().machine().parameters())?;
            }
        }

        let value = driver.step_value();
        progress.advance_by(value - reported_value);
        reported_value = value;
    }

    // Final delta so continuous step values end up fully reported.
    let driver = steps.driver_mut();
    progress.advance_by(driver.step_value() - reported_value);
    progress.finish();

    for sink in sinks.iter_mut() {
        sink.flush(driver.state().machine().parameters())?;
    }
    Ok(())
}
