#![deny(missing_docs)]

//! Resumable variational optimization driver and run controller.
//!
//! The crate separates "how to compute loss and gradient" from "how to
//! advance parameters and report progress". A concrete driver implements
//! [`VariationalDriver`] — supplying either a joint
//! `forward_and_backward` or the split `forward`/`backward` pair, plus an
//! estimator, a sampler reset, and a self-description — and receives the
//! final operations of [`DriverExt`] for free: a resumable step iterator,
//! structure-preserving observable estimation, and a `run` operation that
//! multiplexes log sinks, progress display, and multi-process output
//! gating.
//!
//! `run` accepts its iteration count and output target as the two leading
//! arguments; the output target may be `()` (no persistence), a path-like
//! prefix (auto-constructed JSON log), a single sink, or a sink
//! collection. The legacy reversed order `run(prefix, n_iter)` is detected
//! by type and corrected with a deprecation notice.

pub mod csv_log;
pub mod distributed;
pub mod driver;
pub mod json_log;
pub mod logging;
pub mod progress;
pub mod run;
pub mod stepper;
pub mod warnings;

pub use csv_log::CsvLog;
pub use distributed::DistributedInfo;
pub use driver::{DriverExt, DriverState, VariationalDriver};
pub use json_log::JsonLog;
pub use logging::{LogRecord, LogSink, LogValue, MemoryLog};
pub use progress::{ConsoleProgress, NullProgress, ProgressSink};
pub use run::{Observables, RunArg, RunOptions, RunOutput};
pub use stepper::StepIter;
