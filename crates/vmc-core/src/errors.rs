//! Structured error types shared across the VMC crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload carried by every [`VmcError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable kebab-case code identifying the failure.
    pub code: String,
    /// Diagnostic message for humans.
    pub message: String,
    /// Key/value context (names, paths, sizes).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a payload from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Attaches a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the VMC driver stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum VmcError {
    /// A concrete driver did not supply a forward/backward strategy.
    #[error("contract error: {0}")]
    Contract(ErrorInfo),
    /// Sampler failures while generating configurations.
    #[error("sampling error: {0}")]
    Sampling(ErrorInfo),
    /// Observable estimation failures.
    #[error("estimator error: {0}")]
    Estimator(ErrorInfo),
    /// Optimizer hook failures.
    #[error("optimizer error: {0}")]
    Optimizer(ErrorInfo),
    /// Structure mismatches between parameter trees.
    #[error("shape error: {0}")]
    Shape(ErrorInfo),
    /// Log sink and serialization failures.
    #[error("logging error: {0}")]
    Logging(ErrorInfo),
    /// Invalid run or driver configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        for (key, value) in &self.context {
            write!(f, "; {key}={value}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

impl VmcError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            VmcError::Contract(info)
            | VmcError::Sampling(info)
            | VmcError::Estimator(info)
            | VmcError::Optimizer(info)
            | VmcError::Shape(info)
            | VmcError::Logging(info)
            | VmcError::Config(info) => info,
        }
    }
}
