//! Provenance and schema descriptors attached to serialized run artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version of a serialized payload's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped on breaking layout changes.
    pub major: u32,
    /// Bumped on additive changes.
    pub minor: u32,
    /// Bumped on fixes that keep the layout.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to serialized run artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Master deterministic seed used for all randomness, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// ISO-8601 timestamp recording when the artifact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
