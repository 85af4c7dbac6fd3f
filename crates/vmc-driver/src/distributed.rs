//! Static process-fleet description used for output gating.

use serde::{Deserialize, Serialize};

/// Rank and fleet size of a cooperating multi-process run.
///
/// The driver core is single threaded; across processes it assumes an
/// identical lockstep step sequence (collective reductions happen inside
/// the estimator and optimizer hooks). The only rank-aware behavior in the
/// core is output gating: sinks and progress display run on the primary
/// process alone. The descriptor is injected at driver construction rather
/// than read from ambient globals, so tests can simulate any rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedInfo {
    /// Rank of this process within the fleet.
    pub rank: usize,
    /// Total number of cooperating processes.
    pub n_processes: usize,
}

impl DistributedInfo {
    /// Creates a descriptor for the given rank and fleet size.
    pub fn new(rank: usize, n_processes: usize) -> Self {
        Self {
            rank,
            n_processes: n_processes.max(1),
        }
    }

    /// Reads `VMC_RANK` and `VMC_NPROCS`, falling back to a single-process
    /// description when unset or malformed.
    pub fn from_env() -> Self {
        let rank = std::env::var("VMC_RANK")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        let n_processes = std::env::var("VMC_NPROCS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(1);
        Self::new(rank, n_processes)
    }

    /// Returns true when this process is responsible for all output.
    pub fn is_primary(&self) -> bool {
        self.rank == 0
    }
}

impl Default for DistributedInfo {
    fn default() -> Self {
        Self::new(0, 1)
    }
}
