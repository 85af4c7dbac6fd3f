//! Runtime deprecation notices.

use std::sync::atomic::{AtomicU64, Ordering};

static DEPRECATIONS_EMITTED: AtomicU64 = AtomicU64::new(0);

/// Emits a deprecation notice to stderr and bumps the process-wide counter.
///
/// Deprecated entry points keep working after emitting the notice; the
/// counter lets tests assert that a legacy call shape produced exactly one
/// notice.
pub fn warn_deprecation(message: &str) {
    eprintln!("Deprecation warning: {message}");
    DEPRECATIONS_EMITTED.fetch_add(1, Ordering::Relaxed);
}

/// Returns the number of deprecation notices emitted by this process.
pub fn deprecation_count() -> u64 {
    DEPRECATIONS_EMITTED.load(Ordering::Relaxed)
}
