//! Tracing, logging, metrics (shared setup).

/// Initialize process-wide observability (JSON tracing, `RUST_LOG` filter).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Engine counters consumed by logging/metrics collaborators.
pub mod metrics;

pub use self::metrics::{AssociatedSource, EngineMetrics, MetricsSnapshot, MovementField};
pub use self::tracing::{LogFormat, init_with};
