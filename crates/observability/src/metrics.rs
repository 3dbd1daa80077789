//! Engine counters.
//!
//! Counters are plain atomics so the parallel aggregation/classification stages
//! can record into one shared instance without locking. A run owns its own
//! `EngineMetrics`; nothing here is process-global.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Associated feed a record came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociatedSource {
    Movements,
    Metrics,
    Snapshots,
}

impl AssociatedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociatedSource::Movements => "movements",
            AssociatedSource::Metrics => "metrics",
            AssociatedSource::Snapshots => "snapshots",
        }
    }
}

/// Movement field whose value failed to parse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MovementField {
    Date,
    StockLevel,
    UnitsShipped,
}

#[derive(Debug, Default)]
pub struct EngineMetrics {
    catalog_rejected_missing_id: AtomicU64,
    catalog_duplicate_overwrites: AtomicU64,
    unmatched_movements: AtomicU64,
    unmatched_metrics: AtomicU64,
    unmatched_snapshots: AtomicU64,
    movement_date_parse_failures: AtomicU64,
    movement_stock_parse_failures: AtomicU64,
    movement_units_parse_failures: AtomicU64,
    invariant_violations: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_missing_id(&self) {
        self.catalog_rejected_missing_id.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_overwrite(&self) {
        self.catalog_duplicate_overwrites.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unmatched(&self, source: AssociatedSource) {
        let counter = match source {
            AssociatedSource::Movements => &self.unmatched_movements,
            AssociatedSource::Metrics => &self.unmatched_metrics,
            AssociatedSource::Snapshots => &self.unmatched_snapshots,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failures(&self, field: MovementField, count: u64) {
        if count == 0 {
            return;
        }
        let counter = match field {
            MovementField::Date => &self.movement_date_parse_failures,
            MovementField::StockLevel => &self.movement_stock_parse_failures,
            MovementField::UnitsShipped => &self.movement_units_parse_failures,
        };
        counter.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_invariant_violation(&self) {
        self.invariant_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unmatched(&self, source: AssociatedSource) -> u64 {
        match source {
            AssociatedSource::Movements => self.unmatched_movements.load(Ordering::Relaxed),
            AssociatedSource::Metrics => self.unmatched_metrics.load(Ordering::Relaxed),
            AssociatedSource::Snapshots => self.unmatched_snapshots.load(Ordering::Relaxed),
        }
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            catalog_rejected_missing_id: self.catalog_rejected_missing_id.load(Ordering::Relaxed),
            catalog_duplicate_overwrites: self.catalog_duplicate_overwrites.load(Ordering::Relaxed),
            unmatched_movements: self.unmatched_movements.load(Ordering::Relaxed),
            unmatched_metrics: self.unmatched_metrics.load(Ordering::Relaxed),
            unmatched_snapshots: self.unmatched_snapshots.load(Ordering::Relaxed),
            movement_date_parse_failures: self.movement_date_parse_failures.load(Ordering::Relaxed),
            movement_stock_parse_failures: self.movement_stock_parse_failures.load(Ordering::Relaxed),
            movement_units_parse_failures: self.movement_units_parse_failures.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of `EngineMetrics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub catalog_rejected_missing_id: u64,
    pub catalog_duplicate_overwrites: u64,
    pub unmatched_movements: u64,
    pub unmatched_metrics: u64,
    pub unmatched_snapshots: u64,
    pub movement_date_parse_failures: u64,
    pub movement_stock_parse_failures: u64,
    pub movement_units_parse_failures: u64,
    pub invariant_violations: u64,
}

impl MetricsSnapshot {
    pub fn unmatched_total(&self) -> u64 {
        self.unmatched_movements + self.unmatched_metrics + self.unmatched_snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_source() {
        let m = EngineMetrics::new();
        m.record_unmatched(AssociatedSource::Movements);
        m.record_unmatched(AssociatedSource::Movements);
        m.record_unmatched(AssociatedSource::Snapshots);
        m.record_missing_id();
        m.record_parse_failures(MovementField::Date, 3);
        m.record_parse_failures(MovementField::StockLevel, 0);

        let snap = m.snapshot();
        assert_eq!(snap.unmatched_movements, 2);
        assert_eq!(snap.unmatched_metrics, 0);
        assert_eq!(snap.unmatched_snapshots, 1);
        assert_eq!(snap.unmatched_total(), 3);
        assert_eq!(snap.catalog_rejected_missing_id, 1);
        assert_eq!(snap.movement_date_parse_failures, 3);
        assert_eq!(snap.movement_stock_parse_failures, 0);
        assert_eq!(m.unmatched(AssociatedSource::Movements), 2);
    }

    #[test]
    fn counters_are_shareable_across_threads() {
        let m = std::sync::Arc::new(EngineMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = m.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        m.record_duplicate_overwrite();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(m.snapshot().catalog_duplicate_overwrites, 400);
    }

    #[test]
    fn snapshot_serializes_with_counter_names() {
        let m = EngineMetrics::new();
        m.record_invariant_violation();
        let v = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(v["invariant_violations"], 1);
        assert_eq!(v["unmatched_snapshots"], 0);
    }
}
