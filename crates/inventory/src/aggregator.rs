//! Temporal aggregation of movement history into current stock and sales velocity.
//!
//! Model:
//! - `current_stock`: stock level of the latest dated movement (ties resolve to the minimum).
//! - `sales_velocity`: units shipped summed over the trailing window `(as_of - days, as_of]`.
//!
//! The as-of instant is always an explicit argument; nothing here reads the clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use prodintel_core::{DomainError, DomainResult, ProductId, SourceRecord};
use prodintel_observability::{EngineMetrics, MovementField};
use prodintel_products::MasterProduct;

use crate::movement::{Movement, ParseFailures};

pub const DEFAULT_VELOCITY_WINDOW_DAYS: u32 = 7;

/// Trailing window for sales velocity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VelocityWindow {
    days: u32,
}

impl VelocityWindow {
    pub fn new(days: u32) -> DomainResult<Self> {
        if days == 0 {
            return Err(DomainError::validation("velocity window must be at least one day"));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Half-open membership test: `as_of - days < at <= as_of`.
    pub fn contains(&self, as_of: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        let start = as_of - Duration::days(i64::from(self.days));
        at > start && at <= as_of
    }
}

impl Default for VelocityWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_VELOCITY_WINDOW_DAYS,
        }
    }
}

/// Which movements may supply the current stock reading.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Only movements dated at or before the as-of instant.
    #[default]
    AtOrBeforeAsOf,
    /// Latest movement in the set, even if dated after the as-of instant.
    LatestAny,
}

/// Derived inventory signals for one product.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct InventorySignals {
    pub current_stock: i64,
    pub sales_velocity: i64,
}

/// Products whose movements had parse failures during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    pub parse_failures: BTreeMap<ProductId, ParseFailures>,
}

impl AggregationReport {
    pub fn failures_for(&self, id: &ProductId) -> ParseFailures {
        self.parse_failures.get(id).copied().unwrap_or_default()
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct TemporalAggregator {
    window: VelocityWindow,
    policy: StockPolicy,
}

impl TemporalAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: VelocityWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reduce one movement history to its signals.
    ///
    /// Parse failures exclude the movement from the computation they affect,
    /// except units shipped, where a failure contributes 0.
    pub fn aggregate(
        &self,
        movements: &[SourceRecord],
        as_of: DateTime<Utc>,
    ) -> (InventorySignals, ParseFailures) {
        let mut failures = ParseFailures::default();
        let parsed: Vec<Movement> = movements
            .iter()
            .map(|r| Movement::from_record(r, &mut failures))
            .collect();

        let signals = InventorySignals {
            current_stock: self.current_stock(&parsed, as_of).unwrap_or(0),
            sales_velocity: self.sales_velocity(&parsed, as_of),
        };
        (signals, failures)
    }

    fn current_stock(&self, movements: &[Movement], as_of: DateTime<Utc>) -> Option<i64> {
        let mut latest: Option<(DateTime<Utc>, i64)> = None;

        for m in movements {
            let (Some(date), Some(level)) = (m.date, m.stock_level) else {
                continue;
            };
            if self.policy == StockPolicy::AtOrBeforeAsOf && date > as_of {
                continue;
            }
            latest = match latest {
                None => Some((date, level)),
                Some((best, _)) if date > best => Some((date, level)),
                // Same-day readings from several channels: keep the most pessimistic.
                Some((best, value)) if date == best => Some((best, value.min(level))),
                keep => keep,
            };
        }

        latest.map(|(_, level)| level)
    }

    fn sales_velocity(&self, movements: &[Movement], as_of: DateTime<Utc>) -> i64 {
        movements
            .iter()
            .filter(|m| m.date.is_some_and(|d| self.window.contains(as_of, d)))
            .map(|m| m.units_shipped.unwrap_or(0))
            .fold(0i64, i64::saturating_add)
    }

    /// Aggregate every product in place, in parallel.
    ///
    /// Each product only reads its own movement list; counters are atomic.
    pub fn apply(
        &self,
        products: &mut [MasterProduct],
        as_of: DateTime<Utc>,
        metrics: &EngineMetrics,
    ) -> AggregationReport {
        let failed: Vec<(ProductId, ParseFailures)> = products
            .par_iter_mut()
            .filter_map(|product| {
                let (signals, failures) = self.aggregate(product.inventory_movements(), as_of);
                product.set_signals(signals.current_stock, signals.sales_velocity);

                if failures.is_empty() {
                    return None;
                }
                metrics.record_parse_failures(MovementField::Date, failures.dates);
                metrics.record_parse_failures(MovementField::StockLevel, failures.stock_levels);
                metrics.record_parse_failures(MovementField::UnitsShipped, failures.units_shipped);
                debug!(
                    product_id = %product.product_id(),
                    dates = failures.dates,
                    stock_levels = failures.stock_levels,
                    units_shipped = failures.units_shipped,
                    "movement fields failed to parse"
                );
                Some((product.product_id().clone(), failures))
            })
            .collect();

        info!(
            products = products.len(),
            with_parse_failures = failed.len(),
            as_of = %as_of,
            window_days = self.window.days(),
            "inventory signals aggregated"
        );

        AggregationReport {
            parse_failures: failed.into_iter().collect(),
        }
    }
}
