//! Inventory module: movement parsing and temporal aggregation.
//!
//! This crate contains deterministic signal derivation over movement history
//! (no IO, no wall-clock reads, no storage).

pub mod aggregator;
pub mod movement;

pub use aggregator::{
    AggregationReport, DEFAULT_VELOCITY_WINDOW_DAYS, InventorySignals, StockPolicy, TemporalAggregator,
    VelocityWindow,
};
pub use movement::{Movement, ParseFailures, parse_movement_date};
