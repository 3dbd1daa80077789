//! Products module: the master product record and the multi-source join.
//!
//! This crate is deterministic data logic (no IO, no clocks, no storage).

pub mod merge;
pub mod product;

pub use merge::{
    AssociationSummary, Associations, EntityIndex, ProductIndex, merge_associations, merge_catalog,
};
pub use product::{CatalogEntry, MasterProduct};
