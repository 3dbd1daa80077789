//! `prodintel-core`: shared building blocks for the integration & scoring engine.
//!
//! This crate contains **pure** primitives (no I/O, no logging setup).

pub mod entity;
pub mod error;
pub mod id;
pub mod parse;
pub mod record;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use record::{SourceRecord, fields};
