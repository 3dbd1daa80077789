//! Report output boundary.
//!
//! Writers receive the scored products in catalog order and must not reorder
//! or mutate them.

pub mod json_file;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prodintel_scoring::{Priority, ScoredProduct};

pub use json_file::JsonFileReportWriter;

/// Tier counts of a written report.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl ReportSummary {
    pub fn from_products(products: &[ScoredProduct]) -> Self {
        let mut summary = Self {
            total: products.len(),
            ..Self::default()
        };
        for p in products {
            match p.priority() {
                Priority::High => summary.high += 1,
                Priority::Medium => summary.medium += 1,
                Priority::Low => summary.low += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait ReportWriter: Send + Sync {
    fn write(&self, products: &[ScoredProduct]) -> Result<ReportSummary, ReportError>;
}

impl<W> ReportWriter for Arc<W>
where
    W: ReportWriter + ?Sized,
{
    fn write(&self, products: &[ScoredProduct]) -> Result<ReportSummary, ReportError> {
        (**self).write(products)
    }
}

/// In-memory writer for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReportWriter {
    inner: Mutex<Vec<Vec<ScoredProduct>>>,
}

impl InMemoryReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report written so far, oldest first.
    pub fn reports(&self) -> Vec<Vec<ScoredProduct>> {
        match self.inner.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ReportWriter for InMemoryReportWriter {
    fn write(&self, products: &[ScoredProduct]) -> Result<ReportSummary, ReportError> {
        let mut guard = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(products.to_vec());
        Ok(ReportSummary::from_products(products))
    }
}
