//! Source loading boundary.
//!
//! Loaders perform all I/O before the engine runs and hand it normalized
//! records. The engine itself never touches the filesystem.

pub mod directory;
pub mod json;
pub mod tabular;

use std::path::PathBuf;

use thiserror::Error;

use prodintel_core::SourceRecord;
use prodintel_products::Associations;
use prodintel_scoring::CompetitorContext;

pub use directory::DirectorySource;

/// Everything one engine run consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBundle {
    pub catalog: Vec<SourceRecord>,
    pub associations: Associations,
    pub competitor_context: CompetitorContext,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unexpected document shape in {}: {reason}", path.display())]
    Shape { path: PathBuf, reason: String },
}

/// Produces the normalized inputs for one run.
pub trait SourceLoader: Send + Sync {
    fn load(&self) -> Result<SourceBundle, LoadError>;
}

/// Pre-built bundle for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    bundle: SourceBundle,
}

impl InMemorySource {
    pub fn new(bundle: SourceBundle) -> Self {
        Self { bundle }
    }
}

impl SourceLoader for InMemorySource {
    fn load(&self) -> Result<SourceBundle, LoadError> {
        Ok(self.bundle.clone())
    }
}
