use std::path::{Path, PathBuf};

use tracing::{info, warn};

use prodintel_core::SourceRecord;
use prodintel_products::Associations;
use prodintel_scoring::CompetitorContext;

use crate::config::SourceFiles;
use crate::normalizer::KeyNormalizer;
use crate::sources::json::{flatten_marketplace_snapshot, read_json_file, records_from_array};
use crate::sources::tabular::read_csv_file;
use crate::sources::{LoadError, SourceBundle, SourceLoader};

/// Loads the five feeds from one data directory.
///
/// - CSV feeds (catalog, movements, metrics) are required.
/// - The marketplace snapshot and competitor intelligence are optional: a missing
///   or unreadable document degrades to "no data" with a warning.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    files: SourceFiles,
    normalizer: KeyNormalizer,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, files: SourceFiles, normalizer: KeyNormalizer) -> Self {
        Self {
            dir: dir.into(),
            files,
            normalizer,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn load_marketplace(&self) -> Vec<SourceRecord> {
        let path = self.path(&self.files.marketplace_snapshot);
        match read_json_file(&path) {
            Ok(doc) => flatten_marketplace_snapshot(&doc, &self.normalizer),
            Err(e) => {
                warn!(error = %e, "marketplace snapshot unavailable; continuing without it");
                Vec::new()
            }
        }
    }

    fn load_competitor_context(&self) -> CompetitorContext {
        let path = self.path(&self.files.competitor_intelligence);
        match read_json_file(&path) {
            Ok(doc) => CompetitorContext::from_value(doc),
            Err(e) => {
                warn!(error = %e, "competitor intelligence unavailable; using empty context");
                CompetitorContext::empty()
            }
        }
    }
}

impl SourceLoader for DirectorySource {
    fn load(&self) -> Result<SourceBundle, LoadError> {
        let catalog = read_csv_file(&self.path(&self.files.catalog), &self.normalizer)?;
        let movements = read_csv_file(&self.path(&self.files.movements), &self.normalizer)?;
        let metrics = read_csv_file(&self.path(&self.files.metrics), &self.normalizer)?;
        let snapshots = self.load_marketplace();
        let competitor_context = self.load_competitor_context();

        info!(
            dir = %self.dir.display(),
            catalog = catalog.len(),
            movements = movements.len(),
            metrics = metrics.len(),
            snapshots = snapshots.len(),
            competitor_context = competitor_context.price_erosion_rate().is_some(),
            "sources loaded"
        );

        Ok(SourceBundle {
            catalog,
            associations: Associations {
                movements,
                metrics,
                snapshots,
            },
            competitor_context,
        })
    }
}

/// Load a JSON array feed (for callers whose feeds are JSON rather than CSV).
pub fn load_json_array(path: &Path, normalizer: &KeyNormalizer) -> Result<Vec<SourceRecord>, LoadError> {
    let doc = read_json_file(path)?;
    records_from_array(&doc, normalizer).map_err(|reason| LoadError::Shape {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodintel_core::fields;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    fn seed_csvs(dir: &Path) {
        write(dir, "internal_catalog_dump.csv", "sku,suggested_retail\nA,100\nB,50\n");
        write(dir, "inventory_movements.csv", "sku,date,stock_level,units_shipped\nA,2024-01-01,5,10\n");
        write(dir, "performance_metrics.csv", "sku,ctr\nA,0.2\n");
    }

    #[test]
    fn loads_all_feeds_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        seed_csvs(dir.path());
        write(
            dir.path(),
            "marketplace_snapshot.json",
            r#"{"platforms":{"amazon":{"products":[{"asin":"B","price_erosion_rate":1}]}}}"#,
        );
        write(
            dir.path(),
            "competitor_intelligence.json",
            r#"{"market_signals":{"price_erosion_rate":8}}"#,
        );

        let source = DirectorySource::new(dir.path(), SourceFiles::default(), KeyNormalizer::default());
        let bundle = source.load().unwrap();

        assert_eq!(bundle.catalog.len(), 2);
        assert_eq!(bundle.associations.movements[0].get(fields::MOVEMENT_DATE), Some("2024-01-01"));
        assert_eq!(bundle.associations.metrics.len(), 1);
        assert_eq!(bundle.associations.snapshots[0].get(fields::PRODUCT_ID), Some("B"));
        assert_eq!(bundle.competitor_context.price_erosion_rate(), Some(8.0));
    }

    #[test]
    fn optional_json_feeds_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        seed_csvs(dir.path());
        write(dir.path(), "competitor_intelligence.json", "{not json");

        let source = DirectorySource::new(dir.path(), SourceFiles::default(), KeyNormalizer::default());
        let bundle = source.load().unwrap();

        assert!(bundle.associations.snapshots.is_empty());
        assert_eq!(bundle.competitor_context, CompetitorContext::empty());
    }

    #[test]
    fn missing_required_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "internal_catalog_dump.csv", "sku\nA\n");

        let source = DirectorySource::new(dir.path(), SourceFiles::default(), KeyNormalizer::default());
        assert!(matches!(source.load(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn json_array_feed_with_wrong_shape_is_shape_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metrics.json", r#"{"sku":"A"}"#);
        let err = load_json_array(&dir.path().join("metrics.json"), &KeyNormalizer::default()).unwrap_err();
        assert!(matches!(err, LoadError::Shape { .. }));
    }
}
