//! Configuration loading and representation.
//!
//! Every field has a default, so an empty document (or no file at all) yields
//! the stock engine parameters.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prodintel_core::DomainError;
use prodintel_inventory::{DEFAULT_VELOCITY_WINDOW_DAYS, StockPolicy, TemporalAggregator, VelocityWindow};
use prodintel_scoring::{PriorityClassifier, ScoringThresholds};

use crate::normalizer::KeyNormalizer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub velocity_window_days: u32,
    pub stock_policy: StockPolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            velocity_window_days: DEFAULT_VELOCITY_WINDOW_DAYS,
            stock_policy: StockPolicy::default(),
        }
    }
}

/// File names of the five feeds inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub catalog: String,
    pub movements: String,
    pub metrics: String,
    pub marketplace_snapshot: String,
    pub competitor_intelligence: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            catalog: "internal_catalog_dump.csv".to_string(),
            movements: "inventory_movements.csv".to_string(),
            metrics: "performance_metrics.csv".to_string(),
            marketplace_snapshot: "marketplace_snapshot.json".to_string(),
            competitor_intelligence: "competitor_intelligence.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Extra raw-key aliases, applied on top of the built-in table.
    pub aliases: BTreeMap<String, String>,
}

/// Engine parameter surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringThresholds,
    pub aggregation: AggregationConfig,
    pub sources: SourceFiles,
    pub normalizer: NormalizerConfig,
}

impl EngineConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.scoring.validate()?;
        VelocityWindow::new(self.aggregation.velocity_window_days)?;
        Ok(())
    }

    pub fn aggregator(&self) -> Result<TemporalAggregator, DomainError> {
        Ok(TemporalAggregator::new()
            .with_window(VelocityWindow::new(self.aggregation.velocity_window_days)?)
            .with_policy(self.aggregation.stock_policy))
    }

    pub fn classifier(&self) -> PriorityClassifier {
        PriorityClassifier::new(self.scoring)
    }

    pub fn normalizer(&self) -> KeyNormalizer {
        KeyNormalizer::default().with_aliases(self.normalizer.aliases.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodintel_core::fields;

    #[test]
    fn empty_document_yields_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.scoring.low_stock_threshold, 20);
        assert_eq!(config.scoring.high_velocity_threshold, 100);
        assert_eq!(config.aggregation.velocity_window_days, 7);
        assert_eq!(config.aggregation.stock_policy, StockPolicy::AtOrBeforeAsOf);
        assert_eq!(config.sources.catalog, "internal_catalog_dump.csv");
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config: EngineConfig = toml::from_str(
            r#"
            [scoring]
            max_opportunity_price = 99.0

            [aggregation]
            stock_policy = "latest_any"

            [normalizer.aliases]
            part_no = "product_id"
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.max_opportunity_price, 99.0);
        assert_eq!(config.scoring.low_stock_threshold, 20);
        assert_eq!(config.aggregation.stock_policy, StockPolicy::LatestAny);
        assert_eq!(config.normalizer().canonical_key("part_no"), fields::PRODUCT_ID);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[aggregation]\nvelocity_window_days = 0\n").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::Invalid(_))));

        std::fs::write(&path, "[scoring\n").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::Parse { .. })));

        assert!(matches!(
            EngineConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
