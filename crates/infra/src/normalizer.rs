//! Key normalization for raw source rows.
//!
//! Feeds name the same column differently (`sku`, `item_code`, `asin`, ...).
//! The normalizer maps every raw key onto its canonical name and cleans values
//! before anything reaches the engine.

use std::collections::HashMap;

use prodintel_core::{SourceRecord, fields};

/// Alias table applied to every raw key.
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    aliases: HashMap<String, String>,
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        let defaults = [
            ("identifier", fields::PRODUCT_ID),
            ("item_code", fields::PRODUCT_ID),
            ("sku", fields::PRODUCT_ID),
            ("SKU", fields::PRODUCT_ID),
            ("asin", fields::PRODUCT_ID),
            ("date", fields::MOVEMENT_DATE),
            ("stock_on_hand", fields::STOCK_LEVEL),
            ("quantity_on_hand", fields::STOCK_LEVEL),
            ("quantity_shipped", fields::UNITS_SHIPPED),
            ("shipped", fields::UNITS_SHIPPED),
        ];
        Self {
            aliases: defaults
                .into_iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }
}

impl KeyNormalizer {
    /// Add or override aliases (raw key -> canonical key).
    pub fn with_aliases<I, K, V>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (raw, canonical) in aliases {
            self.aliases.insert(raw.into().trim().to_string(), canonical.into().trim().to_string());
        }
        self
    }

    pub fn canonical_key<'a>(&'a self, raw: &'a str) -> &'a str {
        let key = raw.trim();
        self.aliases.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Normalize one row: canonical keys, trimmed values, empty strings as null.
    ///
    /// When two raw keys collapse onto one canonical key, a non-null value wins
    /// over a null one; otherwise the later column wins.
    pub fn normalize<I, K>(&self, row: I) -> SourceRecord
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: AsRef<str>,
    {
        let mut record = SourceRecord::new();
        for (raw_key, raw_value) in row {
            let key = self.canonical_key(raw_key.as_ref());
            if key.is_empty() {
                continue;
            }
            let value = raw_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() && record.get(key).is_some() {
                continue;
            }
            record.insert(key.to_string(), value);
        }
        record
    }

    pub fn normalize_all<R, I, K>(&self, rows: R) -> Vec<SourceRecord>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, Option<String>)>,
        K: AsRef<str>,
    {
        rows.into_iter().map(|row| self.normalize(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn maps_identifier_aliases_to_product_id() {
        let n = KeyNormalizer::default();
        for alias in ["identifier", "item_code", "sku", " asin "] {
            let rec = n.normalize(row(&[(alias, Some("X1"))]));
            assert_eq!(rec.get(fields::PRODUCT_ID), Some("X1"), "alias {alias}");
        }
    }

    #[test]
    fn trims_values_and_nulls_empty_strings() {
        let rec = KeyNormalizer::default().normalize(row(&[
            ("title", Some("  Lamp  ")),
            ("color", Some("   ")),
            ("size", None),
        ]));
        assert_eq!(rec.get("title"), Some("Lamp"));
        assert!(rec.contains_key("color"));
        assert_eq!(rec.get("color"), None);
        assert_eq!(rec.get("size"), None);
    }

    #[test]
    fn non_null_survives_alias_collision() {
        let rec = KeyNormalizer::default().normalize(row(&[
            ("sku", Some("A1")),
            ("asin", Some("")),
        ]));
        assert_eq!(rec.get(fields::PRODUCT_ID), Some("A1"));
    }

    #[test]
    fn custom_aliases_extend_defaults() {
        let n = KeyNormalizer::default().with_aliases([("onhand", fields::STOCK_LEVEL)]);
        let rec = n.normalize(row(&[("onhand", Some("7")), ("sku", Some("A"))]));
        assert_eq!(rec.get(fields::STOCK_LEVEL), Some("7"));
        assert_eq!(rec.get(fields::PRODUCT_ID), Some("A"));
    }
}
