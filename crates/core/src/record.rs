//! Normalized source records.
//!
//! A `SourceRecord` is one row of a tabular feed (or one element of a JSON array)
//! after key normalization. Values stay untyped text until a consumer parses them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::ProductId;

/// Canonical field names shared by the loaders and the engine stages.
pub mod fields {
    pub const PRODUCT_ID: &str = "product_id";
    pub const SUGGESTED_RETAIL: &str = "suggested_retail";
    pub const MOVEMENT_DATE: &str = "movement_date";
    pub const STOCK_LEVEL: &str = "stock_level";
    pub const UNITS_SHIPPED: &str = "units_shipped";
    pub const PRICE_EROSION_RATE: &str = "price_erosion_rate";

    /// Output keys written by the engine itself. A catalog column with one of
    /// these names would collide with them in the flat report record.
    pub const ENGINE_OWNED: &[&str] = &[
        "inventory_movements",
        "performance_metrics",
        "marketplace_snapshot",
        "current_stock",
        "sales_velocity",
        "risk_score",
        "opportunity_score",
        "total_score",
        "priority",
        "recommendation",
    ];
}

/// String-keyed record with nullable string values.
///
/// Keys are kept ordered so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    values: BTreeMap<String, Option<String>>,
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a non-null value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), Some(value.into()));
        self
    }

    /// Builder-style insert of an explicit null.
    pub fn with_null(mut self, key: impl Into<String>) -> Self {
        self.values.insert(key.into(), None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) -> Option<Option<String>> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.values.remove(key)
    }

    /// Non-null value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// The record's product identifier.
    ///
    /// Missing, null and blank identifiers are all identity defects.
    pub fn product_id(&self) -> Result<ProductId, DomainError> {
        match self.get(fields::PRODUCT_ID) {
            Some(raw) => raw.parse(),
            None => Err(DomainError::invalid_id("record has no product_id")),
        }
    }
}

impl FromIterator<(String, Option<String>)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SourceRecord {
    type Item = (String, Option<String>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_skips_null_values() {
        let rec = SourceRecord::new().with("a", "1").with_null("b");
        assert_eq!(rec.get("a"), Some("1"));
        assert_eq!(rec.get("b"), None);
        assert!(rec.contains_key("b"));
    }

    #[test]
    fn product_id_requires_non_blank_value() {
        let ok = SourceRecord::new().with(fields::PRODUCT_ID, " P1 ");
        assert_eq!(ok.product_id().unwrap().as_str(), "P1");

        let null = SourceRecord::new().with_null(fields::PRODUCT_ID);
        assert!(null.product_id().is_err());

        let blank = SourceRecord::new().with(fields::PRODUCT_ID, "");
        assert!(blank.product_id().is_err());

        assert!(SourceRecord::new().product_id().is_err());
    }

    #[test]
    fn serializes_as_flat_ordered_map() {
        let rec = SourceRecord::new().with("z", "last").with_null("a");
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"a":null,"z":"last"}"#);
    }
}
