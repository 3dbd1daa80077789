use serde::Serialize;
use tracing::debug;

use prodintel_core::parse::parse_decimal;
use prodintel_core::{DomainResult, Entity, ProductId, SourceRecord, fields};

/// Catalog row validated at the merge boundary.
///
/// The required identity is lifted out of the record; every other catalog
/// column travels along untouched in `attributes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub product_id: ProductId,
    pub attributes: SourceRecord,
}

impl CatalogEntry {
    /// Validate a normalized catalog record.
    ///
    /// Fails with `DomainError::InvalidId` when `product_id` is missing, null or blank.
    /// Columns named like engine-owned output fields are dropped.
    pub fn from_record(mut record: SourceRecord) -> DomainResult<Self> {
        let product_id = record.product_id()?;
        record.remove(fields::PRODUCT_ID);
        for key in fields::ENGINE_OWNED {
            if record.remove(key).is_some() {
                debug!(product_id = %product_id, column = key, "dropping catalog column shadowed by engine output");
            }
        }
        Ok(Self {
            product_id,
            attributes: record,
        })
    }
}

/// Denormalized per-product record: catalog attributes plus everything joined onto it.
///
/// Created once from the catalog, enriched by the association merger (movements,
/// metrics, snapshot) and by the temporal aggregator (derived signals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MasterProduct {
    product_id: ProductId,
    #[serde(flatten)]
    attributes: SourceRecord,
    inventory_movements: Vec<SourceRecord>,
    performance_metrics: Option<SourceRecord>,
    marketplace_snapshot: Option<SourceRecord>,
    current_stock: i64,
    sales_velocity: i64,
}

impl MasterProduct {
    /// Fresh master record with empty association containers and zeroed signals.
    pub fn from_entry(entry: CatalogEntry) -> Self {
        Self {
            product_id: entry.product_id,
            attributes: entry.attributes,
            inventory_movements: Vec::new(),
            performance_metrics: None,
            marketplace_snapshot: None,
            current_stock: 0,
            sales_velocity: 0,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn attributes(&self) -> &SourceRecord {
        &self.attributes
    }

    pub fn inventory_movements(&self) -> &[SourceRecord] {
        &self.inventory_movements
    }

    pub fn performance_metrics(&self) -> Option<&SourceRecord> {
        self.performance_metrics.as_ref()
    }

    pub fn marketplace_snapshot(&self) -> Option<&SourceRecord> {
        self.marketplace_snapshot.as_ref()
    }

    pub fn current_stock(&self) -> i64 {
        self.current_stock
    }

    pub fn sales_velocity(&self) -> i64 {
        self.sales_velocity
    }

    /// Catalog price (`suggested_retail`); missing or non-numeric reads as 0.
    pub fn internal_price(&self) -> f64 {
        self.attributes
            .get(fields::SUGGESTED_RETAIL)
            .and_then(parse_decimal)
            .unwrap_or(0.0)
    }

    /// Per-product erosion rate carried by the marketplace snapshot, if parseable.
    pub fn snapshot_price_erosion(&self) -> Option<f64> {
        self.marketplace_snapshot
            .as_ref()
            .and_then(|s| s.get(fields::PRICE_EROSION_RATE))
            .and_then(parse_decimal)
    }

    pub fn push_movement(&mut self, movement: SourceRecord) {
        self.inventory_movements.push(movement);
    }

    /// Set performance metrics; returns the record it replaced.
    pub fn set_performance_metrics(&mut self, metrics: SourceRecord) -> Option<SourceRecord> {
        self.performance_metrics.replace(metrics)
    }

    /// Set the marketplace snapshot; returns the record it replaced.
    pub fn set_marketplace_snapshot(&mut self, snapshot: SourceRecord) -> Option<SourceRecord> {
        self.marketplace_snapshot.replace(snapshot)
    }

    /// Record the aggregated inventory signals.
    pub fn set_signals(&mut self, current_stock: i64, sales_velocity: i64) {
        self.current_stock = current_stock;
        self.sales_velocity = sales_velocity;
    }
}

impl Entity for MasterProduct {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, price: Option<&str>) -> CatalogEntry {
        let mut rec = SourceRecord::new()
            .with(fields::PRODUCT_ID, id)
            .with("title", "Widget");
        if let Some(p) = price {
            rec = rec.with(fields::SUGGESTED_RETAIL, p);
        }
        CatalogEntry::from_record(rec).unwrap()
    }

    #[test]
    fn from_record_lifts_identity_out_of_attributes() {
        let e = entry("P1", Some("10"));
        assert_eq!(e.product_id.as_str(), "P1");
        assert!(!e.attributes.contains_key(fields::PRODUCT_ID));
        assert_eq!(e.attributes.get("title"), Some("Widget"));
    }

    #[test]
    fn from_record_drops_engine_owned_columns() {
        let rec = SourceRecord::new()
            .with(fields::PRODUCT_ID, "P1")
            .with("current_stock", "999")
            .with("priority", "High")
            .with("brand", "Acme");
        let e = CatalogEntry::from_record(rec).unwrap();
        assert!(!e.attributes.contains_key("current_stock"));
        assert!(!e.attributes.contains_key("priority"));
        assert_eq!(e.attributes.get("brand"), Some("Acme"));
    }

    #[test]
    fn from_record_rejects_missing_identity() {
        let rec = SourceRecord::new().with("title", "Orphan");
        assert!(CatalogEntry::from_record(rec).is_err());
    }

    #[test]
    fn new_master_product_has_empty_containers_and_zero_signals() {
        let p = MasterProduct::from_entry(entry("P1", None));
        assert!(p.inventory_movements().is_empty());
        assert!(p.performance_metrics().is_none());
        assert!(p.marketplace_snapshot().is_none());
        assert_eq!(p.current_stock(), 0);
        assert_eq!(p.sales_velocity(), 0);
        assert_eq!(p.id().as_str(), "P1");
    }

    #[test]
    fn internal_price_defaults_to_zero() {
        assert_eq!(MasterProduct::from_entry(entry("P1", None)).internal_price(), 0.0);
        assert_eq!(MasterProduct::from_entry(entry("P1", Some("abc"))).internal_price(), 0.0);
        assert_eq!(MasterProduct::from_entry(entry("P1", Some("99.5"))).internal_price(), 99.5);
    }

    #[test]
    fn setters_replace_one_to_one_associations() {
        let mut p = MasterProduct::from_entry(entry("P1", None));
        let first = SourceRecord::new().with(fields::PRICE_EROSION_RATE, "3");
        let second = SourceRecord::new().with(fields::PRICE_EROSION_RATE, "7.5");
        assert!(p.set_marketplace_snapshot(first.clone()).is_none());
        assert_eq!(p.set_marketplace_snapshot(second), Some(first));
        assert_eq!(p.snapshot_price_erosion(), Some(7.5));
    }

    #[test]
    fn serializes_attributes_flat() {
        let mut p = MasterProduct::from_entry(entry("P1", Some("100")));
        p.set_signals(5, 150);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["product_id"], "P1");
        assert_eq!(v["title"], "Widget");
        assert_eq!(v["suggested_retail"], "100");
        assert_eq!(v["current_stock"], 5);
        assert_eq!(v["sales_velocity"], 150);
        assert!(v["performance_metrics"].is_null());
        assert_eq!(v["inventory_movements"], serde_json::json!([]));
    }
}
