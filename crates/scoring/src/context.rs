use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use prodintel_core::parse::parse_decimal;
use prodintel_products::MasterProduct;

/// Global competitor intelligence shared read-only by every classification.
///
/// Any JSON shape is accepted; only `market_signals.price_erosion_rate` is read.
/// An absent document is the empty context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorContext {
    raw: JsonValue,
}

impl CompetitorContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_value(raw: JsonValue) -> Self {
        Self { raw }
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.raw
    }

    /// Global erosion rate in percent; numbers and numeric strings are accepted.
    pub fn price_erosion_rate(&self) -> Option<f64> {
        let value = self.raw.get("market_signals")?.get("price_erosion_rate")?;
        match value {
            JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            JsonValue::String(s) => parse_decimal(s),
            _ => None,
        }
    }
}

/// Where the effective erosion rate came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErosionSource {
    Context,
    Snapshot,
    Default,
}

/// Resolve the erosion rate for one product.
///
/// Precedence: global context, then the product's marketplace snapshot, then 0.
pub fn resolve_price_erosion(context: &CompetitorContext, product: &MasterProduct) -> (f64, ErosionSource) {
    if let Some(rate) = context.price_erosion_rate() {
        return (rate, ErosionSource::Context);
    }
    if let Some(rate) = product.snapshot_price_erosion() {
        return (rate, ErosionSource::Snapshot);
    }
    (0.0, ErosionSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodintel_core::{SourceRecord, fields};
    use prodintel_products::CatalogEntry;
    use serde_json::json;

    fn product(snapshot_erosion: Option<&str>) -> MasterProduct {
        let entry =
            CatalogEntry::from_record(SourceRecord::new().with(fields::PRODUCT_ID, "P1")).unwrap();
        let mut p = MasterProduct::from_entry(entry);
        if let Some(rate) = snapshot_erosion {
            p.set_marketplace_snapshot(
                SourceRecord::new()
                    .with(fields::PRODUCT_ID, "P1")
                    .with(fields::PRICE_EROSION_RATE, rate),
            );
        }
        p
    }

    #[test]
    fn reads_numeric_and_string_rates() {
        let n = CompetitorContext::from_value(json!({"market_signals": {"price_erosion_rate": 4.5}}));
        assert_eq!(n.price_erosion_rate(), Some(4.5));
        let s = CompetitorContext::from_value(json!({"market_signals": {"price_erosion_rate": "12"}}));
        assert_eq!(s.price_erosion_rate(), Some(12.0));
    }

    #[test]
    fn structural_gaps_read_as_absent() {
        assert_eq!(CompetitorContext::empty().price_erosion_rate(), None);
        let no_signals = CompetitorContext::from_value(json!({"competitors": []}));
        assert_eq!(no_signals.price_erosion_rate(), None);
        let wrong_type = CompetitorContext::from_value(json!({"market_signals": {"price_erosion_rate": [1]}}));
        assert_eq!(wrong_type.price_erosion_rate(), None);
        let not_object = CompetitorContext::from_value(json!([1, 2]));
        assert_eq!(not_object.price_erosion_rate(), None);
    }

    #[test]
    fn precedence_context_then_snapshot_then_zero() {
        let ctx = CompetitorContext::from_value(json!({"market_signals": {"price_erosion_rate": 10}}));
        assert_eq!(resolve_price_erosion(&ctx, &product(Some("2"))), (10.0, ErosionSource::Context));

        let empty = CompetitorContext::empty();
        assert_eq!(resolve_price_erosion(&empty, &product(Some("2"))), (2.0, ErosionSource::Snapshot));
        assert_eq!(resolve_price_erosion(&empty, &product(Some("n/a"))), (0.0, ErosionSource::Default));
        assert_eq!(resolve_price_erosion(&empty, &product(None)), (0.0, ErosionSource::Default));
    }
}
