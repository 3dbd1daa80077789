use std::path::Path;

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use prodintel_core::SourceRecord;

use crate::normalizer::KeyNormalizer;
use crate::sources::LoadError;

/// Textual form of a JSON value as stored in a `SourceRecord`.
///
/// Scalars keep their literal text; nested values are re-serialized.
pub fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => serde_json::to_string(value).ok(),
    }
}

fn object_pairs(obj: &Map<String, JsonValue>) -> impl Iterator<Item = (&str, Option<String>)> + '_ {
    obj.iter().map(|(k, v)| (k.as_str(), scalar_text(v)))
}

/// Convert a JSON array of objects into normalized records.
pub fn records_from_array(value: &JsonValue, normalizer: &KeyNormalizer) -> Result<Vec<SourceRecord>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "expected a top-level array".to_string())?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object()
                .map(|obj| normalizer.normalize(object_pairs(obj)))
                .ok_or_else(|| format!("element {i} is not an object"))
        })
        .collect()
}

/// Flatten a marketplace snapshot document into per-product records.
///
/// Reads `platforms.amazon.products[]`: `asin` becomes the product id and
/// `best_seller_rank.{category,rank}` become `bsr_category` / `bsr_rank`.
/// A document without that shape yields no records.
pub fn flatten_marketplace_snapshot(value: &JsonValue, normalizer: &KeyNormalizer) -> Vec<SourceRecord> {
    let Some(products) = value
        .pointer("/platforms/amazon/products")
        .and_then(JsonValue::as_array)
    else {
        warn!("marketplace snapshot has no platforms.amazon.products array; skipping");
        return Vec::new();
    };

    products
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            let mut pairs: Vec<(&str, Option<String>)> = object_pairs(obj)
                .filter(|(k, _)| *k != "best_seller_rank")
                .collect();
            if let Some(bsr) = obj.get("best_seller_rank") {
                pairs.push(("bsr_category", bsr.get("category").and_then(scalar_text)));
                pairs.push(("bsr_rank", bsr.get("rank").and_then(scalar_text)));
            }
            normalizer.normalize(pairs)
        })
        .collect()
}

/// Read and parse a JSON file.
pub fn read_json_file(path: &Path) -> Result<JsonValue, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "json source loaded");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodintel_core::fields;
    use serde_json::json;

    #[test]
    fn scalar_text_keeps_literal_forms() {
        assert_eq!(scalar_text(&json!(12)), Some("12".to_string()));
        assert_eq!(scalar_text(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!({"a": 1})), Some(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn array_of_objects_becomes_records() {
        let v = json!([{"sku": "A", "ctr": 0.4}, {"item_code": "B", "ctr": null}]);
        let recs = records_from_array(&v, &KeyNormalizer::default()).unwrap();
        assert_eq!(recs[0].get(fields::PRODUCT_ID), Some("A"));
        assert_eq!(recs[0].get("ctr"), Some("0.4"));
        assert_eq!(recs[1].get(fields::PRODUCT_ID), Some("B"));
        assert_eq!(recs[1].get("ctr"), None);
    }

    #[test]
    fn non_array_is_rejected() {
        assert!(records_from_array(&json!({"sku": "A"}), &KeyNormalizer::default()).is_err());
        assert!(records_from_array(&json!([1]), &KeyNormalizer::default()).is_err());
    }

    #[test]
    fn flattens_marketplace_products() {
        let doc = json!({
            "platforms": {
                "amazon": {
                    "products": [
                        {
                            "asin": "B001",
                            "price_erosion_rate": 3.5,
                            "best_seller_rank": {"category": "Home", "rank": 42}
                        },
                        {"asin": "B002"}
                    ]
                }
            }
        });
        let recs = flatten_marketplace_snapshot(&doc, &KeyNormalizer::default());
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].get(fields::PRODUCT_ID), Some("B001"));
        assert_eq!(recs[0].get(fields::PRICE_EROSION_RATE), Some("3.5"));
        assert_eq!(recs[0].get("bsr_category"), Some("Home"));
        assert_eq!(recs[0].get("bsr_rank"), Some("42"));
        assert!(!recs[0].contains_key("best_seller_rank"));
        assert!(!recs[0].contains_key("asin"));
        assert!(!recs[1].contains_key("bsr_rank"));
    }

    #[test]
    fn integers_beyond_u64_keep_their_digits() {
        let doc: JsonValue = serde_json::from_str(
            r#"{"platforms":{"amazon":{"products":[
                {"asin":"B1","best_seller_rank":{"rank":123456789012345678901}}
            ]}}}"#,
        )
        .unwrap();
        let recs = flatten_marketplace_snapshot(&doc, &KeyNormalizer::default());
        assert_eq!(recs[0].get("bsr_rank"), Some("123456789012345678901"));
    }

    #[test]
    fn snapshot_without_expected_shape_is_empty() {
        let recs = flatten_marketplace_snapshot(&json!({"platforms": {}}), &KeyNormalizer::default());
        assert!(recs.is_empty());
    }
}
