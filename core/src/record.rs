//! Catalog records as they arrive from a loader, and their normalization into
//! [`Document`]s.
//!
//! Every field is optional. Loosely typed source values are coerced on the way
//! in: text accepts strings or numbers, `price` accepts a number or a numeric
//! string, and size lists accept a single scalar or an array of scalars. The
//! legacy `image_url` is only kept when it is a non-empty string.
//! Values that cannot be coerced are treated as absent rather than failing the
//! record.

use crate::error::{EngineError, Result};
use crate::{DocId, Document};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub brand_store: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub material: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub sizes: Option<Vec<String>>,
    /// Legacy single-size field, folded into `sizes` when that is absent.
    #[serde(deserialize_with = "lenient_list")]
    pub size: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    pub image_urls: Option<Vec<String>>,
    /// Legacy single-image field, folded into `image_urls` when that is absent.
    #[serde(deserialize_with = "string_only")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub data_source: Option<String>,
}

impl RawRecord {
    pub fn new() -> Self { Self::default() }

    pub fn name(mut self, name: impl Into<String>) -> Self { self.name = Some(name.into()); self }
    pub fn description(mut self, description: impl Into<String>) -> Self { self.description = Some(description.into()); self }
    pub fn price(mut self, price: f64) -> Self { self.price = price.is_finite().then_some(price); self }
    pub fn category(mut self, category: impl Into<String>) -> Self { self.category = Some(category.into()); self }
    pub fn brand_store(mut self, brand: impl Into<String>) -> Self { self.brand_store = Some(brand.into()); self }
    pub fn material(mut self, material: impl Into<String>) -> Self { self.material = Some(material.into()); self }
    pub fn data_source(mut self, source: impl Into<String>) -> Self { self.data_source = Some(source.into()); self }
    pub fn image_url(mut self, url: impl Into<String>) -> Self { self.image_url = Some(url.into()); self }

    pub fn sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = Some(sizes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the legacy single `size` field.
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(vec![size.into()]);
        self
    }

    /// Normalize into a [`Document`] with the given id.
    pub fn into_document(self, doc_id: DocId) -> Document {
        let sizes = self.sizes.or(self.size).unwrap_or_default();
        let image_urls = self
            .image_urls
            .or_else(|| self.image_url.filter(|u| !u.is_empty()).map(|u| vec![u]))
            .unwrap_or_default();
        Document {
            doc_id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price,
            category: self.category,
            brand_store: self.brand_store,
            material: self.material,
            sizes,
            image_urls,
            data_source: self.data_source,
        }
    }
}

/// Convert a parsed JSON catalog into records.
///
/// The value must be an array whose elements are all objects. Field-level
/// problems never fail; shape problems fail the whole conversion.
pub fn records_from_value(value: Value) -> Result<Vec<RawRecord>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EngineError::malformed(format!(
                "catalog must be an array of records, got {}",
                kind_of(&other)
            )))
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(pos, item)| record_from_value(item).map_err(|e| match e {
            EngineError::MalformedInput(msg) => EngineError::malformed(format!("record {pos}: {msg}")),
            other => other,
        }))
        .collect()
}

/// Convert a single JSON object into a record.
pub fn record_from_value(value: Value) -> Result<RawRecord> {
    if !value.is_object() {
        return Err(EngineError::malformed(format!("expected an object, got {}", kind_of(&value))));
    }
    // lenient field deserializers accept any JSON value, so only the shape can fail
    Ok(serde_json::from_value(value)?)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_text(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(de)?))
}

fn string_only<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_price<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<f64>, D::Error> {
    let price = match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(price.filter(|p| p.is_finite()))
}

fn lenient_list<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => None,
        Value::Array(items) => Some(items.into_iter().filter_map(scalar_text).collect()),
        other => scalar_text(other).map(|s| vec![s]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_price() {
        let r = record_from_value(json!({"price": "49.90"})).unwrap();
        assert_eq!(r.price, Some(49.9));
        let r = record_from_value(json!({"price": "n/a"})).unwrap();
        assert_eq!(r.price, None);
        let r = record_from_value(json!({"price": ""})).unwrap();
        assert_eq!(r.price, None);
        let r = record_from_value(json!({"price": true})).unwrap();
        assert_eq!(r.price, None);
        let r = record_from_value(json!({"price": 12})).unwrap();
        assert_eq!(r.price, Some(12.0));
    }

    #[test]
    fn folds_legacy_fields() {
        let r = record_from_value(json!({"size": "M", "image_url": "a.png"})).unwrap();
        let d = r.into_document(3);
        assert_eq!(d.doc_id, 3);
        assert_eq!(d.sizes, vec!["M"]);
        assert_eq!(d.image_urls, vec!["a.png"]);
    }

    #[test]
    fn blank_legacy_image_is_not_folded() {
        for image_url in [json!(""), json!(0), json!(null), json!(false)] {
            let d = record_from_value(json!({"name": "Tee", "image_url": image_url.clone()})).unwrap().into_document(0);
            assert!(d.image_urls.is_empty(), "image_url {image_url} folded into {:?}", d.image_urls);
        }
        let d = RawRecord::new().image_url("").into_document(0);
        assert!(d.image_urls.is_empty());
    }

    #[test]
    fn plural_fields_win_over_legacy() {
        let r = record_from_value(json!({"sizes": ["S", 42], "size": "XL", "image_urls": [], "image_url": "a.png"})).unwrap();
        let d = r.into_document(0);
        assert_eq!(d.sizes, vec!["S", "42"]);
        assert!(d.image_urls.is_empty());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let d = record_from_value(json!({})).unwrap().into_document(0);
        assert_eq!(d.name, "");
        assert_eq!(d.description, "");
        assert_eq!(d.price, None);
        assert_eq!(d.category, None);
        assert!(d.sizes.is_empty());
    }

    #[test]
    fn rejects_non_array_catalog() {
        let err = records_from_value(json!({"items": []})).unwrap_err();
        assert!(matches!(err, EngineError::MalformedInput(_)));
    }

    #[test]
    fn rejects_non_object_record() {
        let err = records_from_value(json!([{"name": "ok"}, 7])).unwrap_err();
        match err {
            EngineError::MalformedInput(msg) => assert!(msg.starts_with("record 1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn builder_matches_deserialized() {
        let built = RawRecord::new().name("Tee").price(10.0).size("M");
        let parsed = record_from_value(json!({"name": "Tee", "price": 10, "size": "M"})).unwrap();
        assert_eq!(built, parsed);
    }
}
