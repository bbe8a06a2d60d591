//! Document codec: the catalog as one pretty-printed JSON array.

use crate::domain::Catalog;
use crate::storage::StoreError;
use serde_json::Value as JsonValue;

/// Parses a catalog document.
///
/// Fails with `MalformedDocument` unless the bytes are a JSON array of objects
/// that each carry a non-negative integer `id`. Every other field is tolerated:
/// values that do not fit a typed slot, explicit nulls included, are kept
/// verbatim so `encode` writes them back unchanged.
pub fn decode(bytes: &[u8]) -> Result<Catalog, StoreError> {
    let value: JsonValue = serde_json::from_slice(bytes)
        .map_err(|e| StoreError::MalformedDocument(format!("invalid JSON: {}", e)))?;

    let items = match value {
        JsonValue::Array(items) => items,
        other => {
            return Err(StoreError::MalformedDocument(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut catalog = Catalog::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(StoreError::MalformedDocument(format!(
                "element {} is {}, expected an object",
                index,
                json_kind(&item)
            )));
        }
        let product = serde_json::from_value(item).map_err(|e| {
            StoreError::MalformedDocument(format!("element {}: {}", index, e))
        })?;
        catalog.push(product);
    }
    Ok(catalog)
}

/// Serializes the catalog as a pretty-printed JSON array.
pub fn encode(catalog: &Catalog) -> Result<Vec<u8>, StoreError> {
    let mut bytes = serde_json::to_vec_pretty(catalog).map_err(std::io::Error::from)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use serde_json::json;

    fn sample() -> Catalog {
        serde_json::from_value(json!([
            {
                "id": 1,
                "title": "Hammer",
                "price": 12,
                "category": "tools",
                "rating": {"rate": 4.5, "count": 120}
            },
            {
                "id": 2,
                "title": "Tent",
                "price": 109.95,
                "description": "Two person tent",
                "category": ["tools", "outdoor"],
                "imageUrl": "https://example.com/tent.png",
                "sku": "T-2"
            },
            {"id": 5, "title": "Pan", "price": 0}
        ]))
        .unwrap()
    }

    #[test]
    fn round_trip_keeps_mixed_categories_and_extra_fields() {
        let catalog = sample();
        let decoded = decode(&encode(&catalog).unwrap()).unwrap();
        assert_eq!(decoded, catalog);
        assert_eq!(decoded[0].category, Some(Category::Single("tools".into())));
        assert_eq!(
            decoded[1].category,
            Some(Category::Many(vec!["tools".into(), "outdoor".into()]))
        );
        assert_eq!(decoded[0].extra["rating"], json!({"rate": 4.5, "count": 120}));
        assert_eq!(decoded[1].extra["sku"], json!("T-2"));
    }

    #[test]
    fn integer_prices_stay_integers() {
        let text = String::from_utf8(encode(&sample()).unwrap()).unwrap();
        assert!(text.contains("\"price\": 12,"));
        assert!(text.contains("\"price\": 109.95,"));
        assert!(!text.contains("12.0"));
    }

    #[test]
    fn encode_is_pretty_printed() {
        let text = String::from_utf8(encode(&sample()).unwrap()).unwrap();
        assert!(text.starts_with("[\n  {"));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn empty_array_decodes_to_empty_catalog() {
        assert!(decode(b"[]").unwrap().is_empty());
        assert_eq!(encode(&Catalog::new()).unwrap(), b"[]\n");
    }

    #[test]
    fn rejects_non_arrays_and_non_objects() {
        for bad in [
            &b"{\"id\": 1}"[..],
            b"[1, 2]",
            b"[{\"id\": 1, \"title\": \"A\", \"price\": 1},",
            b"not json",
            b"[{\"title\": \"missing id\", \"price\": 1}]",
        ] {
            assert!(matches!(decode(bad), Err(StoreError::MalformedDocument(_))));
        }
    }

    #[test]
    fn legacy_records_decode_and_round_trip() {
        let doc = br#"[
            {"id": 1, "title": "A", "price": 1},
            {"id": 2, "title": "legacy"},
            {"id": 3, "title": "B", "price": "12", "description": null}
        ]"#;
        let catalog = decode(doc).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[1].price, None);
        assert_eq!(catalog[2].price, None);

        let written: JsonValue = serde_json::from_slice(&encode(&catalog).unwrap()).unwrap();
        let original: JsonValue = serde_json::from_slice(doc).unwrap();
        assert_eq!(written, original);
        assert_eq!(decode(&encode(&catalog).unwrap()).unwrap(), catalog);
    }
}
