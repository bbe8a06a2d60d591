//! Product records as they live in the shared catalog document.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

/// The full ordered collection of products persisted as one document.
pub type Catalog = Vec<Product>;

/// A product's category.
///
/// Existing documents mix a single label and a list of labels; both shapes are
/// kept exactly as written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Category {
    Single(String),
    Many(Vec<String>),
}

impl Category {
    /// Equality for a single label, membership for a list.
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Category::Single(value) => value == label,
            Category::Many(values) => values.iter().any(|v| v == label),
        }
    }

    /// A string or a list of strings; any other value is handed back unchanged.
    pub fn from_value(value: JsonValue) -> Result<Self, JsonValue> {
        match value {
            JsonValue::String(label) => Ok(Category::Single(label)),
            JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => Ok(Category::Many(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        JsonValue::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )),
            other => Err(other),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        match self {
            Category::Single(value) => vec![value.clone()],
            Category::Many(values) => values.clone(),
        }
    }
}

/// Keys with a typed slot on `Product`. A value of the wrong shape under one of
/// these keys is kept verbatim in `extra` instead.
const KNOWN_FIELDS: [&str; 5] = ["title", "price", "description", "category", "imageUrl"];

/// A stored product: the recognized fields plus every other field the caller sent.
///
/// Only `id` is required at rest. Records written by older tools may lack a
/// title or price, or hold them in another shape; such records still decode
/// and are rejected only when a write touches them.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Kept as the exact JSON number so `1` is not rewritten as `1.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl<'de> Deserialize<'de> for Product {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, JsonValue>::deserialize(deserializer)?;
        Product::from_fields(fields).map_err(de::Error::custom)
    }
}

impl Product {
    /// Sorts an object's fields into typed slots. Anything that does not fit a
    /// slot, explicit nulls included, stays in `extra` under its own key.
    fn from_fields(fields: Map<String, JsonValue>) -> Result<Self, String> {
        let mut product = Product {
            id: 0,
            title: None,
            price: None,
            description: None,
            category: None,
            image_url: None,
            extra: Map::new(),
        };
        let mut id = None;
        for (key, value) in fields {
            let leftover = match (key.as_str(), value) {
                ("id", JsonValue::Number(n)) => match n.as_u64() {
                    Some(v) => {
                        id = Some(v);
                        None
                    }
                    None => return Err(format!("id must be a non-negative integer, got {}", n)),
                },
                ("id", other) => return Err(format!("id must be a non-negative integer, got {}", other)),
                ("title", JsonValue::String(s)) => {
                    product.title = Some(s);
                    None
                }
                ("price", JsonValue::Number(n)) => {
                    product.price = Some(n);
                    None
                }
                ("description", JsonValue::String(s)) => {
                    product.description = Some(s);
                    None
                }
                ("imageUrl", JsonValue::String(s)) => {
                    product.image_url = Some(s);
                    None
                }
                ("category", value) => match Category::from_value(value) {
                    Ok(category) => {
                        product.category = Some(category);
                        None
                    }
                    Err(value) => Some(value),
                },
                (_, value) => Some(value),
            };
            if let Some(value) = leftover {
                product.extra.insert(key, value);
            }
        }
        product.id = id.ok_or_else(|| "missing field `id`".to_string())?;
        Ok(product)
    }

    pub fn in_category(&self, label: &str) -> bool {
        self.category.as_ref().is_some_and(|c| c.matches(label))
    }

    /// Builds a stored product from a validated draft and the id the store assigned.
    pub fn from_draft(id: u64, mut draft: Map<String, JsonValue>) -> Result<Self, String> {
        draft.insert("id".to_string(), JsonValue::from(id));
        let product = Product::from_fields(draft)?;
        product.validate()?;
        Ok(product)
    }

    /// Returns a copy with `patch` merged over the current fields.
    ///
    /// Fields absent from the patch are retained and `id` can never change.
    pub fn merged(&self, patch: &Map<String, JsonValue>) -> Result<Self, String> {
        let mut fields = match serde_json::to_value(self).map_err(|e| e.to_string())? {
            JsonValue::Object(map) => map,
            _ => return Err("product did not serialize to an object".to_string()),
        };
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
        // Optional fields set to null are dropped rather than stored as null.
        for key in ["description", "category", "imageUrl"] {
            if fields.get(key).is_some_and(JsonValue::is_null) {
                fields.remove(key);
            }
        }
        fields.insert("id".to_string(), JsonValue::from(self.id));
        let product = Product::from_fields(fields)?;
        product.validate()?;
        Ok(product)
    }

    /// Write-boundary check: a title, a non-negative price and well-formed
    /// optional fields.
    pub fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) if !title.trim().is_empty() => {}
            Some(_) => return Err("title must not be empty".to_string()),
            None => return Err("product must have a string title".to_string()),
        }
        match self.price.as_ref().and_then(Number::as_f64) {
            Some(p) if p >= 0.0 => {}
            _ => return Err("price must be a non-negative number".to_string()),
        }
        for key in KNOWN_FIELDS {
            if self.extra.get(key).is_some_and(|v| !v.is_null()) {
                return Err(format!("{} has an invalid value", key));
            }
        }
        Ok(())
    }
}

/// Checks a caller-supplied product before the store assigns it an id.
///
/// Returns the object fields with any caller-supplied `id` removed.
pub fn validate_draft(payload: &JsonValue) -> Result<Map<String, JsonValue>, String> {
    let obj = payload
        .as_object()
        .ok_or_else(|| "product must be a JSON object".to_string())?;

    match obj.get("title") {
        Some(JsonValue::String(t)) if !t.trim().is_empty() => {}
        Some(JsonValue::String(_)) => return Err("title must not be empty".to_string()),
        Some(_) => return Err("title must be a string".to_string()),
        None => return Err("product must have a title field".to_string()),
    }
    match obj.get("price") {
        Some(JsonValue::Number(n)) if n.as_f64().is_some_and(|p| p >= 0.0) => {}
        Some(JsonValue::Number(_)) => {
            return Err("price must be a non-negative number".to_string())
        }
        Some(_) => return Err("price must be a number".to_string()),
        None => return Err("product must have a price field".to_string()),
    }
    for key in ["description", "imageUrl"] {
        if let Some(v) = obj.get(key) {
            if !v.is_string() && !v.is_null() {
                return Err(format!("{} must be a string", key));
            }
        }
    }
    if let Some(category) = obj.get("category") {
        let ok = match category {
            JsonValue::String(_) | JsonValue::Null => true,
            JsonValue::Array(items) => items.iter().all(JsonValue::is_string),
            _ => false,
        };
        if !ok {
            return Err("category must be a string or a list of strings".to_string());
        }
    }

    let mut fields = obj.clone();
    fields.remove("id");
    for key in ["description", "category", "imageUrl"] {
        if fields.get(key).is_some_and(JsonValue::is_null) {
            fields.remove(key);
        }
    }
    Ok(fields)
}

/// Next free id: one past the largest id in the freshly read catalog, or 1 when empty.
///
/// `None` once the largest id is `u64::MAX`.
pub fn next_id(catalog: &[Product]) -> Option<u64> {
    match catalog.iter().map(|p| p.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}
