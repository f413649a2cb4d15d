//! Intermediate document: the provider-agnostic flattened form of an
//! extraction payload, produced once by the transform stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flattened extraction payload with best-effort top-level keys:
/// `vendor_name`, `invoice_number`, `invoice_date`, `due_date`,
/// `total_amount`, `line_items`, `file_name`, and an optional `error`
/// marker. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntermediateDocument {
    inner: Value,
}

impl IntermediateDocument {
    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Self {
            inner: Value::Object(fields),
        }
    }

    /// Wrap an already-transformed document (e.g. one stored alongside
    /// an invoice and re-normalized with a new vendor mapping).
    /// Non-object values are treated as empty documents.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => Self { inner: value },
            _ => Self {
                inner: Value::Object(Map::new()),
            },
        }
    }

    /// The document as a JSON value, for candidate-path lookup.
    pub fn as_value(&self) -> &Value {
        &self.inner
    }

    /// Clone the document into an owned value (audit copy).
    pub fn to_value(&self) -> Value {
        self.inner.clone()
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn vendor_name(&self) -> Option<&str> {
        self.str_field("vendor_name")
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.str_field("invoice_number")
    }

    pub fn invoice_date(&self) -> Option<&str> {
        self.str_field("invoice_date")
    }

    pub fn due_date(&self) -> Option<&str> {
        self.str_field("due_date")
    }

    pub fn total_amount(&self) -> f64 {
        self.inner
            .get("total_amount")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Raw line items, empty when none were found.
    pub fn line_items(&self) -> &[Value] {
        self.inner
            .get("line_items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn file_name(&self) -> &str {
        self.inner
            .get("file_name")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Error marker set when the raw payload was unusable.
    pub fn error(&self) -> Option<&str> {
        self.str_field("error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors_on_missing_fields() {
        let doc = IntermediateDocument::from_value(json!({}));
        assert_eq!(doc.vendor_name(), None);
        assert_eq!(doc.total_amount(), 0.0);
        assert!(doc.line_items().is_empty());
        assert_eq!(doc.file_name(), "");
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let doc = IntermediateDocument::from_value(json!([1, 2, 3]));
        assert!(doc.as_value().as_object().unwrap().is_empty());
    }

    #[test]
    fn test_empty_string_fields_read_as_absent() {
        let doc = IntermediateDocument::from_value(json!({"vendor_name": ""}));
        assert_eq!(doc.vendor_name(), None);
    }
}
