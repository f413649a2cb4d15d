//! Normalize stage: apply a resolved vendor mapping to an intermediate
//! document and emit the canonical invoice.

use serde_json::Value;
use tracing::debug;

use super::extract::{self, PROJECT_NUMBER_FALLBACK};
use super::locate;
use super::transform::{self, vendor_value_to_name};
use crate::mapping::{FieldMapping, MappingStore, resolve_mapping};
use crate::models::{CanonicalInvoice, CanonicalLineItem, IntermediateDocument};

/// Run the full pipeline: transform the raw extraction payload, then
/// normalize it against the vendor's mapping. Total; never fails.
pub fn process(raw: &Value, file_name: &str, store: &dyn MappingStore) -> CanonicalInvoice {
    let doc = transform::transform(raw, file_name);
    normalize(&doc, store)
}

/// Normalize an intermediate document into a canonical invoice.
///
/// The vendor mapping is resolved from the document's own vendor name,
/// so re-normalizing a stored document picks up mapping edits made
/// since the original run.
pub fn normalize(doc: &IntermediateDocument, store: &dyn MappingStore) -> CanonicalInvoice {
    let vendor_name = doc
        .vendor_name()
        .map(str::to_string)
        .or_else(|| doc.as_value().get("vendor").and_then(vendor_value_to_name));

    let mapping = resolve_mapping(store, vendor_name.as_deref());

    let mut invoice = CanonicalInvoice {
        vendor_name,
        ..CanonicalInvoice::empty()
    };

    apply_header_mappings(&mut invoice, doc.as_value(), &mapping);

    invoice.line_items = doc
        .line_items()
        .iter()
        .filter_map(|item| normalize_line_item(item, &mapping))
        .collect();

    invoice.raw_response = doc.to_value();
    invoice.error = doc.error().map(str::to_string);
    invoice
}

fn apply_header_mappings(invoice: &mut CanonicalInvoice, doc: &Value, mapping: &FieldMapping) {
    for (target, candidates) in &mapping.field_mappings {
        let Some(value) = locate::locate(doc, candidates) else {
            continue;
        };
        match target.as_str() {
            "invoice_number" => invoice.invoice_number = stringify(value),
            "invoice_date" => invoice.invoice_date = stringify(value),
            "due_date" => invoice.due_date = stringify(value),
            // First present candidate wins even when it fails to parse;
            // a later parseable candidate must not override it.
            "total_amount" => {
                invoice.total_amount = extract::coerce_amount(value).unwrap_or(0.0);
            }
            other => debug!("ignoring unknown header mapping target {other}"),
        }
    }
}

/// Normalize one raw line item. Non-object entries are dropped.
fn normalize_line_item(raw: &Value, mapping: &FieldMapping) -> Option<CanonicalLineItem> {
    if !raw.is_object() {
        debug!("skipping non-object line item");
        return None;
    }

    let mut item = CanonicalLineItem::default();
    let mut quantity = None;

    for (target, candidates) in &mapping.line_items {
        let Some(value) = locate::locate(raw, candidates) else {
            continue;
        };
        match target.as_str() {
            "description" => item.description = stringify(value).unwrap_or_default(),
            "project_number" => item.project_number = stringify(value).unwrap_or_default(),
            "project_name" => item.project_name = stringify(value).unwrap_or_default(),
            "activity_code" => item.activity_code = stringify(value).unwrap_or_default(),
            // A mapped-but-unparseable quantity is 0, not the 1.0
            // default reserved for items that carry no quantity at all.
            "quantity" => quantity = Some(extract::coerce_amount(value).unwrap_or(0.0)),
            "unit_price" => item.unit_price = extract::coerce_amount(value).unwrap_or(0.0),
            "amount" => item.amount = extract::coerce_amount(value).unwrap_or(0.0),
            "tax" => item.tax = extract::coerce_amount(value).unwrap_or(0.0),
            other => debug!("ignoring unknown line item mapping target {other}"),
        }
    }
    if let Some(quantity) = quantity {
        item.quantity = quantity;
    }

    backfill_from_description(&mut item, mapping);
    Some(item)
}

/// Fill still-empty string fields by running the mapping's regex
/// patterns over the description, then the built-in project number
/// fallback.
fn backfill_from_description(item: &mut CanonicalLineItem, mapping: &FieldMapping) {
    let description = item.description.clone();

    for (target, pattern) in &mapping.regex_patterns {
        let slot = match target.as_str() {
            "project_number" => &mut item.project_number,
            "project_name" => &mut item.project_name,
            "activity_code" => &mut item.activity_code,
            other => {
                debug!("ignoring regex pattern for unknown target {other}");
                continue;
            }
        };
        if slot.is_empty() {
            if let Some(found) = extract::extract_first(&description, pattern) {
                *slot = found;
            }
        }
    }

    if item.project_number.is_empty() {
        if let Some(found) = extract::extract_first(&description, &PROJECT_NUMBER_FALLBACK) {
            item.project_number = found;
        }
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{InMemoryMappingStore, VendorMappingRecord};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn empty_store() -> InMemoryMappingStore {
        InMemoryMappingStore::new()
    }

    #[test]
    fn test_default_mapping_end_to_end() {
        let raw = json!({
            "vendor_name": "Acme Industrial",
            "invoice_number": "INV-001",
            "invoice_date": "2024-05-01",
            "total_amount": "1000.50",
            "line_items": [
                {"description": "Labor PN: 4521", "quantity": 2, "rate": "75.00", "amount": 150}
            ]
        });
        let invoice = process(&raw, "inv.pdf", &empty_store());

        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme Industrial"));
        assert_eq!(invoice.invoice_number.as_deref(), Some("INV-001"));
        assert_eq!(invoice.total_amount, 1000.5);

        let item = &invoice.line_items[0];
        assert_eq!(item.description, "Labor PN: 4521");
        assert_eq!(item.project_number, "4521");
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.unit_price, 75.0);
        assert_eq!(item.amount, 150.0);
    }

    fn globex_store() -> InMemoryMappingStore {
        let mut store = empty_store();
        store
            .insert(VendorMappingRecord {
                vendor_name: "Globex".to_string(),
                field_mappings: r#"{
                    "invoice_number": ["ref_no"],
                    "line_items": {"description": ["work_done"], "amount": ["charge"]}
                }"#
                .to_string(),
                regex_patterns: None,
                is_active: true,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_custom_line_item_mapping_sees_raw_items() {
        // Line items pass through the transform stage verbatim, so
        // custom candidates match the provider's own keys.
        let raw = json!({
            "vendor_name": "Globex",
            "total": 500,
            "line_items": [{"work_done": "Install", "charge": 120, "amount": 999}]
        });
        let invoice = process(&raw, "inv.pdf", &globex_store());

        assert_eq!(invoice.line_items[0].description, "Install");
        assert_eq!(invoice.line_items[0].amount, 120.0);
        // The custom mapping carries no total_amount entry, so the
        // header value found by the transform stage is not read back.
        assert_eq!(invoice.total_amount, 0.0);
    }

    #[test]
    fn test_custom_header_mapping_on_stored_document() {
        // Re-normalizing a stored document applies custom header
        // candidates directly.
        let doc = IntermediateDocument::from_value(json!({
            "vendor_name": "Globex",
            "ref_no": "G-77",
            "invoice_number": "from-the-first-run"
        }));
        let invoice = normalize(&doc, &globex_store());
        assert_eq!(invoice.invoice_number.as_deref(), Some("G-77"));
    }

    #[test]
    fn test_custom_regex_backfill() {
        let mut store = empty_store();
        store
            .insert(VendorMappingRecord {
                vendor_name: "Initech".to_string(),
                field_mappings: r#"{"line_items": {"description": ["description"]}}"#.to_string(),
                regex_patterns: Some(r#"{"activity_code": "AC-(\\d+)"}"#.to_string()),
                is_active: true,
            })
            .unwrap();

        let raw = json!({
            "vendor_name": "Initech",
            "line_items": [{"description": "Maintenance AC-300 west wing"}]
        });
        let invoice = process(&raw, "inv.pdf", &store);
        assert_eq!(invoice.line_items[0].activity_code, "300");
    }

    #[test]
    fn test_quantity_default_vs_failed_coercion() {
        let raw = json!({
            "line_items": [
                {"description": "no quantity"},
                {"description": "bad quantity", "quantity": "N/A"}
            ]
        });
        let invoice = process(&raw, "inv.pdf", &empty_store());
        assert_eq!(invoice.line_items[0].quantity, 1.0);
        assert_eq!(invoice.line_items[1].quantity, 0.0);
    }

    #[test]
    fn test_directly_mapped_project_number_is_not_overwritten() {
        // Regex backfill only fills empty fields: a project number that
        // came from direct field mapping wins over both the mapping's
        // patterns and the hardcoded PN fallback.
        let raw = json!({
            "line_items": [
                {"description": "Labor PN: 4521", "project number": "9999"}
            ]
        });
        let invoice = process(&raw, "inv.pdf", &empty_store());
        assert_eq!(invoice.line_items[0].project_number, "9999");
    }

    #[test]
    fn test_totality_on_empty_and_deeply_nested_payloads() {
        let empty = process(&json!({}), "empty.pdf", &empty_store());
        assert!(empty.error.is_none());
        assert_eq!(empty.total_amount, 0.0);
        assert!(empty.line_items.is_empty());
        // The file-stem fallbacks still produce identifiers.
        assert_eq!(empty.vendor_name.as_deref(), Some("empty"));
        assert_eq!(empty.invoice_number.as_deref(), Some("empty"));

        let nested = process(
            &json!({"data": {"vendor": {"name": {"deep": ["junk"]}}, "total": {"amount": {"amount": 7}}}}),
            "deep.pdf",
            &empty_store(),
        );
        assert!(nested.error.is_none());
        // Malformed shapes degrade to defaults instead of failing.
        assert_eq!(nested.vendor_name.as_deref(), Some("deep"));
        assert_eq!(nested.total_amount, 7.0);
    }

    #[test]
    fn test_non_object_line_items_are_dropped() {
        let raw = json!({"line_items": [{"description": "ok"}, "stray", 42, null]});
        let invoice = process(&raw, "inv.pdf", &empty_store());
        assert_eq!(invoice.line_items.len(), 1);
    }

    #[test]
    fn test_vendor_from_nested_object() {
        let doc = IntermediateDocument::from_value(json!({"vendor": {"name": "Acme"}}));
        let invoice = normalize(&doc, &empty_store());
        assert_eq!(invoice.vendor_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_error_marker_is_carried_through() {
        let raw = json!("not an object");
        let invoice = process(&raw, "bad.pdf", &empty_store());
        assert!(invoice.error.is_some());
        assert_eq!(invoice.vendor_name, None);
        assert!(invoice.line_items.is_empty());
    }

    #[test]
    fn test_raw_response_retains_intermediate_document() {
        let raw = json!({"data": {"vendor_name": "Acme", "total": 10}});
        let invoice = process(&raw, "inv.pdf", &empty_store());
        assert_eq!(invoice.raw_response["vendor_name"], json!("Acme"));
        assert_eq!(invoice.raw_response["file_name"], json!("inv.pdf"));
    }

    #[test]
    fn test_first_total_candidate_wins_even_if_unparseable() {
        // "total_amount" precedes "total" in the default mapping, and a
        // present-but-unparseable value there must not be overridden.
        let raw = json!({"total_amount": "N/A", "total": 500});
        let doc = IntermediateDocument::from_value(raw);
        let invoice = normalize(&doc, &empty_store());
        assert_eq!(invoice.total_amount, 0.0);
    }
}
