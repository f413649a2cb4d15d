//! Transform stage: flatten a provider-specific extraction payload
//! into the provider-agnostic intermediate document.
//!
//! Provider field names are not contractually stable, so the candidate
//! tables here are deliberately broad: flat keys, one-level-nested
//! paths, and camelCase variants.

use std::path::Path;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::extract::coerce_amount;
use super::locate;
use crate::models::IntermediateDocument;

/// Wrapper keys providers nest their real content under.
const ENVELOPE_KEYS: &[&str] = &["data", "document", "invoice", "results", "content", "extraction"];

const VENDOR_CANDIDATES: &[&str] = &[
    "vendor_name",
    "vendor",
    "vendorName",
    "supplier",
    "supplier_name",
    "supplierName",
    "seller",
    "seller_name",
    "merchant",
    "merchant_name",
    "from_company",
    "company",
    "company_name",
    "vendor.name",
    "supplier.name",
    "seller.name",
];

const INVOICE_NUMBER_CANDIDATES: &[&str] = &[
    "invoice_number",
    "invoiceNumber",
    "invoice_id",
    "invoiceId",
    "invoice_no",
    "number",
    "document_number",
    "documentNumber",
    "bill_number",
    "reference_number",
    "reference",
    "id",
];

const INVOICE_DATE_CANDIDATES: &[&str] = &[
    "invoice_date",
    "invoiceDate",
    "date",
    "issue_date",
    "issueDate",
    "issued",
    "date_issued",
    "bill_date",
    "billDate",
    "document_date",
    "documentDate",
    "created",
];

const DUE_DATE_CANDIDATES: &[&str] = &[
    "due_date",
    "dueDate",
    "payment_due",
    "payment_due_date",
    "paymentDueDate",
    "due",
    "payment_date",
    "paymentDate",
    "terms_due_date",
    "due_by",
    "dueBy",
    "expiry_date",
];

const TOTAL_AMOUNT_CANDIDATES: &[&str] = &[
    "total_amount",
    "totalAmount",
    "total",
    "amount",
    "grand_total",
    "grandTotal",
    "amount_due",
    "amountDue",
    "balance_due",
    "balanceDue",
    "invoice_total",
    "invoiceTotal",
    "total_due",
    "gross_amount",
];

const LINE_ITEM_CANDIDATES: &[&str] = &[
    "line_items",
    "lineItems",
    "items",
    "lines",
    "invoice_items",
    "invoiceItems",
    "products",
    "services",
    "details",
    "entries",
    "rows",
    "item_list",
];

/// Free-text fields worth scanning when structured vendor fields are
/// silent.
const FULL_TEXT_KEYS: &[&str] = &["text", "full_text", "fullText", "content", "markdown", "raw_text"];

/// Positional column semantics for line items salvaged from tables.
const TABLE_COLUMNS: &[&str] = &["description", "quantity", "unit_price", "amount", "tax"];

/// Flatten a raw extraction payload into an intermediate document.
///
/// Total: always returns a well-formed document. A payload that is not
/// a JSON object yields a document with every field at its default and
/// the `error` marker set.
pub fn transform(raw: &Value, file_name: &str) -> IntermediateDocument {
    if !raw.is_object() {
        warn!("raw extraction for {file_name} is not a JSON object");
        return error_document(file_name, "raw extraction payload is not a JSON object");
    }

    let doc = unwrap_envelope(raw);
    let stem = file_stem(file_name);

    let vendor_name = vendor_name_from(doc)
        .or_else(|| vendor_name_from_text(doc))
        .or_else(|| (!stem.is_empty()).then(|| stem.to_string()));

    let invoice_number = locate::locate(doc, INVOICE_NUMBER_CANDIDATES)
        .and_then(stringify)
        .or_else(|| (!stem.is_empty()).then(|| stem.to_string()));

    let invoice_date = locate::locate(doc, INVOICE_DATE_CANDIDATES).and_then(stringify);
    let due_date = locate::locate(doc, DUE_DATE_CANDIDATES).and_then(stringify);

    let total_amount = locate::locate(doc, TOTAL_AMOUNT_CANDIDATES)
        .map(amount_from)
        .unwrap_or(0.0);

    let line_items = LINE_ITEM_CANDIDATES
        .iter()
        .find_map(|key| locate::lookup(doc, key).and_then(Value::as_array).cloned())
        .unwrap_or_else(|| {
            let salvaged = salvage_from_tables(doc);
            if !salvaged.is_empty() {
                debug!("salvaged {} line items from tables for {file_name}", salvaged.len());
            }
            salvaged
        });

    let mut fields = Map::new();
    fields.insert("vendor_name".to_string(), opt_string(&vendor_name));
    // Mirror under vendor.name so dotted-path candidates resolve.
    fields.insert(
        "vendor".to_string(),
        match &vendor_name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        },
    );
    fields.insert("invoice_number".to_string(), opt_string(&invoice_number));
    fields.insert("invoice_date".to_string(), opt_string(&invoice_date));
    fields.insert("due_date".to_string(), opt_string(&due_date));
    fields.insert("total_amount".to_string(), json!(total_amount));
    fields.insert("line_items".to_string(), Value::Array(line_items));
    fields.insert("file_name".to_string(), Value::String(file_name.to_string()));

    IntermediateDocument::from_map(fields)
}

fn error_document(file_name: &str, message: &str) -> IntermediateDocument {
    let mut fields = Map::new();
    fields.insert("vendor_name".to_string(), Value::Null);
    fields.insert("vendor".to_string(), json!({}));
    fields.insert("invoice_number".to_string(), Value::Null);
    fields.insert("invoice_date".to_string(), Value::Null);
    fields.insert("due_date".to_string(), Value::Null);
    fields.insert("total_amount".to_string(), json!(0.0));
    fields.insert("line_items".to_string(), Value::Array(Vec::new()));
    fields.insert("file_name".to_string(), Value::String(file_name.to_string()));
    fields.insert("error".to_string(), Value::String(message.to_string()));
    IntermediateDocument::from_map(fields)
}

/// Descend one level under the first envelope key whose value is a
/// non-empty object.
fn unwrap_envelope(raw: &Value) -> &Value {
    for key in ENVELOPE_KEYS {
        if let Some(inner) = raw.get(key) {
            if inner.as_object().is_some_and(|map| !map.is_empty()) {
                debug!("unwrapping provider envelope key '{key}'");
                return inner;
            }
        }
    }
    raw
}

fn vendor_name_from(doc: &Value) -> Option<String> {
    VENDOR_CANDIDATES.iter().find_map(|key| {
        let value = locate::lookup(doc, key)?;
        vendor_value_to_name(value)
    })
}

/// A vendor field may be a bare string or an object with a `name`.
pub(crate) fn vendor_value_to_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// First non-empty line of any full-text field.
fn vendor_name_from_text(doc: &Value) -> Option<String> {
    FULL_TEXT_KEYS.iter().find_map(|key| {
        let text = doc.get(key)?.as_str()?;
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    })
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn opt_string(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

/// Normalize a located amount value: unwrap `{amount: ...}` money
/// objects, strip currency noise from strings, default to 0 on any
/// parse failure.
fn amount_from(value: &Value) -> f64 {
    match value {
        Value::Object(map) => map.get("amount").map(amount_from).unwrap_or(0.0),
        _ => coerce_amount(value).unwrap_or(0.0),
    }
}

/// Rebuild line items from a `tables` structure when no list was found
/// at the expected paths. The first row is treated as a header; the
/// remaining rows map positionally onto [`TABLE_COLUMNS`].
fn salvage_from_tables(doc: &Value) -> Vec<Value> {
    let Some(tables) = locate::lookup(doc, "tables").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for table in tables {
        let rows = match table {
            Value::Array(rows) => rows,
            Value::Object(map) => match map.get("rows").and_then(Value::as_array) {
                Some(rows) => rows,
                None => continue,
            },
            _ => continue,
        };

        for row in rows.iter().skip(1) {
            let Some(cells) = row.as_array() else {
                continue;
            };
            let mut item = Map::new();
            for (index, field) in TABLE_COLUMNS.iter().enumerate() {
                if let Some(cell) = cells.get(index) {
                    if locate::is_present(cell) {
                        item.insert(field.to_string(), cell.clone());
                    }
                }
            }
            if !item.is_empty() {
                items.push(Value::Object(item));
            }
        }
    }
    items
}

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}
