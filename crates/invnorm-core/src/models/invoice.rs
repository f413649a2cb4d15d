//! Canonical invoice models - the fixed output schema of the pipeline,
//! independent of which extraction provider produced the source data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized invoice with a stable shape.
///
/// Every field is always present and correctly typed, regardless of
/// how malformed the source extraction payload was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalInvoice {
    /// Vendor (supplier) name.
    pub vendor_name: Option<String>,

    /// Invoice number/identifier.
    pub invoice_number: Option<String>,

    /// Invoice date as reported by the provider (free-form string).
    pub invoice_date: Option<String>,

    /// Payment due date (free-form string).
    pub due_date: Option<String>,

    /// Invoice total. Always coerced to a number, 0.0 when absent or
    /// unparseable.
    #[serde(default)]
    pub total_amount: f64,

    /// Normalized line items, in source order.
    #[serde(default)]
    pub line_items: Vec<CanonicalLineItem>,

    /// The intermediate document this invoice was normalized from,
    /// retained for audit/debugging. Never used for display.
    #[serde(default)]
    pub raw_response: Value,

    /// Set when the raw extraction payload was fundamentally unusable
    /// and every field above is at its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CanonicalInvoice {
    /// Create an invoice with every field at its default.
    pub fn empty() -> Self {
        Self {
            vendor_name: None,
            invoice_number: None,
            invoice_date: None,
            due_date: None,
            total_amount: 0.0,
            line_items: Vec::new(),
            raw_response: Value::Null,
            error: None,
        }
    }
}

impl Default for CanonicalInvoice {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single normalized line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLineItem {
    /// Product/service description.
    #[serde(default)]
    pub description: String,

    /// Project number, mapped directly or extracted from the
    /// description via regex fallback.
    #[serde(default)]
    pub project_number: String,

    /// Project name.
    #[serde(default)]
    pub project_name: String,

    /// Activity/task code.
    #[serde(default)]
    pub activity_code: String,

    /// Quantity. Defaults to 1.0 when the source item carries none.
    #[serde(default = "default_quantity")]
    pub quantity: f64,

    /// Price per unit.
    #[serde(default)]
    pub unit_price: f64,

    /// Line total.
    #[serde(default)]
    pub amount: f64,

    /// Tax amount for this line.
    #[serde(default)]
    pub tax: f64,
}

fn default_quantity() -> f64 {
    1.0
}

impl Default for CanonicalLineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            project_number: String::new(),
            project_name: String::new(),
            activity_code: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
            amount: 0.0,
            tax: 0.0,
        }
    }
}
