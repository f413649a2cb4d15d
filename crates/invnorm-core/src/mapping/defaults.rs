//! Built-in default field mapping.
//!
//! Used whenever no active vendor mapping matches. Immutable: the
//! resolver hands out clones, never a mutated copy.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::FieldMapping;

fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(target, candidates)| {
            (
                target.to_string(),
                candidates.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect()
}

lazy_static! {
    /// Generic header and line-item synonym tables, plus the built-in
    /// project-number and activity-code description patterns. Each
    /// header list leads with the canonical field name itself so
    /// values the transform stage already canonicalized are found.
    pub static ref DEFAULT_MAPPING: FieldMapping = FieldMapping {
        field_mappings: table(&[
            (
                "invoice_number",
                &[
                    "invoice_number",
                    "invoice #",
                    "invoice no",
                    "bill number",
                    "bill #",
                    "reference number",
                ],
            ),
            (
                "invoice_date",
                &["invoice_date", "date", "invoice date", "bill date", "issue date"],
            ),
            (
                "due_date",
                &["due_date", "due date", "payment due", "due by", "payment due date"],
            ),
            (
                "total_amount",
                &[
                    "total_amount",
                    "total",
                    "total amount",
                    "amount due",
                    "balance due",
                    "grand total",
                    "invoice total",
                ],
            ),
        ]),
        line_items: table(&[
            (
                "description",
                &["description", "item", "service", "product", "details"],
            ),
            (
                "project_number",
                &["project number", "project #", "project", "job number", "job #", "job code"],
            ),
            (
                "project_name",
                &["project name", "job name", "job", "project description"],
            ),
            (
                "activity_code",
                &["activity code", "code", "activity", "task code", "service code"],
            ),
            ("quantity", &["quantity", "qty", "units", "hours", "count"]),
            (
                "unit_price",
                &["unit price", "rate", "unit cost", "price", "cost", "price per unit"],
            ),
            (
                "amount",
                &["amount", "total", "line total", "extended", "subtotal", "line amount"],
            ),
            ("tax", &["tax", "vat", "gst", "sales tax", "tax amount"]),
        ]),
        regex_patterns: {
            let mut patterns = BTreeMap::new();
            patterns.insert(
                "project_number".to_string(),
                Regex::new(r"(?:Project|PN|Job)\s*(?:Number|#|No\.?|ID)?\s*[:=\s]\s*([A-Z0-9-]+)")
                    .unwrap(),
            );
            patterns.insert(
                "activity_code".to_string(),
                Regex::new(r"(?:Activity|Task)\s*(?:Code|#|No\.?)?\s*[:=\s]\s*([A-Z0-9-]+)")
                    .unwrap(),
            );
            patterns
        },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_covers_all_canonical_fields() {
        for field in ["invoice_number", "invoice_date", "due_date", "total_amount"] {
            assert!(DEFAULT_MAPPING.field_mappings.contains_key(field));
        }
        for field in [
            "description",
            "project_number",
            "project_name",
            "activity_code",
            "quantity",
            "unit_price",
            "amount",
            "tax",
        ] {
            assert!(DEFAULT_MAPPING.line_items.contains_key(field));
        }
    }

    #[test]
    fn test_header_candidates_lead_with_canonical_name() {
        for (target, candidates) in &DEFAULT_MAPPING.field_mappings {
            assert_eq!(&candidates[0], target);
        }
    }

    #[test]
    fn test_builtin_project_number_pattern() {
        let pattern = &DEFAULT_MAPPING.regex_patterns["project_number"];
        let caps = pattern.captures("Consulting services Project Number: AB-1042").unwrap();
        assert_eq!(&caps[1], "AB-1042");
    }
}
