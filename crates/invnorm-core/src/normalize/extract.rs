//! Regex fallback extraction and numeric coercion.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// Last-resort project number pattern, applied to line-item
    /// descriptions like "Labor PN: 4521" when nothing else matched.
    pub static ref PROJECT_NUMBER_FALLBACK: Regex = Regex::new(r"PN:?\s*(\d+)").unwrap();
}

/// First captured group of the first match of `pattern` in `text`.
/// Pure; patterns arrive pre-compiled, so there is no failure mode
/// beyond "no match".
pub fn extract_first(text: &str, pattern: &Regex) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Coerce a loosely typed value to a number. Strings are retried once
/// after stripping everything but digits and the decimal point, so
/// "$1,250.00" parses as 1250.0. Anything else is `None` and the
/// caller applies its documented default.
pub fn coerce_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            if let Ok(parsed) = s.trim().parse::<f64>() {
                return Some(parsed);
            }
            let stripped: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if stripped.is_empty() {
                None
            } else {
                stripped.parse().ok()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_first_capture_group() {
        let pattern = Regex::new(r"PN:?\s*(\d+)").unwrap();
        assert_eq!(
            extract_first("Labor PN: 4521 and more", &pattern),
            Some("4521".to_string())
        );
        assert_eq!(extract_first("no project here", &pattern), None);
        assert_eq!(extract_first("", &pattern), None);
    }

    #[test]
    fn test_coerce_plain_values() {
        assert_eq!(coerce_amount(&json!(500)), Some(500.0));
        assert_eq!(coerce_amount(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_amount(&json!("1000.50")), Some(1000.5));
    }

    #[test]
    fn test_coerce_strips_currency_noise() {
        assert_eq!(coerce_amount(&json!("$1,250.00")), Some(1250.0));
        assert_eq!(coerce_amount(&json!("1,000.50")), Some(1000.5));
        assert_eq!(coerce_amount(&json!("USD 99")), Some(99.0));
    }

    #[test]
    fn test_coerce_unparseable_is_none() {
        assert_eq!(coerce_amount(&json!("N/A")), None);
        assert_eq!(coerce_amount(&json!(null)), None);
        assert_eq!(coerce_amount(&json!({"amount": 5})), None);
        assert_eq!(coerce_amount(&json!(true)), None);
    }
}
