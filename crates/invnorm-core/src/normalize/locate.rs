//! Field locator: resolve a prioritized candidate list against a
//! loosely shaped document.
//!
//! Extraction providers disagree on field naming and nesting; this is
//! the single mechanism absorbing that variance without per-provider
//! branches.

use serde_json::Value;

/// Return the value at the first candidate that resolves to a present,
/// non-null, non-empty-string value. Earlier candidates always win.
pub fn locate<'a, S: AsRef<str>>(doc: &'a Value, candidates: &[S]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|candidate| lookup(doc, candidate.as_ref()))
}

/// Resolve a single candidate. Tried as a direct object key first;
/// when the key is absent and the candidate contains a `.`, as a
/// dotted nested path.
pub fn lookup<'a>(doc: &'a Value, candidate: &str) -> Option<&'a Value> {
    let found = match doc.get(candidate) {
        Some(value) => Some(value),
        None if candidate.contains('.') => traverse(doc, candidate),
        None => None,
    };
    found.filter(|value| is_present(value))
}

/// Descend a dotted path. A non-object mid-path is a miss, not an
/// error.
pub fn traverse<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Missing-vs-empty is not distinguished: null and the empty string
/// are both skipped.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
