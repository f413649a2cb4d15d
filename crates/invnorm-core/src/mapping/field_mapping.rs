//! Declarative field mapping: one priority-list data structure
//! consumed by one generic resolution function, instead of per-field
//! branching.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::MappingError;

/// A vendor-specific (or default) field mapping.
///
/// For each canonical target field, an ordered list of candidate
/// source names or dotted paths; earlier entries always win over later
/// ones. Regex patterns are applied against a line item's description
/// as a fallback when direct field lookup yields nothing.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    /// Canonical header field name -> candidate source names/paths.
    pub field_mappings: BTreeMap<String, Vec<String>>,

    /// Canonical line-item field name -> candidate source keys.
    pub line_items: BTreeMap<String, Vec<String>>,

    /// Canonical field name -> compiled fallback pattern. Compiled at
    /// load time so malformed patterns surface as configuration
    /// errors, never during extraction.
    pub regex_patterns: BTreeMap<String, Regex>,
}

impl FieldMapping {
    /// Parse a mapping from its stored JSON form.
    ///
    /// `field_mappings` is an object of candidate-list arrays, with
    /// line-item sub-mappings nested under the `"line_items"` key.
    /// An absent or invalid `regex_patterns` document degrades to an
    /// empty pattern table; an invalid individual pattern rejects the
    /// whole mapping.
    pub fn from_json(
        field_mappings: &str,
        regex_patterns: Option<&str>,
    ) -> Result<Self, MappingError> {
        let parsed: Value =
            serde_json::from_str(field_mappings).map_err(MappingError::InvalidJson)?;
        let object = parsed.as_object().ok_or(MappingError::NotAnObject)?;
        if object.is_empty() {
            return Err(MappingError::Empty);
        }

        let mut header = BTreeMap::new();
        let mut line_items = BTreeMap::new();

        for (target, candidates) in object {
            if target == "line_items" {
                let nested = candidates
                    .as_object()
                    .ok_or_else(|| MappingError::InvalidCandidates {
                        field: target.clone(),
                    })?;
                for (item_target, item_candidates) in nested {
                    line_items
                        .insert(item_target.clone(), candidate_list(item_target, item_candidates)?);
                }
            } else {
                header.insert(target.clone(), candidate_list(target, candidates)?);
            }
        }

        Ok(Self {
            field_mappings: header,
            line_items,
            regex_patterns: parse_patterns(regex_patterns)?,
        })
    }
}

fn candidate_list(field: &str, candidates: &Value) -> Result<Vec<String>, MappingError> {
    let array = candidates
        .as_array()
        .ok_or_else(|| MappingError::InvalidCandidates {
            field: field.to_string(),
        })?;

    array
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| MappingError::InvalidCandidates {
                    field: field.to_string(),
                })
        })
        .collect()
}

fn parse_patterns(regex_patterns: Option<&str>) -> Result<BTreeMap<String, Regex>, MappingError> {
    let Some(json) = regex_patterns.filter(|s| !s.trim().is_empty()) else {
        return Ok(BTreeMap::new());
    };

    let parsed: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            debug!("ignoring invalid regex_patterns JSON: {e}");
            return Ok(BTreeMap::new());
        }
    };
    let Some(object) = parsed.as_object() else {
        debug!("ignoring non-object regex_patterns");
        return Ok(BTreeMap::new());
    };

    let mut patterns = BTreeMap::new();
    for (field, pattern) in object {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| MappingError::InvalidPattern {
                field: field.clone(),
            })?;
        let compiled = Regex::new(pattern).map_err(|source| MappingError::InvalidRegex {
            field: field.clone(),
            pattern: pattern.to_string(),
            source,
        })?;
        patterns.insert(field.clone(), compiled);
    }
    Ok(patterns)
}
