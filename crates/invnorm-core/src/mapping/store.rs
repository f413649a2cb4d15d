//! Vendor mapping store boundary.
//!
//! Persistence itself is a collaborator concern; the core only needs
//! "get all active mappings". The in-memory implementation backs the
//! CLI and tests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MappingError, Result, StoreError};

/// A stored vendor mapping, as the persistence collaborator exposes
/// it: the mapping bodies are JSON-encoded strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorMappingRecord {
    /// Unique vendor name. Case-sensitive for exact resolution,
    /// case-insensitive for fallback resolution.
    pub vendor_name: String,

    /// JSON-encoded field mappings (see [`FieldMapping::from_json`]).
    ///
    /// [`FieldMapping::from_json`]: super::FieldMapping::from_json
    pub field_mappings: String,

    /// JSON-encoded regex patterns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_patterns: Option<String>,

    /// Inactive mappings are invisible to resolution.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Read-only lookup contract for vendor mappings.
pub trait MappingStore {
    /// All active vendor mappings.
    fn active_mappings(&self) -> std::result::Result<Vec<VendorMappingRecord>, StoreError>;
}

/// Vec-backed mapping store with a unique-name constraint.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMappingStore {
    records: Vec<VendorMappingRecord>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, rejecting duplicate vendor names.
    pub fn insert(&mut self, record: VendorMappingRecord) -> std::result::Result<(), MappingError> {
        if self
            .records
            .iter()
            .any(|existing| existing.vendor_name == record.vendor_name)
        {
            return Err(MappingError::DuplicateVendor(record.vendor_name));
        }
        self.records.push(record);
        Ok(())
    }

    /// Every stored record, active or not.
    pub fn records(&self) -> &[VendorMappingRecord] {
        &self.records
    }

    /// Load a store from a JSON document: either a bare array of
    /// records or an object with a `vendor_mappings` array.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Value = serde_json::from_str(json)?;
        let records = match &parsed {
            Value::Object(map) if map.contains_key("vendor_mappings") => {
                map.get("vendor_mappings").cloned().unwrap_or(Value::Null)
            }
            _ => parsed,
        };
        let records: Vec<VendorMappingRecord> = serde_json::from_value(records)?;

        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Load a store from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl MappingStore for InMemoryMappingStore {
    fn active_mappings(&self) -> std::result::Result<Vec<VendorMappingRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.is_active)
            .cloned()
            .collect())
    }
}
