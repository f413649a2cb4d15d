//! Vendor mapping resolution.

use tracing::{debug, warn};

use super::{DEFAULT_MAPPING, FieldMapping, MappingStore};

/// Resolve the field mapping for a vendor.
///
/// Exact case-sensitive match first, then the first case-insensitive
/// match among active mappings. Any miss, parse failure, or store
/// failure degrades to the built-in default mapping; resolution never
/// fails the pipeline.
pub fn resolve_mapping(store: &dyn MappingStore, vendor_name: Option<&str>) -> FieldMapping {
    let name = match vendor_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            debug!("no vendor name, using default mapping");
            return DEFAULT_MAPPING.clone();
        }
    };

    let records = match store.active_mappings() {
        Ok(records) => records,
        Err(e) => {
            warn!("vendor mapping lookup failed for {name}: {e}, using default");
            return DEFAULT_MAPPING.clone();
        }
    };

    let record = records
        .iter()
        .find(|record| record.vendor_name == name)
        .or_else(|| {
            records
                .iter()
                .find(|record| record.vendor_name.to_lowercase() == name.to_lowercase())
        });

    let Some(record) = record else {
        debug!("no custom mapping for vendor {name}, using default");
        return DEFAULT_MAPPING.clone();
    };

    if record.field_mappings.trim().is_empty() {
        debug!("vendor mapping for {name} has no field mappings, using default");
        return DEFAULT_MAPPING.clone();
    }

    match FieldMapping::from_json(&record.field_mappings, record.regex_patterns.as_deref()) {
        Ok(mapping) => {
            debug!("using custom field mapping for vendor {name}");
            mapping
        }
        Err(e) => {
            warn!("invalid vendor mapping for {name}: {e}, using default");
            DEFAULT_MAPPING.clone()
        }
    }
}
