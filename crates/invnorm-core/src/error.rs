//! Error types for the invnorm-core library.
//!
//! The transform and normalize stages themselves are total and return
//! no errors; these types cover the configuration surface (vendor
//! mapping JSON, regex patterns) and the mapping-store boundary.

use thiserror::Error;

/// Main error type for the invnorm library.
#[derive(Error, Debug)]
pub enum InvnormError {
    /// Vendor mapping configuration error.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Mapping store lookup error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in a stored vendor mapping. These are configuration errors:
/// the resolver logs them and degrades to the default mapping.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The stored `field_mappings` string is not valid JSON.
    #[error("field_mappings is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The stored `field_mappings` JSON is not an object.
    #[error("field_mappings must be a JSON object")]
    NotAnObject,

    /// The stored `field_mappings` object has no entries.
    #[error("field_mappings has no entries")]
    Empty,

    /// A candidate list is not an array of strings.
    #[error("candidate list for {field} must be an array of strings")]
    InvalidCandidates { field: String },

    /// A regex pattern is not a string.
    #[error("regex pattern for {field} must be a string")]
    InvalidPattern { field: String },

    /// A regex pattern does not compile.
    #[error("invalid regex for {field}: {pattern}")]
    InvalidRegex {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A mapping with this vendor name already exists in the store.
    #[error("vendor mapping for {0} already exists")]
    DuplicateVendor(String),
}

/// Errors from the mapping-store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be queried.
    #[error("mapping store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for the invnorm library.
pub type Result<T> = std::result::Result<T, InvnormError>;
