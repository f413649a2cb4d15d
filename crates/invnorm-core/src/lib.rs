//! Core library for invoice normalization.
//!
//! This crate provides:
//! - Vendor field-mapping configuration with regex fallback patterns
//! - A transform stage that flattens provider-specific extraction
//!   payloads into a provider-agnostic intermediate document
//! - A normalize stage that maps the intermediate document onto the
//!   canonical invoice schema

pub mod error;
pub mod mapping;
pub mod models;
pub mod normalize;

pub use error::{InvnormError, MappingError, Result, StoreError};
pub use mapping::{
    DEFAULT_MAPPING, FieldMapping, InMemoryMappingStore, MappingStore, VendorMappingRecord,
    resolve_mapping,
};
pub use models::{CanonicalInvoice, CanonicalLineItem, IntermediateDocument};
pub use normalize::{normalize, process, transform};
