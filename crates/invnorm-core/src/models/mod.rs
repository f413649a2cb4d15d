//! Data models for the normalization pipeline.

pub mod document;
pub mod invoice;

pub use document::IntermediateDocument;
pub use invoice::{CanonicalInvoice, CanonicalLineItem};
