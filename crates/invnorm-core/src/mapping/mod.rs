//! Vendor field-mapping configuration and resolution.

mod defaults;
mod field_mapping;
mod resolver;
mod store;

pub use defaults::DEFAULT_MAPPING;
pub use field_mapping::FieldMapping;
pub use resolver::resolve_mapping;
pub use store::{InMemoryMappingStore, MappingStore, VendorMappingRecord};
