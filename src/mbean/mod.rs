//! Management resource access
//!
//! Resources live in a registry and are named by a domain plus key
//! properties (JMX object names). This module builds those names and
//! reads attributes from them.
//!
//! # Module Structure
//!
//! - [`properties`] - Key property tables built from parallel key/value lists
//! - [`name`] - Resource identifiers and the naming grammar
//! - [`value`] - Attribute values, including composite ones
//! - [`reader`] - The registry trait and best-effort attribute reads
//! - [`memory`] - Registry held in memory (tests, saved dumps)
//! - [`http`] - Registry client for a remote `/jmx` endpoint
//!
//! # Example
//!
//! ```ignore
//! use metric_probe::mbean::{build_identifier, build_key_value_table, read_attribute};
//!
//! async fn eden_usage(registry: &impl ResourceRegistry) -> Option<AttributeValue> {
//!     let table = build_key_value_table(&["type", "name"], &["MemoryPool", "G1 Eden Space"])?;
//!     let id = build_identifier("java.lang", table).ok()?;
//!     read_attribute(registry, &id, "Usage").await
//! }
//! ```

pub mod http;
pub mod memory;
pub mod name;
pub mod properties;
pub mod reader;
pub mod value;

pub use http::JmxHttpRegistry;
pub use memory::InMemoryRegistry;
pub use name::*;
pub use properties::{build_key_value_table, PropertyTable};
pub use reader::{
    calc_percentage, gc_collector_id, last_gc_duration, read_attribute, read_attribute_within,
    RegistryError, ResourceRegistry, BEAN_NAME_FIELD, GC_DURATION_ITEM, LAST_GC_INFO_ATTRIBUTE,
};
pub use value::{AttributeValue, CompositeValue};
