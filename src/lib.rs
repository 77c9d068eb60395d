//! Metric introspection helpers
//!
//! Locates metric values in two kinds of sources:
//!
//! - [`mbean`] - a registry of management resources (JMX-style object
//!   names, attributes and composite attributes)
//! - [`json`] - arbitrary JSON documents, searched depth-first for a field

pub mod config;
pub mod json;
pub mod mbean;

pub use json::{parse_json, search_json, search_json_str, JsonError};
