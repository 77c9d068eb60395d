//! JSON tree search
//!
//! Finds a named field anywhere inside a parsed JSON document. Metric
//! dumps (for example the output of a `/jmx` servlet) nest the values we
//! care about at arbitrary depth, inside objects and arrays alike.

use serde_json::Value;

/// Error produced when JSON text cannot be turned into a tree
pub type JsonError = serde_json::Error;

/// Parse JSON text into a tree, keeping object keys in document order
pub fn parse_json(text: &str) -> Result<Value, JsonError> {
    serde_json::from_str(text)
}

/// Search `root` for the first field named `field`.
///
/// The walk is pre-order and depth-first: an object that directly holds
/// `field` wins over anything nested below it, and children are visited
/// left to right (object keys in document order, array elements by
/// index). The value is returned as-is, so an array-valued field comes
/// back as the array node.
pub fn search_json<'a>(root: &'a Value, field: &str) -> Option<&'a Value> {
    match root {
        Value::Object(map) => {
            if let Some(found) = map.get(field) {
                return Some(found);
            }
            map.values().find_map(|child| search_json(child, field))
        }
        Value::Array(items) => items.iter().find_map(|child| search_json(child, field)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

/// Parse `text` and search it for `field`, returning an owned copy of the match
pub fn search_json_str(text: &str, field: &str) -> Result<Option<Value>, JsonError> {
    let tree = parse_json(text)?;
    Ok(search_json(&tree, field).cloned())
}
