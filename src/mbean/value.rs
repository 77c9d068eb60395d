//! Attribute values read from a registry

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// A snapshot of one resource attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Counters above `i64::MAX` (e.g. unsigned 64-bit byte totals)
    Unsigned(u64),
    Float(f64),
    Text(String),
    /// Array or tabular attribute
    List(Vec<AttributeValue>),
    /// Structured attribute with named items
    Composite(CompositeValue),
}

/// Named items of a structured attribute, in the order the registry reported them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeValue {
    items: IndexMap<String, AttributeValue>,
}

impl CompositeValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.items.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.items.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl AttributeValue {
    /// Read a named item of a composite value, `None` for anything else
    pub fn field(&self, name: &str) -> Option<&AttributeValue> {
        match self {
            AttributeValue::Composite(composite) => composite.get(name),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            AttributeValue::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            AttributeValue::Unsigned(n) => i64::try_from(*n).ok(),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttributeValue::Integer(n) => u64::try_from(*n).ok(),
            AttributeValue::Unsigned(n) => Some(*n),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(n) => Some(*n as f64),
            AttributeValue::Unsigned(n) => Some(*n as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Convert back to JSON (composite items keep their order)
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Integer(n) => Value::from(*n),
            AttributeValue::Unsigned(n) => Value::from(*n),
            AttributeValue::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            AttributeValue::Text(s) => Value::String(s.clone()),
            AttributeValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            AttributeValue::Composite(composite) => Value::Object(
                composite
                    .items
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Integral numbers map to `Integer`, or `Unsigned` above `i64::MAX`;
/// everything else numeric becomes `Float`.
impl From<&Value> for AttributeValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    AttributeValue::Unsigned(u)
                } else {
                    AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => AttributeValue::Text(s.clone()),
            Value::Array(items) => AttributeValue::List(items.iter().map(Self::from).collect()),
            Value::Object(map) => AttributeValue::Composite(CompositeValue {
                items: map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect(),
            }),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Integer(n)
    }
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        AttributeValue::Unsigned(n)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<CompositeValue> for AttributeValue {
    fn from(composite: CompositeValue) -> Self {
        AttributeValue::Composite(composite)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_composite_field_access() {
        let info = AttributeValue::from(
            CompositeValue::new()
                .with("id", 12_i64)
                .with("duration", 7_i64)
                .with("GcThreadCount", 4_i64),
        );

        assert_eq!(info.field("duration").and_then(|d| d.as_i64()), Some(7));
        assert!(info.field("startTime").is_none());
        assert!(AttributeValue::from(7_i64).field("duration").is_none());
    }

    #[test]
    fn test_from_json_keeps_structure() {
        let value = AttributeValue::from(&json!({
            "committed": 1024,
            "used": 512.5,
            "pools": ["eden", "old"],
            "init": null
        }));

        let composite = value.as_composite().unwrap();
        assert_eq!(
            composite.keys().collect::<Vec<_>>(),
            vec!["committed", "used", "pools", "init"]
        );
        assert_eq!(value.field("committed"), Some(&AttributeValue::Integer(1024)));
        assert_eq!(value.field("used"), Some(&AttributeValue::Float(512.5)));
        assert!(matches!(value.field("pools"), Some(AttributeValue::List(items)) if items.len() == 2));
        assert!(value.field("init").unwrap().is_null());
    }

    #[test]
    fn test_to_json_round_trip() {
        let original = json!({"used": 10, "max": -1, "name": "heap"});
        assert_eq!(AttributeValue::from(&original).to_json(), original);
    }

    #[test]
    fn test_large_unsigned_keeps_precision() {
        let original = json!(18446744073709551615u64);
        let value = AttributeValue::from(&original);

        assert_eq!(value, AttributeValue::Unsigned(u64::MAX));
        assert_eq!(value.as_u64(), Some(u64::MAX));
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.to_json(), original);
        assert_eq!(value.to_string(), "18446744073709551615");
    }

    #[test]
    fn test_numeric_text_coercion() {
        let text = AttributeValue::from("1500");
        assert_eq!(text.as_i64(), Some(1500));
        assert_eq!(text.as_f64(), Some(1500.0));
        assert_eq!(AttributeValue::from("n/a").as_i64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AttributeValue::from("up").to_string(), "up");
        assert_eq!(AttributeValue::from(3_i64).to_string(), "3");
    }
}
