//! Resource identifiers
//!
//! A [`ResourceIdentifier`] names exactly one resource in a registry. Its
//! string form follows the JMX object name layout:
//! `domain:key1=value1,key2=value2`. Wildcard patterns and quoted values
//! are not accepted.

use super::properties::PropertyTable;
use std::fmt;
use thiserror::Error;

/// Platform MXBeans (memory, GC, threading, runtime)
pub const JAVA_LANG_DOMAIN: &str = "java.lang";
/// NIO buffer pools
pub const JAVA_NIO_DOMAIN: &str = "java.nio";
/// Vendor extensions such as the OS bean
pub const SUN_MGMT_DOMAIN: &str = "com.sun.management";
/// Hadoop/HBase service beans
pub const HADOOP_DOMAIN: &str = "Hadoop";

pub const TYPE_KEY: &str = "type";
pub const NAME_KEY: &str = "name";
pub const SERVICE_KEY: &str = "service";
pub const SUBSYSTEM_KEY: &str = "sub";

/// Characters that may not appear in a domain
const DOMAIN_RESERVED: &[char] = &[':', ',', '=', '*', '?', '\n'];
/// Characters that may not appear in a property key or unquoted value
const PROPERTY_RESERVED: &[char] = &[':', ',', '=', '*', '?', '"', '\n'];

/// Error raised when a domain or property table breaks the naming grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidIdentifierError {
    #[error("Domain must not be empty")]
    EmptyDomain,
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),
    #[error("Resource needs at least one key property")]
    EmptyProperties,
    #[error("Invalid property key: {0:?}")]
    InvalidKey(String),
    #[error("Invalid value for property {key:?}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Missing ':' between domain and properties in {0:?}")]
    MissingDomainSeparator(String),
    #[error("Malformed property {0:?}, expected key=value")]
    MalformedProperty(String),
    #[error("Property key {0:?} appears more than once")]
    DuplicateKey(String),
}

/// Domain plus key properties of a registry resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    domain: String,
    properties: PropertyTable,
}

impl ResourceIdentifier {
    /// Parse the `domain:key=value,...` string form
    pub fn parse(name: &str) -> Result<Self, InvalidIdentifierError> {
        let Some((domain, list)) = name.split_once(':') else {
            return Err(InvalidIdentifierError::MissingDomainSeparator(
                name.to_string(),
            ));
        };

        let mut properties = PropertyTable::new();
        if !list.is_empty() {
            for pair in list.split(',') {
                let Some((key, value)) = pair.split_once('=') else {
                    return Err(InvalidIdentifierError::MalformedProperty(pair.to_string()));
                };
                if properties.insert(key, value).is_some() {
                    return Err(InvalidIdentifierError::DuplicateKey(key.to_string()));
                }
            }
        }

        build_identifier(domain, properties)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Look up a single key property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// String form with keys sorted, identical for structurally equal identifiers
    pub fn canonical_name(&self) -> String {
        format_name(&self.domain, self.properties.iter_sorted())
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_name(&self.domain, self.properties.iter()))
    }
}

impl std::str::FromStr for ResourceIdentifier {
    type Err = InvalidIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn format_name<'a>(domain: &str, properties: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let list: Vec<String> = properties.map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}:{}", domain, list.join(","))
}

/// Validate `domain` and `properties` and combine them into an identifier
pub fn build_identifier(
    domain: &str,
    properties: PropertyTable,
) -> Result<ResourceIdentifier, InvalidIdentifierError> {
    if domain.is_empty() {
        return Err(InvalidIdentifierError::EmptyDomain);
    }
    if domain.contains(DOMAIN_RESERVED) {
        return Err(InvalidIdentifierError::InvalidDomain(domain.to_string()));
    }
    if properties.is_empty() {
        return Err(InvalidIdentifierError::EmptyProperties);
    }

    for (key, value) in properties.iter() {
        if key.is_empty() || key.contains(PROPERTY_RESERVED) {
            return Err(InvalidIdentifierError::InvalidKey(key.to_string()));
        }
        if value.is_empty() || value.contains(PROPERTY_RESERVED) {
            return Err(InvalidIdentifierError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    Ok(ResourceIdentifier {
        domain: domain.to_string(),
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbean::properties::build_key_value_table;

    fn memory_pool_table() -> PropertyTable {
        build_key_value_table(&["type", "name"], &["MemoryPool", "Par Eden Space"]).unwrap()
    }

    #[test]
    fn test_build_identifier() {
        let properties = memory_pool_table();
        let id = build_identifier(JAVA_LANG_DOMAIN, properties.clone()).unwrap();

        assert_eq!(id.domain(), JAVA_LANG_DOMAIN);
        assert_eq!(id.properties(), &properties);
        assert_eq!(id.property(NAME_KEY), Some("Par Eden Space"));
    }

    #[test]
    fn test_display_and_canonical_name() {
        let id = build_identifier(JAVA_LANG_DOMAIN, memory_pool_table()).unwrap();

        assert_eq!(id.to_string(), "java.lang:type=MemoryPool,name=Par Eden Space");
        assert_eq!(
            id.canonical_name(),
            "java.lang:name=Par Eden Space,type=MemoryPool"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let id = build_identifier(JAVA_LANG_DOMAIN, memory_pool_table()).unwrap();
        let parsed: ResourceIdentifier = "java.lang:name=Par Eden Space,type=MemoryPool"
            .parse()
            .unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_rejects_bad_domain() {
        assert_eq!(
            build_identifier("", memory_pool_table()),
            Err(InvalidIdentifierError::EmptyDomain)
        );
        assert!(matches!(
            build_identifier("java*", memory_pool_table()),
            Err(InvalidIdentifierError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_rejects_bad_properties() {
        assert_eq!(
            build_identifier(JAVA_LANG_DOMAIN, PropertyTable::new()),
            Err(InvalidIdentifierError::EmptyProperties)
        );

        let mut table = PropertyTable::new();
        table.insert("ty,pe", "Memory");
        assert!(matches!(
            build_identifier(JAVA_LANG_DOMAIN, table),
            Err(InvalidIdentifierError::InvalidKey(_))
        ));

        let mut table = PropertyTable::new();
        table.insert("type", "*");
        assert!(matches!(
            build_identifier(JAVA_LANG_DOMAIN, table),
            Err(InvalidIdentifierError::InvalidValue { .. })
        ));

        let mut table = PropertyTable::new();
        table.insert("type", "");
        assert!(matches!(
            build_identifier(JAVA_LANG_DOMAIN, table),
            Err(InvalidIdentifierError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ResourceIdentifier::parse("java.lang"),
            Err(InvalidIdentifierError::MissingDomainSeparator(_))
        ));
        assert!(matches!(
            ResourceIdentifier::parse("java.lang:type"),
            Err(InvalidIdentifierError::MalformedProperty(_))
        ));
        assert!(matches!(
            ResourceIdentifier::parse("java.lang:type=A,type=B"),
            Err(InvalidIdentifierError::DuplicateKey(_))
        ));
        assert_eq!(
            ResourceIdentifier::parse("java.lang:"),
            Err(InvalidIdentifierError::EmptyProperties)
        );
        assert!(ResourceIdentifier::parse("java.lang:type=*").is_err());
    }
}
