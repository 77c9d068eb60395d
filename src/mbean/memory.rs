//! In-memory registry
//!
//! Holds a fixed set of resources. Used for tests and for reading a saved
//! `/jmx` dump instead of a live endpoint.

use super::name::ResourceIdentifier;
use super::reader::{RegistryError, ResourceRegistry, BEAN_NAME_FIELD};
use super::value::AttributeValue;
use serde_json::Value;
use std::collections::HashMap;

/// Registry backed by a map, keyed by canonical resource name
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    resources: HashMap<String, HashMap<String, AttributeValue>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `attribute` on the resource `id`, creating the resource if needed
    pub fn insert(&mut self, id: &ResourceIdentifier, attribute: &str, value: AttributeValue) {
        self.resources
            .entry(id.canonical_name())
            .or_default()
            .insert(attribute.to_string(), value);
    }

    /// Builder form of [`InMemoryRegistry::insert`]
    pub fn with_attribute(
        mut self,
        id: ResourceIdentifier,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.insert(&id, attribute, value.into());
        self
    }

    /// Register a resource that has no attributes
    pub fn add_resource(&mut self, id: &ResourceIdentifier) {
        self.resources.entry(id.canonical_name()).or_default();
    }

    pub fn contains(&self, id: &ResourceIdentifier) -> bool {
        self.resources.contains_key(&id.canonical_name())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Load a `{"beans": [{"name": "domain:k=v", ...}]}` dump.
    ///
    /// Every field of a bean other than `name` becomes an attribute. Beans
    /// without a parsable name are skipped.
    pub fn from_jmx_json(dump: &Value) -> Result<Self, RegistryError> {
        let beans = dump
            .get("beans")
            .and_then(|b| b.as_array())
            .ok_or_else(|| RegistryError::MalformedResponse("missing \"beans\" array".into()))?;

        let mut registry = Self::new();
        for bean in beans {
            let Some(fields) = bean.as_object() else {
                tracing::warn!("Skipping bean that is not an object");
                continue;
            };
            let Some(name) = fields.get(BEAN_NAME_FIELD).and_then(|n| n.as_str()) else {
                tracing::warn!("Skipping bean without a name");
                continue;
            };
            let id = match ResourceIdentifier::parse(name) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping bean {}: {}", name, e);
                    continue;
                }
            };

            registry.add_resource(&id);
            for (attribute, value) in fields {
                if attribute != BEAN_NAME_FIELD {
                    registry.insert(&id, attribute, AttributeValue::from(value));
                }
            }
        }

        tracing::debug!("Loaded {} beans from dump", registry.len());
        Ok(registry)
    }
}

impl ResourceRegistry for InMemoryRegistry {
    async fn try_read(
        &self,
        id: &ResourceIdentifier,
        attribute: &str,
    ) -> Result<Option<AttributeValue>, RegistryError> {
        Ok(self
            .resources
            .get(&id.canonical_name())
            .and_then(|attributes| attributes.get(attribute))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbean::read_attribute;
    use serde_json::json;

    fn dump() -> Value {
        json!({
            "beans": [
                {
                    "name": "java.lang:type=Memory",
                    "modelerType": "sun.management.MemoryImpl",
                    "HeapMemoryUsage": {"committed": 2048, "init": 1024, "max": 4096, "used": 900}
                },
                {
                    "name": "java.lang:type=GarbageCollector,name=G1 Young Generation",
                    "CollectionCount": 12,
                    "LastGcInfo": {"GcThreadCount": 4, "duration": 6, "id": 12}
                },
                {"name": "not a bean name"},
                {"modelerType": "nameless"}
            ]
        })
    }

    #[tokio::test]
    async fn test_from_jmx_json() {
        let registry = InMemoryRegistry::from_jmx_json(&dump()).unwrap();
        assert_eq!(registry.len(), 2);

        let memory = ResourceIdentifier::parse("java.lang:type=Memory").unwrap();
        let usage = read_attribute(&registry, &memory, "HeapMemoryUsage").await.unwrap();
        assert_eq!(usage.field("used"), Some(&AttributeValue::Integer(900)));
        assert!(read_attribute(&registry, &memory, "name").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_ignores_property_order() {
        let registry = InMemoryRegistry::from_jmx_json(&dump()).unwrap();
        let gc = ResourceIdentifier::parse("java.lang:name=G1 Young Generation,type=GarbageCollector")
            .unwrap();

        assert!(registry.contains(&gc));
        assert_eq!(
            read_attribute(&registry, &gc, "CollectionCount").await,
            Some(AttributeValue::Integer(12))
        );
    }

    #[test]
    fn test_rejects_dump_without_beans() {
        assert!(matches!(
            InMemoryRegistry::from_jmx_json(&json!({"items": []})),
            Err(RegistryError::MalformedResponse(_))
        ));
    }
}
