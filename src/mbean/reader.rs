//! Best-effort attribute reads
//!
//! Metric exporters poll many attributes, and some of them will always be
//! missing (a collector that has not run yet, a bean that only exists on
//! some JVMs). [`read_attribute`] therefore never fails: a missing
//! resource, a missing attribute and an unreachable registry all come
//! back as `None`.

use super::name::{ResourceIdentifier, JAVA_LANG_DOMAIN, NAME_KEY, TYPE_KEY};
use super::properties::PropertyTable;
use super::value::AttributeValue;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Attribute of a garbage collector bean describing its most recent run
pub const LAST_GC_INFO_ATTRIBUTE: &str = "LastGcInfo";
/// Item of [`LAST_GC_INFO_ATTRIBUTE`] holding the pause length in milliseconds
pub const GC_DURATION_ITEM: &str = "duration";
/// Field the `/jmx` servlet adds to every bean with its object name; never an attribute
pub const BEAN_NAME_FIELD: &str = "name";

/// Failure to talk to a registry (as opposed to a resource being absent)
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
    #[error("Registry returned status {0}")]
    Status(u16),
    #[error("Malformed registry response: {0}")]
    MalformedResponse(String),
}

/// Source of resource attributes.
///
/// `Ok(None)` means the resource or the attribute does not exist; `Err`
/// is reserved for the registry itself misbehaving.
pub trait ResourceRegistry {
    fn try_read(
        &self,
        id: &ResourceIdentifier,
        attribute: &str,
    ) -> impl Future<Output = Result<Option<AttributeValue>, RegistryError>> + Send;
}

/// Read `attribute` of the resource named by `id`, or `None` if it is not available
pub async fn read_attribute<R: ResourceRegistry>(
    registry: &R,
    id: &ResourceIdentifier,
    attribute: &str,
) -> Option<AttributeValue> {
    match registry.try_read(id, attribute).await {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            tracing::debug!("Attribute {} not found on {}", attribute, id);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read {} from {}: {}", attribute, id, e);
            None
        }
    }
}

/// Same as [`read_attribute`], giving up after `timeout`
pub async fn read_attribute_within<R: ResourceRegistry>(
    registry: &R,
    id: &ResourceIdentifier,
    attribute: &str,
    timeout: Duration,
) -> Option<AttributeValue> {
    match tokio::time::timeout(timeout, read_attribute(registry, id, attribute)).await {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                "Reading {} from {} timed out after {:?}",
                attribute,
                id,
                timeout
            );
            None
        }
    }
}

/// Identifier of the platform garbage collector bean called `name`
pub fn gc_collector_id(name: &str) -> Result<ResourceIdentifier, super::InvalidIdentifierError> {
    let mut properties = PropertyTable::new();
    properties.insert(TYPE_KEY, "GarbageCollector");
    properties.insert(NAME_KEY, name);
    super::build_identifier(JAVA_LANG_DOMAIN, properties)
}

/// Duration in milliseconds of the last collection run by `collector`.
///
/// `None` when the collector has not run yet or the registry cannot tell.
pub async fn last_gc_duration<R: ResourceRegistry>(
    registry: &R,
    collector: &ResourceIdentifier,
) -> Option<u64> {
    let info = read_attribute(registry, collector, LAST_GC_INFO_ATTRIBUTE).await?;
    info.field(GC_DURATION_ITEM)?.as_u64()
}

/// `part` as a percentage of `total`, `None` when `total` is zero
pub fn calc_percentage(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(part as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbean::memory::InMemoryRegistry;
    use crate::mbean::value::CompositeValue;

    /// Registry that is never reachable
    struct DownRegistry;

    impl ResourceRegistry for DownRegistry {
        async fn try_read(
            &self,
            _id: &ResourceIdentifier,
            _attribute: &str,
        ) -> Result<Option<AttributeValue>, RegistryError> {
            Err(RegistryError::Unavailable("connection refused".to_string()))
        }
    }

    /// Registry that never answers
    struct StalledRegistry;

    impl ResourceRegistry for StalledRegistry {
        async fn try_read(
            &self,
            _id: &ResourceIdentifier,
            _attribute: &str,
        ) -> Result<Option<AttributeValue>, RegistryError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Some(AttributeValue::Null))
        }
    }

    fn young_gen() -> ResourceIdentifier {
        gc_collector_id("G1 Young Generation").unwrap()
    }

    #[tokio::test]
    async fn test_missing_attribute_returns_none() {
        let registry = InMemoryRegistry::new().with_attribute(
            young_gen(),
            "CollectionCount",
            AttributeValue::Integer(3),
        );

        assert!(read_attribute(&registry, &young_gen(), "LastGcInfo").await.is_none());
        assert_eq!(
            read_attribute(&registry, &young_gen(), "CollectionCount").await,
            Some(AttributeValue::Integer(3))
        );
    }

    #[tokio::test]
    async fn test_missing_resource_returns_none() {
        let registry = InMemoryRegistry::new();
        assert!(read_attribute(&registry, &young_gen(), "CollectionCount").await.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_registry_returns_none() {
        assert!(read_attribute(&DownRegistry, &young_gen(), "LastGcInfo").await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_returns_none() {
        let value = read_attribute_within(
            &StalledRegistry,
            &young_gen(),
            "LastGcInfo",
            Duration::from_millis(50),
        )
        .await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_last_gc_duration() {
        let info = CompositeValue::new()
            .with("id", 41_i64)
            .with("startTime", 120_034_i64)
            .with("duration", 18_i64);
        let registry = InMemoryRegistry::new().with_attribute(
            young_gen(),
            LAST_GC_INFO_ATTRIBUTE,
            AttributeValue::from(info),
        );

        assert_eq!(last_gc_duration(&registry, &young_gen()).await, Some(18));

        let old_gen = gc_collector_id("G1 Old Generation").unwrap();
        assert_eq!(last_gc_duration(&registry, &old_gen).await, None);
    }

    #[test]
    fn test_calc_percentage() {
        assert_eq!(calc_percentage(25, 100), Some(25.0));
        assert_eq!(calc_percentage(3, 0), None);
    }
}
