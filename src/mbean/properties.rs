//! Key property tables
//!
//! A resource in the registry is named by a domain plus a table of key
//! properties, e.g. `type=GarbageCollector,name=G1 Young Generation`.

use indexmap::IndexMap;

/// Ordered key -> value table of resource properties.
///
/// Keys are unique. Iteration follows insertion order, equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    entries: IndexMap<String, String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, replacing the value of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate properties sorted by key
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self.iter().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        pairs.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

/// Build a property table from parallel key and value slices.
///
/// Returns `None` when either slice is empty or their lengths differ.
/// A repeated key keeps its first position but takes the last value.
pub fn build_key_value_table<K, V>(keys: &[K], values: &[V]) -> Option<PropertyTable>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if keys.is_empty() || values.is_empty() {
        tracing::debug!("Refusing to build property table from empty input");
        return None;
    }

    if keys.len() != values.len() {
        tracing::debug!(
            "Refusing to build property table: {} keys but {} values",
            keys.len(),
            values.len()
        );
        return None;
    }

    Some(
        keys.iter()
            .zip(values)
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect(),
    )
}
