//! Per-scope request configuration.
//!
//! Every facade operation can be customized at three scopes, narrowest
//! first: the call itself, the resource handle it runs on, and the client.
//! Each scope contributes an optional region override plus extra headers and
//! query parameters; the cascade that combines them lives in `silo-core`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

// ---------------------------------------------------------------------------
// ParamMap
// ---------------------------------------------------------------------------

/// An ordered multi-valued string map for extra headers and query
/// parameters.
///
/// Keys are compared verbatim; callers needing case-insensitive header
/// semantics normalize before inserting. Iteration is sorted by key with
/// values in insertion order, so merged output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ParamMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a key, keeping any existing values.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values under a key with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// Replace all values under a key.
    pub fn set_all(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    /// Remove a key and return its values if present.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(key)
    }

    /// The values recorded for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// The first value recorded for a key.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Whether any value is recorded for a key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, values)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Combine this map (the wider scope) with a narrower scope's map.
    ///
    /// Keys unique to either side survive. For keys present in both, the
    /// narrower side's values replace this map's values wholesale; values
    /// are never merged per-key.
    #[must_use]
    pub fn overlay(&self, narrower: &Self) -> Self {
        let mut merged = self.entries.clone();
        for (key, values) in &narrower.entries {
            merged.insert(key.clone(), values.clone());
        }
        Self { entries: merged }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ParamMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Scope configuration
// ---------------------------------------------------------------------------

/// One scope's worth of optional request configuration.
///
/// An empty `ScopeConfig` contributes nothing to the cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeConfig {
    /// Region override for this scope.
    #[builder(default, setter(strip_option, into))]
    pub region: Option<String>,
    /// Extra headers contributed by this scope.
    #[builder(default)]
    pub headers: ParamMap,
    /// Extra query parameters contributed by this scope.
    #[builder(default)]
    pub query: ParamMap,
}

impl ScopeConfig {
    /// Whether this scope contributes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.headers.is_empty() && self.query.is_empty()
    }
}

/// The effective configuration for one backend call, produced by cascading
/// the call, resource, and client scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedScope {
    /// The winning region, if any scope set one.
    pub region: Option<String>,
    /// Merged extra headers.
    pub headers: ParamMap,
    /// Merged extra query parameters.
    pub query: ParamMap,
}
