//! Ordered query-string parameters.
//!
//! HTTP query strings arrive as an ordered sequence of `key=value` pairs. We
//! keep them in that order so predicate construction is deterministic, and
//! collapse repeated keys to their first occurrence the same way a
//! single-valued query map would.

use std::collections::HashSet;

/// Ordered, de-duplicated `(key, value)` pairs taken from one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Build from raw pairs in transport order. Later duplicates of a key are dropped.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| seen.insert(k.clone()))
            .collect();
        Self { pairs }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Keys starting with `prefix`, with the prefix removed, in original order.
    ///
    /// Used by the nested-collection query mode to split `collection_*` and
    /// `subcollection_*` parameters into independent filter maps.
    pub fn scoped(&self, prefix: &str) -> QueryParams {
        QueryParams::new(
            self.pairs
                .iter()
                .filter_map(|(k, v)| k.strip_prefix(prefix).map(|rest| (rest, v.as_str()))),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        QueryParams::new(iter)
    }
}
