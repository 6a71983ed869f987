//! Per-document indexes, keyed by url.

use crate::config::Config;
use crate::error::CoreResult;
use crate::index::Index;
use crate::persistence::{self, LoadReport};
use std::collections::btree_map::{self, BTreeMap};

/// A set of indexes, one per document.
///
/// Iteration is in ascending url order, which is also the order sections
/// are written in. The collection itself is not synchronized; each
/// [`Index`] inside it is.
#[derive(Debug)]
pub struct IndexCollection {
    documents: BTreeMap<String, Index>,
    fan_out: usize,
}

impl Default for IndexCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexCollection {
    /// Creates an empty collection whose new documents use the default fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
            fan_out: crate::config::DEFAULT_FAN_OUT,
        }
    }

    /// Creates an empty collection whose new documents use `config.fan_out`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`](crate::CoreError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn with_config(config: &Config) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            documents: BTreeMap::new(),
            fan_out: config.fan_out,
        })
    }

    /// Adds or replaces a document's index, returning the previous one.
    pub fn insert(&mut self, url: impl Into<String>, index: Index) -> Option<Index> {
        self.documents.insert(url.into(), index)
    }

    /// Returns the index for `url`, creating an empty one if needed.
    pub fn document(&mut self, url: &str) -> &Index {
        let fan_out = self.fan_out;
        self.documents
            .entry(url.to_owned())
            .or_insert_with(|| Index::with_valid_fan_out(fan_out))
    }

    /// Returns the index for `url`.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&Index> {
        self.documents.get(url)
    }

    /// Removes a document.
    pub fn remove(&mut self, url: &str) -> Option<Index> {
        self.documents.remove(url)
    }

    /// Returns true if `url` has an index.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.documents.contains_key(url)
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if there are no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in ascending url order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Index> {
        self.documents.iter()
    }

    /// Urls in ascending order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Encodes the whole collection as a container.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a url or tree exceeds its length field.
    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        persistence::encode_collection(self)
    }

    /// Decodes a container with the default configuration.
    ///
    /// # Errors
    ///
    /// Fails on container damage, or on the first damaged record.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        Self::from_bytes_with(bytes, &Config::default()).map(|(collection, _)| collection)
    }

    /// Decodes a container, applying `config`'s record policy and deadline.
    ///
    /// # Errors
    ///
    /// See [`persistence::decode_collection`].
    pub fn from_bytes_with(bytes: &[u8], config: &Config) -> CoreResult<(Self, LoadReport)> {
        persistence::decode_collection(bytes, config)
    }
}

impl<'a> IntoIterator for &'a IndexCollection {
    type Item = (&'a String, &'a Index);
    type IntoIter = btree_map::Iter<'a, String, Index>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for IndexCollection {
    type Item = (String, Index);
    type IntoIter = btree_map::IntoIter<String, Index>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

impl FromIterator<(String, Index)> for IndexCollection {
    fn from_iter<T: IntoIterator<Item = (String, Index)>>(iter: T) -> Self {
        let mut collection = Self::new();
        collection.documents.extend(iter);
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_url_order() {
        let mut collection = IndexCollection::new();
        for url in ["c.org", "a.com", "b.net"] {
            collection.document(url).add("x").unwrap();
        }
        let urls: Vec<&str> = collection.urls().collect();
        assert_eq!(urls, vec!["a.com", "b.net", "c.org"]);
    }

    #[test]
    fn document_is_reused() {
        let mut collection = IndexCollection::new();
        collection.document("a").add("x").unwrap();
        collection.document("a").add("x").unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.get("a").unwrap().get("x").unwrap().unwrap().frequency(),
            2
        );
    }

    #[test]
    fn new_documents_take_configured_fan_out() {
        let mut collection = IndexCollection::with_config(&Config::new().fan_out(6)).unwrap();
        assert_eq!(collection.document("a").fan_out(), 6);
        assert!(IndexCollection::with_config(&Config::new().fan_out(1)).is_err());
    }

    #[test]
    fn bytes_round_trip() {
        let mut collection = IndexCollection::new();
        collection.document("a.com").add_text("cat cat");
        collection.document("b.com").add_text("dog");
        let bytes = collection.to_bytes().unwrap();
        let loaded = IndexCollection::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.to_bytes().unwrap(), bytes);
        assert!(loaded.contains("b.com"));
    }
}
