//! Concurrent word-frequency index.
//!
//! An [`Index`] is a balanced multiway search tree from token to
//! [`WordEntry`]. Nodes live in an arena behind one `parking_lot::RwLock`:
//!
//! - `get`, `size`, `height`, `stats`, `verify` and traversal share the lock
//! - `put`, `add` and `add_all` hold it exclusively
//!
//! `add` looks the token up and inserts it inside a single exclusive hold,
//! so two concurrent `add`s of an absent token never both insert it.

mod node;
mod tree;

pub(crate) use node::{Node, NodeId};
pub(crate) use tree::Tree;

use crate::config::Config;
use crate::entry::{check_key, WordEntry};
use crate::error::CoreResult;
use crate::{tokenize, traversal};
use parking_lot::{RwLock, RwLockReadGuard};

/// Counters describing the shape of an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of `put` operations since creation.
    pub puts: usize,
    /// Number of distinct tokens stored.
    pub distinct_tokens: usize,
    /// Root-to-leaf edge count.
    pub height: usize,
    /// Nodes in the arena.
    pub node_count: usize,
    /// Leaf nodes in the arena.
    pub leaf_count: usize,
}

/// A thread-safe word-frequency tree.
///
/// # Example
///
/// ```
/// use wordidx_core::Index;
///
/// let index = Index::new();
/// for word in ["the", "fox", "the", "dog"] {
///     index.add(word).unwrap();
/// }
/// assert_eq!(index.get("the").unwrap().unwrap().frequency(), 2);
///
/// let flat: Vec<_> = index.flatten().into_iter().map(|e| e.into_parts()).collect();
/// assert_eq!(flat, vec![("dog".into(), 1), ("fox".into(), 1), ("the".into(), 2)]);
/// ```
#[derive(Debug)]
pub struct Index {
    tree: RwLock<Tree>,
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl Index {
    /// Creates an empty index with the default fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::from_tree(Tree::new(crate::config::DEFAULT_FAN_OUT))
    }

    /// Creates an empty index using `config.fan_out`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`](crate::CoreError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn with_config(config: &Config) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::from_tree(Tree::new(config.fan_out)))
    }

    /// Creates an empty index with the given fan-out.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`](crate::CoreError::InvalidConfig)
    /// if `fan_out` is below [`MIN_FAN_OUT`](crate::config::MIN_FAN_OUT).
    pub fn with_fan_out(fan_out: usize) -> CoreResult<Self> {
        Self::with_config(&Config::new().fan_out(fan_out))
    }

    /// Creates an empty index without validating `fan_out`.
    pub(crate) fn with_valid_fan_out(fan_out: usize) -> Self {
        Self::from_tree(Tree::new(fan_out))
    }

    fn from_tree(tree: Tree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read()
    }

    /// Looks up a token.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKey`](crate::CoreError::InvalidKey) for
    /// an empty token.
    pub fn get(&self, token: &str) -> CoreResult<Option<WordEntry>> {
        check_key(token)?;
        Ok(self.tree.read().find(token).cloned())
    }

    /// Inserts an entry under its token, replacing any existing entry.
    ///
    /// Every call counts towards [`size`](Self::size), including overwrites.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKey`](crate::CoreError::InvalidKey) if the
    /// entry's token is empty.
    pub fn put(&self, entry: WordEntry) -> CoreResult<()> {
        check_key(entry.token())?;
        self.tree.write().insert(entry);
        Ok(())
    }

    /// Counts one occurrence of `token`.
    ///
    /// Bumps the frequency of an existing entry in place, or inserts a new
    /// entry with frequency 1.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKey`](crate::CoreError::InvalidKey) for
    /// an empty token.
    pub fn add(&self, token: &str) -> CoreResult<()> {
        check_key(token)?;
        add_locked(&mut self.tree.write(), token);
        Ok(())
    }

    /// Counts one occurrence of each token under a single lock acquisition.
    ///
    /// Empty tokens are rejected up front; nothing is added in that case.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKey`](crate::CoreError::InvalidKey) if any
    /// token is empty.
    pub fn add_all<I, S>(&self, tokens: I) -> CoreResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        for token in &tokens {
            check_key(token.as_ref())?;
        }
        let mut tree = self.tree.write();
        for token in &tokens {
            add_locked(&mut tree, token.as_ref());
        }
        Ok(tokens.len())
    }

    /// Tokenizes `text` and adds every token. Returns the number added.
    pub fn add_text(&self, text: &str) -> usize {
        let mut tree = self.tree.write();
        let mut added = 0;
        for token in tokenize::tokens(text) {
            add_locked(&mut tree, &token);
            added += 1;
        }
        added
    }

    /// Number of `put` operations since creation.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tree.read().puts()
    }

    /// Number of edges from the root to any leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.read().height()
    }

    /// Returns true if nothing was ever put.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Node fan-out bound of this index.
    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.tree.read().fan_out()
    }

    /// Shape counters.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.tree.read().stats()
    }

    /// Walks the whole tree and checks its structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StructuralInvariant`](crate::CoreError::StructuralInvariant)
    /// describing the first violation found.
    pub fn verify(&self) -> CoreResult<()> {
        self.tree.read().verify().map(|_| ())
    }

    /// All entries in ascending token order, gathered in parallel on the
    /// ambient rayon pool.
    #[must_use]
    pub fn flatten(&self) -> Vec<WordEntry> {
        traversal::flatten_tree(&self.tree.read())
    }

    /// Encodes all entries as a tree blob, in ascending token order.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a token is too long for the record format.
    pub fn serialize_bytes(&self) -> CoreResult<Vec<u8>> {
        traversal::serialize_tree(&self.tree.read())
    }

    /// Rebuilds an index from a tree blob with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the first record error encountered.
    pub fn from_bytes(blob: &[u8]) -> CoreResult<Self> {
        crate::persistence::reconstruct(blob, &Config::default(), None)
    }
}

fn add_locked(tree: &mut Tree, token: &str) {
    match tree.find_mut(token) {
        Some(entry) => entry.increment(),
        None => tree.insert(WordEntry::new(token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::Arc;
    use std::thread;

    fn pairs(index: &Index) -> Vec<(String, u32)> {
        index.flatten().into_iter().map(WordEntry::into_parts).collect()
    }

    #[test]
    fn worked_example() {
        let index = Index::new();
        for w in ["the", "fox", "the", "dog"] {
            index.add(w).unwrap();
        }
        assert_eq!(
            pairs(&index),
            vec![
                ("dog".to_string(), 1),
                ("fox".to_string(), 1),
                ("the".to_string(), 2)
            ]
        );
        assert_eq!(index.size(), 3);
        assert_eq!(index.height(), 0);
        index.verify().unwrap();
    }

    #[test]
    fn empty_index() {
        let index = Index::new();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert!(index.flatten().is_empty());
        assert!(index.get("x").unwrap().is_none());
        assert!(index.serialize_bytes().unwrap().is_empty());
    }

    #[test]
    fn empty_key_rejected() {
        let index = Index::new();
        assert!(matches!(index.add(""), Err(CoreError::InvalidKey)));
        assert!(matches!(index.get(""), Err(CoreError::InvalidKey)));
        assert!(matches!(
            index.put(WordEntry::new("")),
            Err(CoreError::InvalidKey)
        ));
        assert!(matches!(
            index.add_all(["a", ""]),
            Err(CoreError::InvalidKey)
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn add_on_existing_does_not_grow_size() {
        let index = Index::new();
        index.add("x").unwrap();
        index.add("x").unwrap();
        index.add("x").unwrap();
        assert_eq!(index.size(), 1);
        assert_eq!(index.get("x").unwrap().unwrap().frequency(), 3);
    }

    #[test]
    fn put_overwrites_but_counts() {
        let index = Index::new();
        index.put(WordEntry::with_frequency("a", 5)).unwrap();
        index.put(WordEntry::with_frequency("a", 2)).unwrap();
        assert_eq!(index.size(), 2);
        assert_eq!(pairs(&index), vec![("a".to_string(), 2)]);
    }

    #[test]
    fn height_grows_with_distinct_keys() {
        let index = Index::new();
        for i in 0..3 {
            index.add(&format!("k{i}")).unwrap();
        }
        assert_eq!(index.height(), 0);
        index.add("k3").unwrap();
        assert_eq!(index.height(), 1);
        for i in 4..100 {
            index.add(&format!("k{i:02}")).unwrap();
        }
        assert!(index.height() >= 3);
        index.verify().unwrap();
        let stats = index.stats();
        assert_eq!(stats.distinct_tokens, 100);
        assert_eq!(stats.puts, 100);
    }

    #[test]
    fn add_text_normalizes() {
        let index = Index::new();
        assert_eq!(index.add_text("The fox, the DOG! 42"), 4);
        assert_eq!(index.get("the").unwrap().unwrap().frequency(), 2);
        assert!(index.get("42").unwrap().is_none());
    }

    #[test]
    fn concurrent_adds_on_one_key() {
        let index = Arc::new(Index::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for _ in 0..500 {
                        index.add("x").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(index.get("x").unwrap().unwrap().frequency(), 4000);
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn rejects_small_fan_out() {
        assert!(matches!(
            Index::with_fan_out(2),
            Err(CoreError::InvalidConfig { .. })
        ));
        assert_eq!(Index::with_fan_out(9).unwrap().fan_out(), 9);
    }
}
