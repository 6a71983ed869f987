//! Parallel tree traversal.
//!
//! Both walks fork one task per child of an internal node and join the
//! results in child order, so the output is the in-order sequence no matter
//! how many workers run or in which order they finish.

use crate::config::Config;
use crate::entry::WordEntry;
use crate::error::{CoreError, CoreResult};
use crate::index::{Index, Node, NodeId, Tree};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Runs traversals on a dedicated, bounded worker pool.
#[derive(Debug)]
pub struct TraversalEngine {
    pool: ThreadPool,
}

impl TraversalEngine {
    /// Starts a pool sized by `config.worker_threads`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ThreadPool`] if the pool cannot be started.
    pub fn new(config: &Config) -> CoreResult<Self> {
        config.validate()?;
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("wordidx-worker-{i}"));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(|e| CoreError::ThreadPool {
            message: e.to_string(),
        })?;
        debug!(threads = pool.current_num_threads(), "traversal pool started");
        Ok(Self { pool })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside this engine's pool.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }

    /// All entries of `index` in ascending token order.
    #[must_use]
    pub fn flatten(&self, index: &Index) -> Vec<WordEntry> {
        let guard = index.read();
        let tree: &Tree = &guard;
        self.pool.install(|| flatten_tree(tree))
    }

    /// Encodes `index` as a tree blob.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a token is too long for the record format.
    pub fn serialize(&self, index: &Index) -> CoreResult<Vec<u8>> {
        let guard = index.read();
        let tree: &Tree = &guard;
        self.pool.install(|| serialize_tree(tree))
    }
}

pub(crate) fn flatten_tree(tree: &Tree) -> Vec<WordEntry> {
    flatten_node(tree, tree.root())
}

fn flatten_node(tree: &Tree, id: NodeId) -> Vec<WordEntry> {
    match tree.node(id) {
        Node::Leaf(entries) => entries.clone(),
        Node::Internal(separators) => separators
            .par_iter()
            .map(|sep| flatten_node(tree, sep.child))
            .collect::<Vec<_>>()
            .concat(),
    }
}

pub(crate) fn serialize_tree(tree: &Tree) -> CoreResult<Vec<u8>> {
    serialize_node(tree, tree.root())
}

fn serialize_node(tree: &Tree, id: NodeId) -> CoreResult<Vec<u8>> {
    match tree.node(id) {
        Node::Leaf(entries) => {
            let mut buf = Vec::new();
            for entry in entries {
                entry.encode_into(&mut buf)?;
            }
            Ok(buf)
        }
        // Internal nodes own no entries; their buffer is the children's in order.
        Node::Internal(separators) => Ok(separators
            .par_iter()
            .map(|sep| serialize_node(tree, sep.child))
            .collect::<CoreResult<Vec<_>>>()?
            .concat()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(n: usize) -> Index {
        let index = Index::new();
        for i in (0..n).rev() {
            index.add(&format!("w{i:04}")).unwrap();
        }
        index
    }

    #[test]
    fn flatten_is_in_order_for_any_pool_size() {
        let index = index_of(300);
        let expected: Vec<String> = (0..300).map(|i| format!("w{i:04}")).collect();
        for threads in [1, 2, 7] {
            let engine = TraversalEngine::new(&Config::new().worker_threads(threads)).unwrap();
            assert_eq!(engine.threads(), threads);
            let tokens: Vec<String> = engine
                .flatten(&index)
                .into_iter()
                .map(|e| e.token().to_string())
                .collect();
            assert_eq!(tokens, expected);
        }
    }

    #[test]
    fn serialize_matches_sequential_encoding() {
        let index = index_of(64);
        let mut expected = Vec::new();
        for entry in index.flatten() {
            entry.encode_into(&mut expected).unwrap();
        }
        let engine = TraversalEngine::new(&Config::new().worker_threads(3)).unwrap();
        assert_eq!(engine.serialize(&index).unwrap(), expected);
        assert_eq!(index.serialize_bytes().unwrap(), expected);
    }

    #[test]
    fn pool_threads_are_named() {
        let engine = TraversalEngine::new(&Config::new().worker_threads(1)).unwrap();
        let name = engine.install(|| std::thread::current().name().map(str::to_owned));
        assert_eq!(name.as_deref(), Some("wordidx-worker-0"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(TraversalEngine::new(&Config::new().worker_threads(0)).is_err());
    }
}
