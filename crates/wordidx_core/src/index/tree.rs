//! Single-threaded arena B-tree. [`super::Index`] wraps it in a lock.

use super::node::{child_slot, Node, NodeId, Separator};
use super::IndexStats;
use crate::entry::WordEntry;
use crate::error::{CoreError, CoreResult};

/// Arena-backed multiway search tree keyed by token.
///
/// Nodes are never freed: splits only ever append to the arena, so every
/// arena slot is reachable from the root.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    height: usize,
    puts: usize,
    fan_out: usize,
}

impl Tree {
    pub(crate) fn new(fan_out: usize) -> Self {
        Self {
            nodes: vec![Node::Leaf(Vec::with_capacity(fan_out))],
            root: NodeId::new(0),
            height: 0,
            puts: 0,
            fan_out,
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn puts(&self) -> usize {
        self.puts
    }

    pub(crate) fn fan_out(&self) -> usize {
        self.fan_out
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    /// Returns the entry stored under `key`.
    pub(crate) fn find(&self, key: &str) -> Option<&WordEntry> {
        let mut id = self.root;
        loop {
            match self.node(id) {
                Node::Internal(separators) => id = separators[child_slot(separators, key)].child,
                Node::Leaf(entries) => {
                    return entries
                        .binary_search_by(|e| e.token().cmp(key))
                        .ok()
                        .map(|i| &entries[i]);
                }
            }
        }
    }

    /// Returns the entry stored under `key` for in-place update.
    pub(crate) fn find_mut(&mut self, key: &str) -> Option<&mut WordEntry> {
        let mut id = self.root;
        while let Node::Internal(separators) = self.node(id) {
            id = separators[child_slot(separators, key)].child;
        }
        match &mut self.nodes[id.index()] {
            Node::Leaf(entries) => match entries.binary_search_by(|e| e.token().cmp(key)) {
                Ok(i) => Some(&mut entries[i]),
                Err(_) => None,
            },
            Node::Internal(_) => None,
        }
    }

    /// Inserts `entry` at leaf level, replacing any entry with the same token.
    ///
    /// Overflowing nodes are split bottom-up along the descent path; a root
    /// split grows the tree by one level.
    pub(crate) fn insert(&mut self, entry: WordEntry) {
        self.puts += 1;

        let mut path: Vec<(NodeId, usize)> = Vec::with_capacity(self.height);
        let mut id = self.root;
        loop {
            match &mut self.nodes[id.index()] {
                Node::Internal(separators) => {
                    let slot = child_slot(separators, entry.token());
                    // Only the first slot can receive a key below its separator.
                    if entry.token() < separators[slot].key.as_str() {
                        separators[slot].key = entry.token().to_owned();
                    }
                    path.push((id, slot));
                    id = separators[slot].child;
                }
                Node::Leaf(entries) => {
                    match entries.binary_search_by(|e| e.token().cmp(entry.token())) {
                        Ok(i) => {
                            entries[i] = entry;
                            return;
                        }
                        Err(i) => entries.insert(i, entry),
                    }
                    break;
                }
            }
        }

        let mut sibling = self.split_if_full(id);
        while let Some(right) = sibling {
            match path.pop() {
                Some((parent, slot)) => {
                    let key = self.min_key(right);
                    match &mut self.nodes[parent.index()] {
                        Node::Internal(separators) => separators.insert(
                            slot + 1,
                            Separator {
                                key,
                                child: right,
                            },
                        ),
                        Node::Leaf(_) => unreachable!("descent path holds only internal nodes"),
                    }
                    sibling = self.split_if_full(parent);
                }
                None => {
                    self.grow_root(right);
                    sibling = None;
                }
            }
        }
    }

    /// Splits `id` if it reached the fan-out bound, returning the new right sibling.
    fn split_if_full(&mut self, id: NodeId) -> Option<NodeId> {
        if self.nodes[id.index()].len() < self.fan_out {
            return None;
        }
        let upper = self.nodes[id.index()].split_upper();
        Some(self.alloc(upper))
    }

    fn grow_root(&mut self, right: NodeId) {
        let left = self.root;
        let root = Node::Internal(vec![
            Separator {
                key: self.min_key(left),
                child: left,
            },
            Separator {
                key: self.min_key(right),
                child: right,
            },
        ]);
        self.root = self.alloc(root);
        self.height += 1;
    }

    fn min_key(&self, id: NodeId) -> String {
        self.node(id).first_key().unwrap_or_default().to_owned()
    }

    /// Arena-wide counters.
    pub(crate) fn stats(&self) -> IndexStats {
        let mut leaf_count = 0;
        let mut distinct_tokens = 0;
        for node in &self.nodes {
            if let Node::Leaf(entries) = node {
                leaf_count += 1;
                distinct_tokens += entries.len();
            }
        }
        IndexStats {
            puts: self.puts,
            distinct_tokens,
            height: self.height,
            node_count: self.nodes.len(),
            leaf_count,
        }
    }

    /// Checks every structural invariant.
    pub(crate) fn verify(&self) -> CoreResult<IndexStats> {
        let mut visited = 0;
        let root = self.node(self.root);
        if root.len() == 0 && (self.height != 0 || self.puts != 0) {
            return Err(CoreError::structural("empty root in a non-empty tree"));
        }
        self.verify_node(self.root, 0, None, None, &mut visited)?;
        if visited != self.nodes.len() {
            return Err(CoreError::structural(format!(
                "{} of {} arena nodes reachable from the root",
                visited,
                self.nodes.len()
            )));
        }
        Ok(self.stats())
    }

    /// Returns the smallest key of the subtree at `id`.
    fn verify_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<&str>,
        upper: Option<&str>,
        visited: &mut usize,
    ) -> CoreResult<Option<String>> {
        *visited += 1;
        let node = self.node(id);
        let is_root = id == self.root;

        if node.len() >= self.fan_out {
            return Err(CoreError::structural(format!(
                "node {} holds {} slots, fan-out is {}",
                id.index(),
                node.len(),
                self.fan_out
            )));
        }
        if node.len() == 0 && !is_root {
            return Err(CoreError::structural(format!("node {} is empty", id.index())));
        }

        let keys: Vec<&str> = match node {
            Node::Leaf(entries) => entries.iter().map(WordEntry::token).collect(),
            Node::Internal(separators) => separators.iter().map(|s| s.key.as_str()).collect(),
        };
        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CoreError::structural(format!(
                "node {} keys not strictly ascending",
                id.index()
            )));
        }
        if let (Some(lo), Some(first)) = (lower, keys.first()) {
            if *first < lo {
                return Err(CoreError::structural(format!(
                    "node {} key {first:?} below parent bound {lo:?}",
                    id.index()
                )));
            }
        }
        if let (Some(hi), Some(last)) = (upper, keys.last()) {
            if *last >= hi {
                return Err(CoreError::structural(format!(
                    "node {} key {last:?} not below parent bound {hi:?}",
                    id.index()
                )));
            }
        }

        match node {
            Node::Leaf(entries) => {
                if depth != self.height {
                    return Err(CoreError::structural(format!(
                        "leaf {} at depth {depth}, height is {}",
                        id.index(),
                        self.height
                    )));
                }
                if let Some(e) = entries.iter().find(|e| e.frequency() == 0) {
                    return Err(CoreError::structural(format!(
                        "entry {:?} has zero frequency",
                        e.token()
                    )));
                }
            }
            Node::Internal(separators) => {
                if depth >= self.height {
                    return Err(CoreError::structural(format!(
                        "internal node {} at depth {depth}, height is {}",
                        id.index(),
                        self.height
                    )));
                }
                for (i, sep) in separators.iter().enumerate() {
                    let hi = separators.get(i + 1).map(|s| s.key.as_str()).or(upper);
                    let min =
                        self.verify_node(sep.child, depth + 1, Some(sep.key.as_str()), hi, visited)?;
                    if min.as_deref() != Some(sep.key.as_str()) {
                        return Err(CoreError::structural(format!(
                            "separator {:?} in node {} differs from subtree minimum {:?}",
                            sep.key,
                            id.index(),
                            min
                        )));
                    }
                }
            }
        }

        Ok(keys.first().map(|k| (*k).to_owned()))
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}
