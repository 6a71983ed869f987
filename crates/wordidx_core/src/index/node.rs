//! Arena nodes.

use crate::entry::WordEntry;

/// Stable address of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// Routing entry of an internal node.
///
/// `key` is always the smallest token reachable through `child`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Separator {
    pub(crate) key: String,
    pub(crate) child: NodeId,
}

/// A tree node. Leaves hold entries, internal nodes hold separators.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf(Vec<WordEntry>),
    Internal(Vec<Separator>),
}

impl Node {
    /// Number of entries or children.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(entries) => entries.len(),
            Self::Internal(separators) => separators.len(),
        }
    }

    /// Smallest key stored directly in this node.
    pub(crate) fn first_key(&self) -> Option<&str> {
        match self {
            Self::Leaf(entries) => entries.first().map(WordEntry::token),
            Self::Internal(separators) => separators.first().map(|s| s.key.as_str()),
        }
    }

    /// Moves the upper half of this node into a new node.
    ///
    /// The lower ⌊n/2⌋ slots stay; the upper ⌈n/2⌉ are returned.
    pub(crate) fn split_upper(&mut self) -> Node {
        match self {
            Self::Leaf(entries) => {
                let mid = entries.len() / 2;
                Self::Leaf(entries.split_off(mid))
            }
            Self::Internal(separators) => {
                let mid = separators.len() / 2;
                Self::Internal(separators.split_off(mid))
            }
        }
    }
}

/// Index of the child whose range holds `key`: the last separator `<= key`,
/// or the first child if `key` sorts before every separator.
pub(crate) fn child_slot(separators: &[Separator], key: &str) -> usize {
    separators
        .partition_point(|s| s.key.as_str() <= key)
        .saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seps(keys: &[&str]) -> Vec<Separator> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| Separator {
                key: (*k).to_string(),
                child: NodeId::new(i),
            })
            .collect()
    }

    #[test]
    fn slot_picks_last_separator_not_above_key() {
        let s = seps(&["b", "f", "m"]);
        assert_eq!(child_slot(&s, "a"), 0);
        assert_eq!(child_slot(&s, "b"), 0);
        assert_eq!(child_slot(&s, "c"), 0);
        assert_eq!(child_slot(&s, "f"), 1);
        assert_eq!(child_slot(&s, "g"), 1);
        assert_eq!(child_slot(&s, "m"), 2);
        assert_eq!(child_slot(&s, "zzz"), 2);
    }

    #[test]
    fn split_keeps_lower_half() {
        let mut node = Node::Leaf(
            ["a", "b", "c", "d"].iter().map(|t| WordEntry::new(*t)).collect(),
        );
        let upper = node.split_upper();
        assert_eq!(node.len(), 2);
        assert_eq!(upper.len(), 2);
        assert_eq!(node.first_key(), Some("a"));
        assert_eq!(upper.first_key(), Some("c"));
    }

    #[test]
    fn odd_split_gives_upper_the_extra_slot() {
        let mut node = Node::Internal(seps(&["a", "b", "c", "d", "e"]));
        let upper = node.split_upper();
        assert_eq!(node.len(), 2);
        assert_eq!(upper.len(), 3);
    }
}
