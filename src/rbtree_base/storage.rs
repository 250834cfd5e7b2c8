use std::fmt::Debug;

use super::{
    error::StorageError,
    node::{is_sentinel, Node, NodeId, BOUNDARY, NIL, SENTINEL_SLOTS},
};

/// Node storage capability used by the tree engine.
///
/// Slots `NIL` and `BOUNDARY` are reserved for the sentinel pair. They exist
/// from construction until the storage is dropped and are never returned by
/// `acquire`. Every other slot goes through
/// `acquire` -> `construct_key` -> `destroy_key` -> `release`.
pub trait NodeStorage<K>: Debug {
    fn new() -> Self;

    /// An empty storage configured like `self`.
    fn empty_like(&self) -> Self;

    fn acquire(&mut self) -> Result<NodeId, StorageError>;
    fn release(&mut self, id: NodeId);

    fn construct_key(&mut self, id: NodeId, key: K);
    fn destroy_key(&mut self, id: NodeId) -> Option<K>;

    fn node(&self, id: NodeId) -> &Node<K>;
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K>;

    /// Number of acquired, not yet released slots.
    fn live(&self) -> usize;
}

/// Growable arena with a free-list of released slots.
#[derive(Debug)]
pub struct ArenaStorage<K> {
    nodes: Vec<Node<K>>,
    free: Vec<NodeId>,
    limit: Option<usize>,
}

impl<K> ArenaStorage<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(SENTINEL_SLOTS));
        nodes.push(Node::sentinel(NIL));
        nodes.push(Node::sentinel(BOUNDARY));
        Self {
            nodes,
            free: Vec::new(),
            limit: None,
        }
    }

    /// Arena refusing to hold more than `limit` live key nodes. Slots are
    /// still grown on demand.
    pub fn with_limit(limit: usize) -> Self {
        let mut arena = Self::with_capacity(0);
        arena.limit = Some(limit);
        arena
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Total slots ever grown, sentinels included.
    pub fn slots(&self) -> usize {
        self.nodes.len()
    }
}

impl<K: Debug> NodeStorage<K> for ArenaStorage<K> {
    fn new() -> Self {
        Self::with_capacity(0)
    }

    fn empty_like(&self) -> Self {
        match self.limit {
            Some(limit) => Self::with_limit(limit),
            None => Self::new(),
        }
    }

    fn acquire(&mut self) -> Result<NodeId, StorageError> {
        if let Some(limit) = self.limit {
            if self.live() >= limit {
                return Err(StorageError::CapacityExhausted { limit });
            }
        }

        if let Some(id) = self.free.pop() {
            self.nodes[id] = Node::vacant();
            return Ok(id);
        }

        self.nodes.try_reserve(1)?;
        self.nodes.push(Node::vacant());
        Ok(self.nodes.len() - 1)
    }

    fn release(&mut self, id: NodeId) {
        debug_assert!(!is_sentinel(id), "sentinel slot {} released", id);
        debug_assert!(self.nodes[id].key.is_none(), "slot {} released with a live key", id);
        self.free.push(id);
    }

    #[inline]
    fn construct_key(&mut self, id: NodeId, key: K) {
        self.nodes[id].key = Some(key);
    }

    #[inline]
    fn destroy_key(&mut self, id: NodeId) -> Option<K> {
        self.nodes[id].key.take()
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.nodes[id]
    }

    fn live(&self) -> usize {
        self.nodes.len() - SENTINEL_SLOTS - self.free.len()
    }
}
