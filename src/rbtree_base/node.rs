/// Index of a node slot inside the tree's storage.
pub type NodeId = usize;

/// Absent-child terminator. Always black, never holds a key.
pub const NIL: NodeId = 0;

/// Sequence boundary. `left` tracks the maximum, `right` tracks the minimum,
/// and the node itself is the one-past-the-end position.
pub const BOUNDARY: NodeId = 1;

/// Number of slots every storage reserves for the sentinel pair.
pub const SENTINEL_SLOTS: usize = 2;

#[inline]
pub fn is_sentinel(id: NodeId) -> bool {
    id < SENTINEL_SLOTS
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node<K> {
    pub key: Option<K>,
    pub red: bool,
    pub parent: NodeId,
    pub left: NodeId,
    pub right: NodeId,
}

impl<K> Node<K> {
    /// Sentinel node: black, keyless, every link pointing at `link`.
    pub fn sentinel(link: NodeId) -> Self {
        Self {
            key: None,
            red: false,
            parent: link,
            left: link,
            right: link,
        }
    }

    /// Freshly acquired key slot, not linked anywhere yet.
    pub fn vacant() -> Self {
        Self {
            key: None,
            red: true,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }

    #[inline]
    pub fn child(&self, side: Side) -> NodeId {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub fn set_child(&mut self, side: Side, child: NodeId) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub fn key(&self) -> &K {
        match self.key.as_ref() {
            Some(key) => key,
            None => panic!("RBTree: key requested from a keyless node"),
        }
    }
}
