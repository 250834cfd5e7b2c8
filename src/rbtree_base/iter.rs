use std::{fmt::Debug, iter::FusedIterator};

use super::{
    node::{NodeId, BOUNDARY},
    rbtree::RBTree,
    rbtree_traits::RBTreeParams,
};

/// Opaque handle to a slot in one tree: a key node, or `end()`.
///
/// A position stays valid across insertions and across erasure of other
/// keys. Once its own key is erased the slot may be reused by a later
/// insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position(pub(crate) NodeId);

pub trait TreeIterator<T: RBTreeParams>: Clone + Debug {
    fn key(&self) -> Option<&T::KeyType>;
    fn forward(&mut self) -> &mut Self;
    fn backward(&mut self) -> &mut Self;
    fn equals(&self, other: &Self) -> bool;
}

pub struct RBTreeIterator<'a, T: RBTreeParams> {
    tree: &'a RBTree<T>,
    node: NodeId,
}

impl<'a, T: RBTreeParams> RBTreeIterator<'a, T> {
    pub(crate) fn new(tree: &'a RBTree<T>, node: NodeId) -> Self {
        Self { tree, node }
    }

    pub fn position(&self) -> Position {
        Position(self.node)
    }
}

impl<T: RBTreeParams> Clone for RBTreeIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            node: self.node,
        }
    }
}

impl<T: RBTreeParams> Debug for RBTreeIterator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RBTreeIterator")
            .field("node", &self.node)
            .field("key", &self.key())
            .finish()
    }
}

impl<T: RBTreeParams> TreeIterator<T> for RBTreeIterator<'_, T> {
    #[inline]
    fn key(&self) -> Option<&T::KeyType> {
        self.tree.key_at(Position(self.node))
    }

    fn forward(&mut self) -> &mut Self {
        self.node = self.tree.successor(self.node);
        self
    }

    fn backward(&mut self) -> &mut Self {
        self.node = self.tree.predecessor(self.node);
        self
    }

    fn equals(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

/// Cursor walking from the maximum down. It refers to the key just before
/// its base position, so `rbegin()` has base `end()` and `rend()` has base
/// `begin()`.
pub struct RBTreeReverseIterator<'a, T: RBTreeParams> {
    tree: &'a RBTree<T>,
    base: NodeId,
}

impl<'a, T: RBTreeParams> RBTreeReverseIterator<'a, T> {
    pub(crate) fn new(tree: &'a RBTree<T>, base: NodeId) -> Self {
        Self { tree, base }
    }

    pub fn base(&self) -> Position {
        Position(self.base)
    }
}

impl<T: RBTreeParams> Clone for RBTreeReverseIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            base: self.base,
        }
    }
}

impl<T: RBTreeParams> Debug for RBTreeReverseIterator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RBTreeReverseIterator")
            .field("base", &self.base)
            .field("key", &self.key())
            .finish()
    }
}

impl<T: RBTreeParams> TreeIterator<T> for RBTreeReverseIterator<'_, T> {
    fn key(&self) -> Option<&T::KeyType> {
        self.tree.key_at(Position(self.tree.predecessor(self.base)))
    }

    fn forward(&mut self) -> &mut Self {
        self.base = self.tree.predecessor(self.base);
        self
    }

    fn backward(&mut self) -> &mut Self {
        self.base = self.tree.successor(self.base);
        self
    }

    fn equals(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.base == other.base
    }
}

/// Keys of the half-open position range `[front, back)` in order.
pub struct Iter<'a, T: RBTreeParams> {
    tree: &'a RBTree<T>,
    front: NodeId,
    back: NodeId,
    remaining: Option<usize>,
}

impl<'a, T: RBTreeParams> Iter<'a, T> {
    pub(crate) fn new(
        tree: &'a RBTree<T>,
        front: NodeId,
        back: NodeId,
        remaining: Option<usize>,
    ) -> Self {
        Self {
            tree,
            front,
            back,
            remaining,
        }
    }

    fn finish(&mut self) {
        self.front = self.back;
        self.remaining = Some(0);
    }
}

impl<T: RBTreeParams> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T: RBTreeParams> Iterator for Iter<'a, T> {
    type Item = &'a T::KeyType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back || self.front == BOUNDARY {
            self.finish();
            return None;
        }

        let tree: &'a RBTree<T> = self.tree;
        let key = tree.key_at(Position(self.front));
        self.front = tree.successor(self.front);
        if let Some(n) = self.remaining.as_mut() {
            *n = n.saturating_sub(1);
        }
        key
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => (n, Some(n)),
            None => (0, Some(self.tree.size())),
        }
    }
}

impl<'a, T: RBTreeParams> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back || self.front == BOUNDARY {
            self.finish();
            return None;
        }

        let tree: &'a RBTree<T> = self.tree;
        let back = tree.predecessor(self.back);
        if back == BOUNDARY {
            self.finish();
            return None;
        }
        self.back = back;
        if let Some(n) = self.remaining.as_mut() {
            *n = n.saturating_sub(1);
        }
        tree.key_at(Position(back))
    }
}

impl<T: RBTreeParams> FusedIterator for Iter<'_, T> {}

impl<T: RBTreeParams> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
