mod deletion;
pub mod error;
pub mod iter;
pub mod node;
pub mod rbtree;
pub mod rbtree_traits;
pub mod storage;
mod tree_stats;

pub use self::tree_stats::TreeStats;

use self::{
    rbtree::RBTree,
    rbtree_traits::{KeyComparator, _RBTree},
    storage::ArenaStorage,
};
use std::{fmt::Debug, marker::PhantomData};

#[derive(Debug)]
pub struct DefaultKeyComparator<T> {
    _t: PhantomData<T>,
}

impl<T> Clone for DefaultKeyComparator<T> {
    fn clone(&self) -> Self {
        Self { _t: PhantomData }
    }
}

impl<T> KeyComparator<T> for DefaultKeyComparator<T>
where
    T: Ord + Debug,
{
    fn new() -> Self {
        Self { _t: PhantomData }
    }
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        lhs < rhs
    }
}

/// Orders keys from greatest to least.
#[derive(Debug)]
pub struct ReverseKeyComparator<T> {
    _t: PhantomData<T>,
}

impl<T> Clone for ReverseKeyComparator<T> {
    fn clone(&self) -> Self {
        Self { _t: PhantomData }
    }
}

impl<T> KeyComparator<T> for ReverseKeyComparator<T>
where
    T: Ord + Debug,
{
    fn new() -> Self {
        Self { _t: PhantomData }
    }
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        rhs < lhs
    }
}

pub type DefaultRBTreeConfig<K> = _RBTree<K, DefaultKeyComparator<K>, ArenaStorage<K>>;
pub type VerifiedRBTreeConfig<K> = _RBTree<K, DefaultKeyComparator<K>, ArenaStorage<K>, true>;
pub type ReverseRBTreeConfig<K> = _RBTree<K, ReverseKeyComparator<K>, ArenaStorage<K>>;
pub type DefaultRBTree<K> = RBTree<DefaultRBTreeConfig<K>>;
