use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    ops::{Bound, RangeBounds},
};

use crate::rbtree_base::{
    error::TreeViolation,
    iter::{Iter, Position},
    rbtree::RBTree,
    rbtree_traits::{KeyComparator, RBTreeParams},
    DefaultRBTreeConfig, ReverseRBTreeConfig, VerifiedRBTreeConfig,
};

pub struct RBTreeSet<T: RBTreeParams> {
    _tree: RBTree<T>,
}

impl<T: RBTreeParams> RBTreeSet<T> {
    pub fn new() -> Self {
        Self {
            _tree: RBTree::new(),
        }
    }

    pub fn with_comparator(key_less: T::KeyCompareType) -> Self {
        Self {
            _tree: RBTree::with_comparator(key_less),
        }
    }

    pub fn is_empty(&self) -> bool {
        self._tree.empty()
    }

    pub fn len(&self) -> usize {
        self._tree.size()
    }

    pub fn contains(&self, key: &T::KeyType) -> bool {
        self._tree.exists(key)
    }

    pub fn get(&self, key: &T::KeyType) -> Option<&T::KeyType> {
        self._tree.key_at(self._tree.find(key))
    }

    /// Returns whether `key` was newly added.
    pub fn insert(&mut self, key: T::KeyType) -> bool {
        self._tree.insert(key).1
    }

    /// Returns whether `key` was present.
    pub fn remove(&mut self, key: &T::KeyType) -> bool {
        self._tree.erase(key) == 1
    }

    pub fn take(&mut self, key: &T::KeyType) -> Option<T::KeyType> {
        self._tree.take(key)
    }

    pub fn first(&self) -> Option<&T::KeyType> {
        self._tree.first_key()
    }

    pub fn last(&self) -> Option<&T::KeyType> {
        self._tree.last_key()
    }

    pub fn pop_first(&mut self) -> Option<T::KeyType> {
        let begin = self._tree.begin();
        self._tree.erase_at(begin)
    }

    pub fn pop_last(&mut self) -> Option<T::KeyType> {
        let last = self._tree.prev_position(self._tree.end());
        self._tree.erase_at(last)
    }

    pub fn clear(&mut self) {
        self._tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self._tree.swap(&mut other._tree);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self._tree.iter()
    }

    /// Keys within `range`, in order. A range whose start lies after its
    /// end is empty.
    pub fn range<R: RangeBounds<T::KeyType>>(&self, range: R) -> Iter<'_, T> {
        let tree = &self._tree;
        let first = match range.start_bound() {
            Bound::Included(key) => tree.lower_bound(key),
            Bound::Excluded(key) => tree.upper_bound(key),
            Bound::Unbounded => tree.begin(),
        };
        let last = match range.end_bound() {
            Bound::Included(key) => tree.upper_bound(key),
            Bound::Excluded(key) => tree.lower_bound(key),
            Bound::Unbounded => tree.end(),
        };

        if first == tree.end() {
            return tree.iter_range(first, first);
        }
        if let (Some(lo), Some(hi)) = (tree.key_at(first), tree.key_at(last)) {
            if tree.key_comp().less(hi, lo) {
                return tree.iter_range(last, last);
            }
        }
        tree.iter_range(first, last)
    }

    pub fn key_comp(&self) -> &T::KeyCompareType {
        self._tree.key_comp()
    }

    pub fn verify(&self) -> Result<(), TreeViolation> {
        self._tree.verify()
    }

    /// The underlying tree, for position-based access.
    pub fn tree(&self) -> &RBTree<T> {
        &self._tree
    }

    pub fn find(&self, key: &T::KeyType) -> Position {
        self._tree.find(key)
    }
}

impl<T: RBTreeParams> Default for RBTreeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RBTreeParams> Clone for RBTreeSet<T>
where
    T::KeyType: Clone,
{
    fn clone(&self) -> Self {
        Self {
            _tree: self._tree.clone(),
        }
    }
}

impl<T: RBTreeParams> fmt::Debug for RBTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: RBTreeParams> PartialEq for RBTreeSet<T>
where
    T::KeyType: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: RBTreeParams> Eq for RBTreeSet<T> where T::KeyType: Eq {}

impl<T: RBTreeParams> PartialOrd for RBTreeSet<T>
where
    T::KeyType: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: RBTreeParams> Ord for RBTreeSet<T>
where
    T::KeyType: Ord,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: RBTreeParams> Hash for RBTreeSet<T>
where
    T::KeyType: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for key in self.iter() {
            key.hash(state);
        }
    }
}

impl<T: RBTreeParams> FromIterator<T::KeyType> for RBTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T::KeyType>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: RBTreeParams> Extend<T::KeyType> for RBTreeSet<T> {
    fn extend<I: IntoIterator<Item = T::KeyType>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, T: RBTreeParams> IntoIterator for &'a RBTreeSet<T> {
    type Item = &'a T::KeyType;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator, draining the set from both ends.
pub struct IntoIter<T: RBTreeParams> {
    set: RBTreeSet<T>,
}

impl<T: RBTreeParams> Iterator for IntoIter<T> {
    type Item = T::KeyType;

    fn next(&mut self) -> Option<Self::Item> {
        self.set.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.set.len(), Some(self.set.len()))
    }
}

impl<T: RBTreeParams> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.set.pop_last()
    }
}

impl<T: RBTreeParams> ExactSizeIterator for IntoIter<T> {}

impl<T: RBTreeParams> FusedIterator for IntoIter<T> {}

impl<T: RBTreeParams> IntoIterator for RBTreeSet<T> {
    type Item = T::KeyType;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { set: self }
    }
}

pub type DefaultRBTreeSet<K> = RBTreeSet<DefaultRBTreeConfig<K>>;
pub type VerifiedRBTreeSet<K> = RBTreeSet<VerifiedRBTreeConfig<K>>;
pub type ReverseRBTreeSet<K> = RBTreeSet<ReverseRBTreeConfig<K>>;
