use std::mem::size_of;

use super::{
    deletion::{EraseFlags, ErasePlan},
    error::{StorageError, TreeViolation},
    iter::{Iter, Position, RBTreeIterator, RBTreeReverseIterator},
    node::{is_sentinel, Node, NodeId, Side, BOUNDARY, NIL},
    rbtree_traits::{KeyComparator, RBTreeParams},
    storage::NodeStorage,
    tree_stats::TreeStats,
};

pub struct RBTree<T: RBTreeParams> {
    root_: NodeId,
    storage_: T::StorageType,
    stats_: TreeStats,
    key_less: T::KeyCompareType,
}

/// Convenient Key Comparison Functions Generated From key_less
impl<T: RBTreeParams> RBTree<T> {
    pub fn key_comp(&self) -> &T::KeyCompareType {
        &self.key_less
    }

    fn key_less(&self, a: &T::KeyType, b: &T::KeyType) -> bool {
        self.key_less.less(a, b)
    }
}

impl<T: RBTreeParams> Drop for RBTree<T> {
    fn drop(&mut self) {
        self.clear();
        debug_assert!(self.stats_.live_nodes() == 0);
    }
}

/// Node links and colors
impl<T: RBTreeParams> RBTree<T> {
    #[inline]
    fn node(&self, id: NodeId) -> &Node<T::KeyType> {
        self.storage_.node(id)
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T::KeyType> {
        self.storage_.node_mut(id)
    }

    #[inline]
    fn key(&self, id: NodeId) -> &T::KeyType {
        self.node(id).key()
    }

    #[inline]
    fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    #[inline]
    fn left(&self, id: NodeId) -> NodeId {
        self.node(id).left
    }

    #[inline]
    fn right(&self, id: NodeId) -> NodeId {
        self.node(id).right
    }

    #[inline]
    fn child(&self, id: NodeId, side: Side) -> NodeId {
        self.node(id).child(side)
    }

    #[inline]
    fn is_red(&self, id: NodeId) -> bool {
        self.node(id).red
    }

    #[inline]
    fn set_red(&mut self, id: NodeId, red: bool) {
        debug_assert!(!(red && is_sentinel(id)), "sentinel {} colored red", id);
        self.node_mut(id).red = red;
    }

    /// Which child of its parent `id` is.
    fn side_of(&self, id: NodeId) -> Side {
        if self.left(self.parent(id)) == id {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn grand_parent(&self, id: NodeId) -> NodeId {
        self.parent(self.parent(id))
    }

    fn uncle(&self, id: NodeId) -> NodeId {
        let parent = self.parent(id);
        self.child(self.parent(parent), self.side_of(parent).opposite())
    }

    /// Holds a key, i.e. is a live position other than `end()`.
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        !is_sentinel(id) && self.node(id).key.is_some()
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while !is_sentinel(self.left(id)) {
            id = self.left(id);
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while !is_sentinel(self.right(id)) {
            id = self.right(id);
        }
        id
    }
}

/// node object allocation and deallocation functions
impl<T: RBTreeParams> RBTree<T> {
    /// Acquires a slot and moves `key` into it. Nothing is linked yet, so a
    /// storage failure leaves the tree untouched.
    fn new_node(&mut self, key: T::KeyType) -> Result<NodeId, StorageError> {
        let id = self.storage_.acquire()?;
        self.storage_.construct_key(id, key);
        self.stats_.acquired += 1;
        Ok(id)
    }

    fn free_node(&mut self, id: NodeId) -> Option<T::KeyType> {
        let key = self.storage_.destroy_key(id);
        self.storage_.release(id);
        self.stats_.released += 1;
        key
    }

    fn clear_recursive(&mut self, id: NodeId) {
        if is_sentinel(id) {
            return;
        }
        let (left, right) = (self.left(id), self.right(id));
        self.clear_recursive(left);
        self.clear_recursive(right);
        // dropped with the returned key
        self.free_node(id);
    }

    fn reset_sentinels(&mut self) {
        *self.node_mut(NIL) = Node::sentinel(NIL);
        *self.node_mut(BOUNDARY) = Node::sentinel(BOUNDARY);
    }

    /// Releases every key node in post-order and returns to the empty state.
    pub fn clear(&mut self) {
        if self.root_ != NIL {
            log::debug!("RBTree::clear releasing {} nodes", self.size());
            let root = self.root_;
            self.clear_recursive(root);
        }
        self.root_ = NIL;
        self.reset_sentinels();
        self.stats_.size = 0;
    }
}

/// Access Functions to the item count
impl<T: RBTreeParams> RBTree<T> {
    pub fn size(&self) -> usize {
        self.stats_.size
    }

    pub fn empty(&self) -> bool {
        self.size() == 0
    }

    pub fn max_size(&self) -> usize {
        isize::MAX as usize / size_of::<Node<T::KeyType>>().max(1)
    }

    pub fn get_stats(&self) -> &TreeStats {
        &self.stats_
    }

    pub fn storage(&self) -> &T::StorageType {
        &self.storage_
    }

    /// Longest root-to-node path, counted in key nodes.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root_)
    }

    fn subtree_height(&self, id: NodeId) -> usize {
        if is_sentinel(id) {
            return 0;
        }
        1 + self
            .subtree_height(self.left(id))
            .max(self.subtree_height(self.right(id)))
    }
}

/// Boundary ring and in-order stepping
impl<T: RBTreeParams> RBTree<T> {
    pub fn begin(&self) -> Position {
        Position(self.node(BOUNDARY).right)
    }

    pub fn end(&self) -> Position {
        Position(BOUNDARY)
    }

    pub fn first_key(&self) -> Option<&T::KeyType> {
        self.key_at(self.begin())
    }

    pub fn last_key(&self) -> Option<&T::KeyType> {
        self.key_at(Position(self.node(BOUNDARY).left))
    }

    /// Key stored at `pos`, or `None` for `end()`.
    pub fn key_at(&self, pos: Position) -> Option<&T::KeyType> {
        if is_sentinel(pos.0) {
            return None;
        }
        self.node(pos.0).key.as_ref()
    }

    /// In-order successor. The successor of `end()` is `begin()`.
    pub fn next_position(&self, pos: Position) -> Position {
        Position(self.successor(pos.0))
    }

    /// In-order predecessor. The predecessor of `begin()` is `end()`.
    pub fn prev_position(&self, pos: Position) -> Position {
        Position(self.predecessor(pos.0))
    }

    pub(crate) fn successor(&self, id: NodeId) -> NodeId {
        if id == BOUNDARY {
            return self.node(BOUNDARY).right;
        }

        let right = self.right(id);
        if right == BOUNDARY {
            return BOUNDARY;
        }
        if right != NIL {
            return self.leftmost(right);
        }

        let mut id = id;
        let mut parent = self.parent(id);
        while parent != NIL && self.right(parent) == id {
            id = parent;
            parent = self.parent(id);
        }
        if parent == NIL {
            BOUNDARY
        } else {
            parent
        }
    }

    pub(crate) fn predecessor(&self, id: NodeId) -> NodeId {
        if id == BOUNDARY {
            return self.node(BOUNDARY).left;
        }

        let left = self.left(id);
        if left == BOUNDARY {
            return BOUNDARY;
        }
        if left != NIL {
            return self.rightmost(left);
        }

        let mut id = id;
        let mut parent = self.parent(id);
        while parent != NIL && self.left(parent) == id {
            id = parent;
            parent = self.parent(id);
        }
        if parent == NIL {
            BOUNDARY
        } else {
            parent
        }
    }

    pub fn cursor(&self, pos: Position) -> RBTreeIterator<'_, T> {
        RBTreeIterator::new(self, pos.0)
    }

    pub fn rbegin(&self) -> RBTreeReverseIterator<'_, T> {
        RBTreeReverseIterator::new(self, BOUNDARY)
    }

    pub fn rend(&self) -> RBTreeReverseIterator<'_, T> {
        RBTreeReverseIterator::new(self, self.begin().0)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, self.begin().0, BOUNDARY, Some(self.size()))
    }

    /// Keys in the half-open position range `[first, last)`. `first` must not
    /// come after `last`; a range starting at `end()` is empty.
    pub fn iter_range(&self, first: Position, last: Position) -> Iter<'_, T> {
        Iter::new(self, first.0, last.0, None)
    }
}

/// Access function querying the tree by descending from the root
impl<T: RBTreeParams> RBTree<T> {
    fn find_node(&self, key: &T::KeyType) -> NodeId {
        let mut n = self.root_;
        while !is_sentinel(n) {
            if self.key_less(key, self.key(n)) {
                n = self.left(n);
            } else if self.key_less(self.key(n), key) {
                n = self.right(n);
            } else {
                return n;
            }
        }
        BOUNDARY
    }

    /// Position of `key`, or `end()` if it is absent.
    pub fn find(&self, key: &T::KeyType) -> Position {
        Position(self.find_node(key))
    }

    pub fn exists(&self, key: &T::KeyType) -> bool {
        self.find_node(key) != BOUNDARY
    }

    /// Either 0 or 1.
    pub fn count(&self, key: &T::KeyType) -> usize {
        self.exists(key) as usize
    }

    /// First position whose key is not ordered before `key`, or `end()`.
    pub fn lower_bound(&self, key: &T::KeyType) -> Position {
        let mut n = self.root_;
        if n == NIL {
            return self.end();
        }

        // the right spine always ends at the boundary
        while n != BOUNDARY && self.key_less(self.key(n), key) {
            n = self.right(n);
        }
        if n == BOUNDARY {
            return self.end();
        }

        while !is_sentinel(self.left(n))
            && !self.key_less(self.key(self.rightmost(self.left(n))), key)
        {
            n = self.left(n);
            while !is_sentinel(n) && self.key_less(self.key(n), key) {
                n = self.right(n);
            }
        }

        Position(n)
    }

    /// First position whose key is ordered strictly after `key`, or `end()`.
    pub fn upper_bound(&self, key: &T::KeyType) -> Position {
        let mut n = self.root_;
        if n == NIL {
            return self.end();
        }

        while n != BOUNDARY && !self.key_less(key, self.key(n)) {
            n = self.right(n);
        }
        if n == BOUNDARY {
            return self.end();
        }

        while !is_sentinel(self.left(n))
            && self.key_less(key, self.key(self.rightmost(self.left(n))))
        {
            n = self.left(n);
            while !is_sentinel(n) && !self.key_less(key, self.key(n)) {
                n = self.right(n);
            }
        }

        Position(n)
    }

    /// `(find(key), next)` when present, otherwise an empty range at
    /// `upper_bound(key)`.
    pub fn equal_range(&self, key: &T::KeyType) -> (Position, Position) {
        let found = self.find_node(key);
        if found != BOUNDARY {
            return (Position(found), Position(self.successor(found)));
        }
        let upper = self.upper_bound(key);
        (upper, upper)
    }
}

/// Insertion
impl<T: RBTreeParams> RBTree<T> {
    /// Inserts `key` unless an equivalent key is present. Returns the position
    /// of the key in the tree and whether it was inserted.
    ///
    /// # Panics
    ///
    /// Panics if the node storage cannot provide a slot.
    pub fn insert(&mut self, key: T::KeyType) -> (Position, bool) {
        match self.try_insert(key) {
            Ok(r) => r,
            Err(err) => panic!("RBTree::insert: {}", err),
        }
    }

    /// Fallible form of [`RBTree::insert`].
    ///
    /// # Errors
    ///
    /// Returns the storage error when no slot can be acquired for a key that
    /// is not yet present. The tree is left unchanged and `key` is dropped.
    pub fn try_insert(&mut self, key: T::KeyType) -> Result<(Position, bool), StorageError> {
        if self.root_ == NIL {
            return self.insert_to_root(key).map(|id| (Position(id), true));
        }

        let mut n = self.root_;
        loop {
            let side = if self.key_less(&key, self.key(n)) {
                Side::Left
            } else if self.key_less(self.key(n), &key) {
                Side::Right
            } else {
                log::debug!("RBTree::insert key {:?} already present at node {}", key, n);
                return Ok((Position(n), false));
            };

            let child = self.child(n, side);
            if is_sentinel(child) {
                let id = self.insert_node(n, side, key)?;
                return Ok((Position(id), true));
            }
            n = child;
        }
    }

    /// Inserts `key` using `hint` as a starting guess. When `key` belongs
    /// directly before or after `hint` it is attached without walking from
    /// the root; the resulting shape is the same either way.
    ///
    /// # Panics
    ///
    /// Panics if the node storage cannot provide a slot.
    pub fn insert_hint(&mut self, hint: Position, key: T::KeyType) -> (Position, bool) {
        match self.try_insert_hint(hint, key) {
            Ok(r) => r,
            Err(err) => panic!("RBTree::insert_hint: {}", err),
        }
    }

    /// Fallible form of [`RBTree::insert_hint`].
    ///
    /// # Errors
    ///
    /// As [`RBTree::try_insert`]: the tree is left unchanged and `key` is
    /// dropped.
    pub fn try_insert_hint(
        &mut self,
        hint: Position,
        key: T::KeyType,
    ) -> Result<(Position, bool), StorageError> {
        if self.root_ == NIL {
            return self.insert_to_root(key).map(|id| (Position(id), true));
        }

        let pos = hint.0;
        if pos != BOUNDARY && !self.is_live(pos) {
            return self.try_insert(key);
        }

        let prev = self.predecessor(pos);
        let next = self.successor(pos);

        let after_prev = prev == BOUNDARY || self.key_less(self.key(prev), &key);
        let before_pos = pos == BOUNDARY || self.key_less(&key, self.key(pos));
        if after_prev && before_pos {
            let (parent, side) = if pos == BOUNDARY || !is_sentinel(self.left(pos)) {
                (prev, Side::Right)
            } else {
                (pos, Side::Left)
            };
            debug_assert!(is_sentinel(self.child(parent, side)));
            log::debug!("RBTree::insert_hint {:?} attached before hint {}", key, pos);
            let id = self.insert_node(parent, side, key)?;
            return Ok((Position(id), true));
        }

        let after_pos = pos == BOUNDARY || self.key_less(self.key(pos), &key);
        let before_next = next == BOUNDARY || self.key_less(&key, self.key(next));
        if after_pos && before_next {
            let (parent, side) = if pos == BOUNDARY || !is_sentinel(self.right(pos)) {
                (next, Side::Left)
            } else {
                (pos, Side::Right)
            };
            debug_assert!(is_sentinel(self.child(parent, side)));
            log::debug!("RBTree::insert_hint {:?} attached after hint {}", key, pos);
            let id = self.insert_node(parent, side, key)?;
            return Ok((Position(id), true));
        }

        log::debug!("RBTree::insert_hint {:?} rejected hint {}", key, pos);
        self.try_insert(key)
    }

    fn insert_to_root(&mut self, key: T::KeyType) -> Result<NodeId, StorageError> {
        let id = self.new_node(key)?;
        log::debug!("RBTree::insert_to_root node {}", id);

        let root = self.node_mut(id);
        root.red = false;
        root.parent = NIL;
        root.left = BOUNDARY;
        root.right = BOUNDARY;

        let boundary = self.node_mut(BOUNDARY);
        boundary.left = id;
        boundary.right = id;

        self.root_ = id;
        self.stats_.size += 1;
        self.self_verify("insert_to_root");
        Ok(id)
    }

    /// Attaches a new red node in the empty `side` slot of `parent`, keeping
    /// the boundary ring on the new minimum or maximum, then rebalances.
    fn insert_node(
        &mut self,
        parent: NodeId,
        side: Side,
        key: T::KeyType,
    ) -> Result<NodeId, StorageError> {
        let id = self.new_node(key)?;

        if self.child(parent, side) == BOUNDARY {
            log::debug!("RBTree::insert_node node {} is the new {:?} end", id, side);
            self.node_mut(id).set_child(side, BOUNDARY);
            // boundary.right tracks the minimum, boundary.left the maximum
            self.node_mut(BOUNDARY).set_child(side.opposite(), id);
        }

        self.node_mut(id).parent = parent;
        self.node_mut(parent).set_child(side, id);
        self.stats_.size += 1;

        self.fix_insertion(id);
        self.self_verify("insert_node");
        Ok(id)
    }

    fn fix_insertion(&mut self, id: NodeId) {
        let mut node = id;
        while let Some(next) = self.insert_fixup_step(node) {
            node = next;
        }
        let root = self.root_;
        self.set_red(root, false);
    }

    /// One round of insertion fixup on a red `node`. Returns the node to
    /// examine next, or `None` once no red-red edge remains.
    fn insert_fixup_step(&mut self, node: NodeId) -> Option<NodeId> {
        let mut parent = self.parent(node);
        if !self.is_red(parent) {
            return None;
        }

        let grand_parent = self.grand_parent(node);
        let uncle = self.uncle(node);

        if self.is_red(uncle) {
            log::trace!("RBTree::fix_insertion node {} red uncle {}", node, uncle);
            self.set_red(parent, false);
            self.set_red(uncle, false);
            self.set_red(grand_parent, true);
            return Some(grand_parent);
        }

        let parent_side = self.side_of(parent);
        if self.side_of(node) != parent_side {
            log::trace!("RBTree::fix_insertion node {} triangle", node);
            self.rotate(parent, parent_side);
            parent = node;
        }

        log::trace!("RBTree::fix_insertion node {} line", parent);
        self.rotate(grand_parent, parent_side.opposite());
        self.set_red(parent, false);
        self.set_red(grand_parent, true);
        None
    }
}

/// Erase
impl<T: RBTreeParams> RBTree<T> {
    /// Removes the node at `pos` and returns its key. `end()` and positions
    /// that no longer hold a key yield `None` and leave the tree unchanged.
    pub fn erase_at(&mut self, pos: Position) -> Option<T::KeyType> {
        let node = pos.0;
        if !self.is_live(node) {
            return None;
        }
        log::debug!("RBTree::erase_at node {} on tree size {}", node, self.size());

        if self.size() == 1 {
            let key = self.free_node(node);
            self.root_ = NIL;
            self.reset_sentinels();
            self.stats_.size = 0;
            return key;
        }

        let mut plan = ErasePlan::new();
        if self.left(node) == BOUNDARY {
            plan = plan.with_new_min(self.successor(node));
        }
        if self.right(node) == BOUNDARY {
            plan = plan.with_new_max(self.predecessor(node));
        }

        self.unlink(node, &mut plan);

        if plan.has(EraseFlags::Rebalance) {
            self.fix_deletion(plan.violating);
        }
        if plan.has(EraseFlags::UpdateMin) {
            log::debug!("RBTree::erase_at new minimum {}", plan.new_min);
            self.node_mut(plan.new_min).left = BOUNDARY;
            self.node_mut(BOUNDARY).right = plan.new_min;
        }
        if plan.has(EraseFlags::UpdateMax) {
            log::debug!("RBTree::erase_at new maximum {}", plan.new_max);
            self.node_mut(plan.new_max).right = BOUNDARY;
            self.node_mut(BOUNDARY).left = plan.new_max;
        }

        self.stats_.size -= 1;
        let key = self.free_node(node);
        self.self_verify("erase_at");
        key
    }

    /// Removes `key` if present. Returns the number of keys removed.
    pub fn erase(&mut self, key: &T::KeyType) -> usize {
        let node = self.find_node(key);
        if node == BOUNDARY {
            log::debug!("RBTree::erase could not find key {:?}", key);
            return 0;
        }
        self.erase_at(Position(node));
        1
    }

    /// Removes `key` and hands it back.
    pub fn take(&mut self, key: &T::KeyType) -> Option<T::KeyType> {
        let node = self.find_node(key);
        self.erase_at(Position(node))
    }

    /// Removes every key in `[first, last)`. Returns the number removed.
    pub fn erase_range(&mut self, first: Position, last: Position) -> usize {
        let mut removed = 0;
        let mut pos = first;
        while pos != last && pos.0 != BOUNDARY {
            let next = self.next_position(pos);
            if self.erase_at(pos).is_some() {
                removed += 1;
            }
            pos = next;
        }
        removed
    }

    /// Detaches `node` from the tree. Records the node that takes the
    /// structural place of whatever was removed and whether a black node
    /// went missing from its paths.
    fn unlink(&mut self, node: NodeId, plan: &mut ErasePlan) {
        let left = self.left(node);
        let right = self.right(node);
        let node_red = self.is_red(node);

        if is_sentinel(left) {
            log::debug!("RBTree::unlink node {} splice right {}", node, right);
            self.transplant(node, right);
            plan.rebalance_from(right, !node_red);
        } else if is_sentinel(right) {
            log::debug!("RBTree::unlink node {} splice left {}", node, left);
            self.transplant(node, left);
            plan.rebalance_from(left, !node_red);
        } else {
            let successor = self.leftmost(right);
            let successor_red = self.is_red(successor);
            let violating = self.right(successor);
            log::debug!("RBTree::unlink node {} relink successor {}", node, successor);

            if self.parent(successor) == node {
                self.node_mut(violating).parent = successor;
            } else {
                self.transplant(successor, violating);
                self.node_mut(successor).right = right;
                self.node_mut(right).parent = successor;
            }

            self.transplant(node, successor);
            self.node_mut(successor).left = left;
            self.node_mut(left).parent = successor;
            self.set_red(successor, node_red);

            plan.rebalance_from(violating, !successor_red);
        }
    }

    /// Puts `with` in the slot `node` occupies under its parent. A sentinel
    /// `with` gets its parent link set too, for the fixup to climb from.
    fn transplant(&mut self, node: NodeId, with: NodeId) {
        let parent = self.parent(node);
        if parent == NIL {
            self.root_ = with;
        } else if self.left(parent) == node {
            self.node_mut(parent).left = with;
        } else {
            self.node_mut(parent).right = with;
        }
        self.node_mut(with).parent = parent;
    }

    fn fix_deletion(&mut self, id: NodeId) {
        let mut node = id;
        while let Some(next) = self.erase_fixup_step(node) {
            node = next;
        }
        self.node_mut(node).red = false;
    }

    /// One round of deletion fixup on a node carrying an extra black.
    /// Returns the node to examine next, or `None` when `node` is the root
    /// or red and can absorb the extra black.
    fn erase_fixup_step(&mut self, node: NodeId) -> Option<NodeId> {
        if node == self.root_ || self.is_red(node) {
            return None;
        }

        let parent = self.parent(node);
        let side = if self.left(parent) == node {
            Side::Left
        } else {
            Side::Right
        };
        let far = side.opposite();

        let mut sibling = self.child(parent, far);
        if self.is_red(sibling) {
            log::trace!("RBTree::fix_deletion node {} red sibling {}", node, sibling);
            self.set_red(sibling, false);
            self.set_red(parent, true);
            self.rotate(parent, side);
            sibling = self.child(parent, far);
        }

        let near_nephew = self.child(sibling, side);
        let far_nephew = self.child(sibling, far);
        if !self.is_red(near_nephew) && !self.is_red(far_nephew) {
            log::trace!("RBTree::fix_deletion node {} black nephews", node);
            self.set_red(sibling, true);
            return Some(parent);
        }

        if !self.is_red(far_nephew) {
            log::trace!("RBTree::fix_deletion node {} red near nephew", node);
            self.set_red(near_nephew, false);
            self.set_red(sibling, true);
            self.rotate(sibling, far);
            sibling = self.child(parent, far);
        }

        log::trace!("RBTree::fix_deletion node {} red far nephew", node);
        let parent_red = self.is_red(parent);
        self.set_red(sibling, parent_red);
        self.set_red(parent, false);
        let far_nephew = self.child(sibling, far);
        self.set_red(far_nephew, false);
        self.rotate(parent, side);
        Some(self.root_)
    }
}

/// Rotations
impl<T: RBTreeParams> RBTree<T> {
    /// Moves `node` down towards `dir`, promoting its child from the other
    /// side: `Side::Left` is a left rotation, `Side::Right` a right one.
    /// Key order and the boundary links are unaffected.
    fn rotate(&mut self, node: NodeId, dir: Side) {
        let up = dir.opposite();
        let pivot = self.child(node, up);
        debug_assert!(!is_sentinel(pivot), "rotating node {} around a sentinel", node);

        let inner = self.child(pivot, dir);
        self.node_mut(node).set_child(up, inner);
        if !is_sentinel(inner) {
            self.node_mut(inner).parent = node;
        }

        let parent = self.parent(node);
        self.node_mut(pivot).parent = parent;
        if parent == NIL {
            self.root_ = pivot;
        } else if self.left(parent) == node {
            self.node_mut(parent).left = pivot;
        } else {
            self.node_mut(parent).right = pivot;
        }

        self.node_mut(pivot).set_child(dir, node);
        self.node_mut(node).parent = pivot;
        self.stats_.rotations += 1;
    }
}

/// Verification
impl<T: RBTreeParams> RBTree<T> {
    fn self_verify(&self, op: &str) {
        if T::SELF_VERIFY {
            let r = self.verify();
            debug_assert!(r.is_ok(), "RBTree::{} broke the tree: {:?}", op, r);
        }
    }

    /// Checks the red-black properties, parent links, the boundary ring, the
    /// recorded size and the strict in-order key sequence.
    pub fn verify(&self) -> Result<(), TreeViolation> {
        for sentinel in [NIL, BOUNDARY] {
            if self.is_red(sentinel) {
                return Err(TreeViolation::SentinelColored(sentinel));
            }
        }

        let boundary = self.node(BOUNDARY);
        if self.root_ == NIL {
            if boundary.left != BOUNDARY || boundary.right != BOUNDARY {
                return Err(TreeViolation::BoundaryMismatch("empty"));
            }
            if self.size() != 0 {
                return Err(TreeViolation::SizeMismatch {
                    counted: 0,
                    recorded: self.size(),
                });
            }
            return Ok(());
        }

        if self.is_red(self.root_) {
            return Err(TreeViolation::RedRoot(self.root_));
        }
        if self.parent(self.root_) != NIL {
            return Err(TreeViolation::BrokenParentLink {
                parent: NIL,
                child: self.root_,
            });
        }

        let min = self.leftmost(self.root_);
        if boundary.right != min || self.left(min) != BOUNDARY {
            return Err(TreeViolation::BoundaryMismatch("minimum"));
        }
        let max = self.rightmost(self.root_);
        if boundary.left != max || self.right(max) != BOUNDARY {
            return Err(TreeViolation::BoundaryMismatch("maximum"));
        }

        let mut counted = 0;
        self.verify_subtree(self.root_, &mut counted)?;
        if counted != self.size() {
            return Err(TreeViolation::SizeMismatch {
                counted,
                recorded: self.size(),
            });
        }

        let mut prev = min;
        let mut cur = self.successor(min);
        let mut steps = 1;
        while cur != BOUNDARY {
            if steps >= counted || !self.key_less(self.key(prev), self.key(cur)) {
                return Err(TreeViolation::OutOfOrder(cur));
            }
            prev = cur;
            cur = self.successor(cur);
            steps += 1;
        }

        Ok(())
    }

    /// Returns the black height below `id`, the sentinel leaf included.
    fn verify_subtree(&self, id: NodeId, counted: &mut usize) -> Result<usize, TreeViolation> {
        if is_sentinel(id) {
            return Ok(1);
        }
        *counted += 1;

        let node = self.node(id);
        if node.key.is_none() {
            return Err(TreeViolation::KeylessNode(id));
        }
        if node.left == BOUNDARY && self.node(BOUNDARY).right != id {
            return Err(TreeViolation::BoundaryMismatch("interior left"));
        }
        if node.right == BOUNDARY && self.node(BOUNDARY).left != id {
            return Err(TreeViolation::BoundaryMismatch("interior right"));
        }

        for child in [node.left, node.right] {
            if is_sentinel(child) {
                continue;
            }
            if self.parent(child) != id {
                return Err(TreeViolation::BrokenParentLink { parent: id, child });
            }
            if node.red && self.is_red(child) {
                return Err(TreeViolation::RedRedEdge { parent: id, child });
            }
        }

        let left = self.verify_subtree(node.left, counted)?;
        let right = self.verify_subtree(node.right, counted)?;
        if left != right {
            return Err(TreeViolation::BlackHeightMismatch {
                node: id,
                left,
                right,
            });
        }

        Ok(left + !node.red as usize)
    }
}

/// Debug
impl<T: RBTreeParams> RBTree<T> {
    fn print_node(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        id: NodeId,
        depth: usize,
    ) -> std::fmt::Result {
        for _ in 0..depth {
            write!(f, "  ")?;
        }

        let n = self.node(id);
        writeln!(
            f,
            "node {} {} {:?}",
            id,
            if n.red { "red" } else { "black" },
            n.key()
        )?;

        for child in [n.left, n.right] {
            if !is_sentinel(child) {
                self.print_node(f, child, depth + 1)?;
            }
        }

        Ok(())
    }
}

/// Display
impl<T: RBTreeParams> std::fmt::Debug for RBTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.root_ != NIL {
            self.print_node(f, self.root_, 0)?;
        }
        let boundary = self.node(BOUNDARY);
        write!(f, "boundary: min {} max {}", boundary.right, boundary.left)
    }
}

impl<T: RBTreeParams> RBTree<T> {
    pub fn new() -> Self {
        Self::with_comparator(T::KeyCompareType::new())
    }

    pub fn with_comparator(key_less: T::KeyCompareType) -> Self {
        Self::with_parts(key_less, T::StorageType::new())
    }

    /// Builds a tree on an existing, empty storage.
    pub fn with_parts(key_less: T::KeyCompareType, storage: T::StorageType) -> Self {
        debug_assert!(storage.live() == 0, "RBTree built on a non-empty storage");
        let mut tree = Self {
            root_: NIL,
            storage_: storage,
            stats_: TreeStats::new(),
            key_less,
        };
        tree.reset_sentinels();
        tree
    }

    /// Exchanges the whole contents, comparator and storage included.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl<T: RBTreeParams> Default for RBTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies by re-inserting every key in order, so the copy is balanced by the
/// ordinary insertion path rather than cloned node by node.
impl<T: RBTreeParams> Clone for RBTree<T>
where
    T::KeyType: Clone,
{
    fn clone(&self) -> Self {
        let mut tree = Self::with_parts(self.key_less.clone(), self.storage_.empty_like());
        for key in self.iter() {
            tree.insert(key.clone());
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

    use rand::{seq::SliceRandom, thread_rng, Rng};

    use super::*;
    use crate::rbtree_base::{
        iter::TreeIterator,
        rbtree_traits::_RBTree,
        storage::ArenaStorage,
        DefaultKeyComparator, VerifiedRBTreeConfig,
    };

    type Tree = RBTree<VerifiedRBTreeConfig<i32>>;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn build(keys: &[i32]) -> Tree {
        let mut tree = Tree::new();
        for &k in keys {
            tree.insert(k);
        }
        tree
    }

    fn keys<T: RBTreeParams>(tree: &RBTree<T>) -> Vec<T::KeyType>
    where
        T::KeyType: Clone,
    {
        tree.iter().cloned().collect()
    }

    /// Pre-order (key, red) list: determines the shape of a search tree.
    fn shape(tree: &Tree) -> Vec<(i32, bool)> {
        fn walk(tree: &Tree, id: NodeId, out: &mut Vec<(i32, bool)>) {
            if is_sentinel(id) {
                return;
            }
            out.push((*tree.key(id), tree.is_red(id)));
            walk(tree, tree.left(id), out);
            walk(tree, tree.right(id), out);
        }
        let mut out = Vec::new();
        walk(tree, tree.root_, &mut out);
        out
    }

    #[test]
    fn empty_tree_boundary() {
        init_logger();
        let tree = Tree::new();
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.root_, NIL);
        assert_eq!(tree.node(BOUNDARY).left, BOUNDARY);
        assert_eq!(tree.node(BOUNDARY).right, BOUNDARY);
        assert!(tree.first_key().is_none());
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn single_key_boundary() {
        let tree = build(&[42]);
        let begin = tree.begin();
        assert_eq!(tree.key_at(begin), Some(&42));
        assert_eq!(tree.next_position(begin), tree.end());
        assert_eq!(tree.prev_position(begin), tree.end());
        assert_eq!(tree.next_position(tree.end()), begin);
        assert_eq!(tree.left(begin.0), BOUNDARY);
        assert_eq!(tree.right(begin.0), BOUNDARY);
        assert!(!tree.is_red(begin.0));
    }

    #[test]
    fn forward_and_reverse_traversal() {
        let tree = build(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(keys(&tree), vec![1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(
            tree.iter().rev().copied().collect::<Vec<_>>(),
            vec![9, 8, 7, 5, 4, 3, 1]
        );

        let mut backwards = Vec::new();
        let mut pos = tree.prev_position(tree.end());
        while pos != tree.end() {
            backwards.push(*tree.key_at(pos).unwrap());
            pos = tree.prev_position(pos);
        }
        assert_eq!(backwards, vec![9, 8, 7, 5, 4, 3, 1]);
    }

    #[test]
    fn ascending_inserts_rotate_line() {
        let tree = build(&[1, 2, 3]);
        assert_eq!(shape(&tree), vec![(2, false), (1, true), (3, true)]);
        assert_eq!(tree.get_stats().rotations, 1);
    }

    #[test]
    fn zigzag_inserts_rotate_triangle() {
        let tree = build(&[3, 1, 2]);
        assert_eq!(shape(&tree), vec![(2, false), (1, true), (3, true)]);
        assert_eq!(tree.get_stats().rotations, 2);
    }

    #[test]
    fn red_uncle_recolors() {
        let tree = build(&[2, 1, 3, 4]);
        assert_eq!(
            shape(&tree),
            vec![(2, false), (1, false), (3, false), (4, true)]
        );
        assert_eq!(tree.get_stats().rotations, 0);
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut tree = build(&[5, 3, 8]);
        let before = shape(&tree);
        let (first, inserted) = tree.insert(3);
        assert!(!inserted);
        assert_eq!(tree.key_at(first), Some(&3));
        assert_eq!(tree.size(), 3);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn erase_two_child_node() {
        init_logger();
        let mut tree = build(&[10, 5, 15, 3, 7, 12, 18]);
        assert_eq!(tree.erase(&10), 1);
        assert!(tree.verify().is_ok());
        assert_eq!(keys(&tree), vec![3, 5, 7, 12, 15, 18]);
        assert_eq!(*tree.key(tree.root_), 12);
    }

    #[test]
    fn erase_min_and_max_rewires_boundary() {
        let mut tree = build(&[10, 5, 15, 3, 7, 12, 18]);
        tree.erase(&3);
        assert_eq!(tree.first_key(), Some(&5));
        assert_eq!(tree.left(tree.begin().0), BOUNDARY);
        tree.erase(&18);
        assert_eq!(tree.last_key(), Some(&15));
        assert_eq!(tree.prev_position(tree.end()), tree.find(&15));
        assert!(tree.verify().is_ok());

        while let Some(&k) = tree.first_key() {
            tree.erase(&k);
            assert!(tree.verify().is_ok());
        }
        assert!(tree.empty());
        assert_eq!(tree.begin(), tree.end());
        tree.insert(1);
        assert_eq!(keys(&tree), vec![1]);
    }

    #[test]
    fn erase_missing_key_is_structural_noop() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let before = shape(&tree);
        let stats = tree.get_stats().clone();
        assert_eq!(tree.erase(&42), 0);
        assert_eq!(shape(&tree), before);
        assert_eq!(tree.get_stats(), &stats);
    }

    #[test]
    fn erase_end_is_noop() {
        let mut tree = build(&[1, 2]);
        assert!(tree.erase_at(tree.end()).is_none());
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn positions_survive_other_mutations() {
        let mut tree = build(&[10, 20, 30, 40, 50]);
        let pos = tree.find(&30);
        for k in 0..100 {
            tree.insert(k * 3 + 1);
        }
        tree.erase(&20);
        tree.erase(&40);
        assert_eq!(tree.key_at(pos), Some(&30));
        assert_eq!(tree.erase_at(pos), Some(30));
    }

    #[test]
    fn bounds_and_equal_range() {
        let tree = build(&[1, 3, 5, 7]);
        assert_eq!(tree.key_at(tree.lower_bound(&4)), Some(&5));
        assert_eq!(tree.key_at(tree.lower_bound(&5)), Some(&5));
        assert_eq!(tree.key_at(tree.upper_bound(&5)), Some(&7));
        assert_eq!(tree.key_at(tree.lower_bound(&0)), Some(&1));
        assert_eq!(tree.lower_bound(&8), tree.end());
        assert_eq!(tree.upper_bound(&7), tree.end());

        let (lo, hi) = tree.equal_range(&3);
        assert_eq!(lo, tree.find(&3));
        assert_eq!(hi, tree.find(&5));

        let (lo, hi) = tree.equal_range(&4);
        assert_eq!(lo, hi);
        assert_eq!(lo, tree.find(&5));

        let empty = Tree::new();
        assert_eq!(empty.lower_bound(&1), empty.end());
        assert_eq!(empty.upper_bound(&1), empty.end());
    }

    #[test]
    fn bounds_match_linear_scan() {
        let mut rng = thread_rng();
        let keys: BTreeSet<i32> = (0..300).map(|_| rng.gen_range(0..1000) * 2).collect();
        let mut tree = Tree::new();
        for &k in &keys {
            tree.insert(k);
        }
        for probe in -1..2002 {
            let lower = keys.range(probe..).next();
            let upper = keys.range(probe + 1..).next();
            assert_eq!(tree.key_at(tree.lower_bound(&probe)), lower);
            assert_eq!(tree.key_at(tree.upper_bound(&probe)), upper);
        }
    }

    #[test]
    fn hinted_insert_matches_unhinted_shape() {
        let mut rng = thread_rng();
        let mut order: Vec<i32> = (0..500).collect();
        order.shuffle(&mut rng);

        let mut plain = Tree::new();
        let mut hinted = Tree::new();
        for &k in &order {
            plain.insert(k);
            let hint = match rng.gen_range(0..4) {
                0 => hinted.end(),
                1 => hinted.begin(),
                2 => hinted.lower_bound(&k),
                _ => hinted.upper_bound(&k),
            };
            let (pos, inserted) = hinted.insert_hint(hint, k);
            assert!(inserted);
            assert_eq!(hinted.key_at(pos), Some(&k));
        }
        assert_eq!(shape(&plain), shape(&hinted));

        let hint = hinted.find(&10);
        let (pos, inserted) = hinted.insert_hint(hint, 10);
        assert!(!inserted);
        assert_eq!(pos, hint);
    }

    #[test]
    fn ascending_hinted_build() {
        let mut tree = Tree::new();
        for k in 0..1000 {
            let end = tree.end();
            tree.insert_hint(end, k);
        }
        assert_eq!(tree.size(), 1000);
        assert_eq!(keys(&tree), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn rotations_preserve_boundary() {
        let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let (min, max) = (tree.begin(), tree.prev_position(tree.end()));
        let root = tree.root_;
        tree.rotate(root, Side::Left);
        assert_eq!(tree.begin(), min);
        assert_eq!(tree.prev_position(tree.end()), max);
        assert_eq!(keys(&tree), vec![1, 2, 3, 4, 5, 6, 7]);
        let root = tree.root_;
        assert_eq!(*tree.key(root), 6);
        tree.rotate(root, Side::Right);
        assert_eq!(*tree.key(tree.root_), 4);
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn verify_detects_red_red_edge() {
        let mut tree = build(&[2, 1, 3, 4]);
        let three = tree.find(&3).0;
        tree.node_mut(three).red = true;
        assert!(matches!(
            tree.verify(),
            Err(TreeViolation::RedRedEdge { .. }) | Err(TreeViolation::BlackHeightMismatch { .. })
        ));
        tree.node_mut(three).red = false;
        let root = tree.root_;
        tree.node_mut(root).red = true;
        assert_eq!(tree.verify(), Err(TreeViolation::RedRoot(root)));
        tree.node_mut(root).red = false;
    }

    #[test]
    fn height_stays_logarithmic() {
        let mut tree = Tree::new();
        for k in 0..4096 {
            tree.insert(k);
        }
        // 2 * log2(n + 1)
        assert!(tree.height() <= 2 * 13);
        for k in (0..4096).step_by(2) {
            tree.erase(&k);
        }
        assert!(tree.height() <= 2 * 12);
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn random_ops_keep_invariants() {
        init_logger();
        let mut rng = thread_rng();
        let mut tree = Tree::new();
        let mut model = BTreeSet::new();

        for _ in 0..20000 {
            let k = rng.gen_range(0..512);
            if rng.gen_bool(0.55) {
                assert_eq!(tree.insert(k).1, model.insert(k));
            } else {
                assert_eq!(tree.erase(&k), model.remove(&k) as usize);
            }
        }
        assert!(tree.verify().is_ok());
        assert_eq!(tree.size(), model.len());
        assert!(tree.iter().eq(model.iter()));
    }

    #[test]
    fn erase_range_removes_half_open_span() {
        let mut tree = build(&(0..20).collect::<Vec<_>>());
        let first = tree.find(&5);
        let last = tree.find(&15);
        assert_eq!(tree.erase_range(first, last), 10);
        assert_eq!(
            keys(&tree),
            (0..5).chain(15..20).collect::<Vec<_>>()
        );
        let (begin, end) = (tree.begin(), tree.end());
        assert_eq!(tree.erase_range(begin, end), 10);
        assert!(tree.empty());
    }

    #[test]
    fn clone_reinserts_in_order() {
        let tree = build(&[9, 4, 12, 1, 6]);
        let copy = tree.clone();
        assert_eq!(keys(&copy), vec![1, 4, 6, 9, 12]);
        assert!(copy.verify().is_ok());
        assert_eq!(copy.get_stats().acquired, 5);
    }

    #[test]
    fn cursors_step_both_ways() {
        let tree = build(&[1, 2, 3]);
        let mut it = tree.cursor(tree.begin());
        assert_eq!(it.key(), Some(&1));
        it.forward().forward();
        assert_eq!(it.key(), Some(&3));
        it.forward();
        assert!(it.equals(&tree.cursor(tree.end())));
        assert_eq!(it.key(), None);
        it.backward();
        assert_eq!(it.key(), Some(&3));

        let mut rit = tree.rbegin();
        let mut seen = Vec::new();
        while !rit.equals(&tree.rend()) {
            seen.push(*rit.key().unwrap());
            rit.forward();
        }
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn debug_prints_shape() {
        let tree = build(&[2, 1, 3]);
        let out = format!("{:?}", tree);
        assert!(out.starts_with("node"));
        assert!(out.contains("black 2"));
        assert!(out.contains("  node"));
        assert!(out.contains("red 3"));
    }

    #[derive(Debug, Default)]
    struct Counts {
        acquired: usize,
        released: usize,
    }

    #[derive(Debug)]
    struct CountingStorage {
        arena: ArenaStorage<i32>,
        counts: Rc<RefCell<Counts>>,
    }

    impl NodeStorage<i32> for CountingStorage {
        fn new() -> Self {
            Self {
                arena: ArenaStorage::new(),
                counts: Rc::default(),
            }
        }

        fn empty_like(&self) -> Self {
            Self {
                arena: self.arena.empty_like(),
                counts: self.counts.clone(),
            }
        }

        fn acquire(&mut self) -> Result<NodeId, StorageError> {
            let id = self.arena.acquire()?;
            self.counts.borrow_mut().acquired += 1;
            Ok(id)
        }

        fn release(&mut self, id: NodeId) {
            self.counts.borrow_mut().released += 1;
            self.arena.release(id);
        }

        fn construct_key(&mut self, id: NodeId, key: i32) {
            self.arena.construct_key(id, key);
        }

        fn destroy_key(&mut self, id: NodeId) -> Option<i32> {
            self.arena.destroy_key(id)
        }

        fn node(&self, id: NodeId) -> &Node<i32> {
            self.arena.node(id)
        }

        fn node_mut(&mut self, id: NodeId) -> &mut Node<i32> {
            self.arena.node_mut(id)
        }

        fn live(&self) -> usize {
            self.arena.live()
        }
    }

    type CountingConfig = _RBTree<i32, DefaultKeyComparator<i32>, CountingStorage, true>;

    #[test]
    fn every_acquire_is_released_once() {
        let storage = CountingStorage::new();
        let counts = storage.counts.clone();
        let mut tree = RBTree::<CountingConfig>::with_parts(DefaultKeyComparator::new(), storage);

        for k in 0..200 {
            tree.insert(k);
        }
        tree.insert(5);
        for k in 0..50 {
            tree.erase(&k);
        }
        assert_eq!(counts.borrow().acquired, 200);
        assert_eq!(counts.borrow().released, 50);

        tree.clear();
        assert_eq!(counts.borrow().released, 200);
        for k in 0..10 {
            tree.insert(k);
        }
        drop(tree);
        assert_eq!(counts.borrow().acquired, 210);
        assert_eq!(counts.borrow().released, 210);
    }

    #[test]
    fn failed_allocation_leaves_tree_intact() {
        type Limited = _RBTree<i32, DefaultKeyComparator<i32>, ArenaStorage<i32>, true>;
        let mut tree =
            RBTree::<Limited>::with_parts(DefaultKeyComparator::new(), ArenaStorage::with_limit(3));
        for k in [2, 1, 3] {
            assert!(tree.try_insert(k).is_ok());
        }
        let err = tree.try_insert(4).unwrap_err();
        assert!(matches!(err, StorageError::CapacityExhausted { limit: 3 }));
        assert!(tree.try_insert_hint(tree.end(), 4).is_err());
        assert_eq!(tree.size(), 3);
        assert!(tree.verify().is_ok());

        // present keys need no slot
        assert_eq!(tree.try_insert(2).unwrap().1, false);

        tree.erase(&1);
        assert!(tree.try_insert(4).is_ok());
        assert_eq!(keys(&tree), vec![2, 3, 4]);
    }

    #[test]
    fn unbounded_limit_inserts() {
        type Limited = _RBTree<i32, DefaultKeyComparator<i32>, ArenaStorage<i32>, true>;
        let mut tree = RBTree::<Limited>::with_parts(
            DefaultKeyComparator::new(),
            ArenaStorage::with_limit(usize::MAX),
        );
        for k in [1, 2, 3] {
            assert!(tree.try_insert(k).is_ok());
        }
        assert_eq!(keys(&tree), vec![1, 2, 3]);
        assert_eq!(tree.storage().limit(), Some(usize::MAX));
    }

    #[test]
    fn verify_detects_keyless_node() {
        let mut tree = build(&[2, 1, 3]);
        let leaf = tree.find(&3).0;
        assert_eq!(tree.storage_.destroy_key(leaf), Some(3));
        assert_eq!(tree.verify(), Err(TreeViolation::KeylessNode(leaf)));
    }

    #[test]
    fn iter_range_from_end_is_empty_both_ways() {
        let tree = build(&[1, 2, 3, 4]);
        let mut it = tree.iter_range(tree.end(), tree.find(&3));
        assert_eq!(it.next_back(), None);
        assert_eq!(it.next(), None);

        let mut it = tree.iter_range(tree.end(), tree.find(&3));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    // Deletion fixup cases, named from the side of the node that lost a
    // black. Each tree is built by insertions that only recolor.

    #[test]
    fn erase_red_sibling_rotates_parent() {
        let mut tree = build(&[2, 1, 4, 3, 5, 6]);
        assert_eq!(tree.get_stats().rotations, 0);
        tree.erase(&1);
        assert_eq!(
            shape(&tree),
            vec![(4, false), (2, false), (3, true), (5, false), (6, true)]
        );
        assert_eq!(tree.get_stats().rotations, 1);
        assert_eq!(tree.first_key(), Some(&2));
    }

    #[test]
    fn erase_red_sibling_mirrored() {
        let mut tree = build(&[5, 6, 3, 4, 2, 1]);
        assert_eq!(tree.get_stats().rotations, 0);
        tree.erase(&6);
        assert_eq!(
            shape(&tree),
            vec![(3, false), (2, false), (1, true), (5, false), (4, true)]
        );
        assert_eq!(tree.get_stats().rotations, 1);
        assert_eq!(tree.last_key(), Some(&5));
    }

    #[test]
    fn erase_black_nephews_recolors_sibling() {
        let mut tree = build(&[2, 1, 3, 4]);
        tree.erase(&4);
        assert_eq!(shape(&tree), vec![(2, false), (1, false), (3, false)]);

        tree.erase(&1);
        assert_eq!(shape(&tree), vec![(2, false), (3, true)]);
        assert_eq!(tree.get_stats().rotations, 0);
        assert_eq!(tree.first_key(), Some(&2));
    }

    #[test]
    fn erase_black_nephews_mirrored() {
        let mut tree = build(&[2, 1, 3, 4]);
        tree.erase(&4);
        tree.erase(&3);
        assert_eq!(shape(&tree), vec![(2, false), (1, true)]);
        assert_eq!(tree.get_stats().rotations, 0);
        assert_eq!(tree.last_key(), Some(&2));
    }

    #[test]
    fn erase_near_nephew_rotates_twice() {
        let mut tree = build(&[2, 1, 4, 3]);
        assert_eq!(
            shape(&tree),
            vec![(2, false), (1, false), (4, false), (3, true)]
        );
        tree.erase(&1);
        assert_eq!(shape(&tree), vec![(3, false), (2, false), (4, false)]);
        assert_eq!(tree.get_stats().rotations, 2);
        assert_eq!(tree.first_key(), Some(&2));
    }

    #[test]
    fn erase_near_nephew_mirrored() {
        let mut tree = build(&[3, 4, 1, 2]);
        assert_eq!(
            shape(&tree),
            vec![(3, false), (1, false), (2, true), (4, false)]
        );
        tree.erase(&4);
        assert_eq!(shape(&tree), vec![(2, false), (1, false), (3, false)]);
        assert_eq!(tree.get_stats().rotations, 2);
        assert_eq!(tree.last_key(), Some(&3));
    }

    #[test]
    fn erase_far_nephew_rotates_once() {
        let mut tree = build(&[2, 1, 3, 4]);
        tree.erase(&1);
        assert_eq!(shape(&tree), vec![(3, false), (2, false), (4, false)]);
        assert_eq!(tree.get_stats().rotations, 1);
        assert_eq!(tree.first_key(), Some(&2));
    }

    #[test]
    fn erase_far_nephew_mirrored() {
        let mut tree = build(&[3, 2, 4, 1]);
        assert_eq!(
            shape(&tree),
            vec![(3, false), (2, false), (1, true), (4, false)]
        );
        tree.erase(&4);
        assert_eq!(shape(&tree), vec![(2, false), (1, false), (3, false)]);
        assert_eq!(tree.get_stats().rotations, 1);
        assert_eq!(tree.last_key(), Some(&3));
    }
}
