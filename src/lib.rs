//! An ordered, duplicate-free set built on an arena-backed red-black tree.
//!
//! The engine lives in [`rbtree_base`]: nodes are arena slots addressed by
//! index, with two reserved sentinels. `NIL` marks an absent child and
//! `BOUNDARY` links the minimum and maximum into a ring that doubles as the
//! `end()` position. [`rbtree_set`] wraps the engine in a `BTreeSet`-like
//! facade.

pub mod rbtree_base;
pub mod rbtree_set;
