use std::fmt::Debug;
use std::marker::PhantomData;

use super::storage::NodeStorage;

// Traits bound
pub trait KeyComparator<T>: Clone + Debug {
    fn new() -> Self;
    fn less(&self, lhs: &T, rhs: &T) -> bool;
}

pub trait RBTreeParams: Clone + Debug {
    type KeyType: Debug;
    type KeyCompareType: KeyComparator<Self::KeyType>;
    type StorageType: NodeStorage<Self::KeyType>;
    const SELF_VERIFY: bool;
}

pub struct _RBTree<TKey, TCompare, TStorage, const SELF_VERIFY: bool = false> {
    _phantom_key: PhantomData<TKey>,
    _phantom_compare: PhantomData<TCompare>,
    _phantom_storage: PhantomData<TStorage>,
}

// marker bundle, no bounds on its parameters
impl<TKey, TCompare, TStorage, const SELF_VERIFY: bool> Clone
    for _RBTree<TKey, TCompare, TStorage, SELF_VERIFY>
{
    fn clone(&self) -> Self {
        Self {
            _phantom_key: PhantomData,
            _phantom_compare: PhantomData,
            _phantom_storage: PhantomData,
        }
    }
}

impl<TKey, TCompare, TStorage, const SELF_VERIFY: bool> Debug
    for _RBTree<TKey, TCompare, TStorage, SELF_VERIFY>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("_RBTree")
            .field("self_verify", &SELF_VERIFY)
            .finish()
    }
}

impl<TKey, TCompare, TStorage, const SELF_VERIFY: bool> RBTreeParams
    for _RBTree<TKey, TCompare, TStorage, SELF_VERIFY>
where
    TKey: Debug,
    TCompare: KeyComparator<TKey>,
    TStorage: NodeStorage<TKey>,
{
    type KeyType = TKey;
    type KeyCompareType = TCompare;
    type StorageType = TStorage;
    const SELF_VERIFY: bool = SELF_VERIFY;
}

#[cfg(test)]
#[test]
fn test_rbtree_params() {
    use super::{storage::ArenaStorage, DefaultKeyComparator};

    type Plain = _RBTree<u64, DefaultKeyComparator<u64>, ArenaStorage<u64>>;
    type Checked = _RBTree<u64, DefaultKeyComparator<u64>, ArenaStorage<u64>, true>;
    assert!(!Plain::SELF_VERIFY);
    assert!(Checked::SELF_VERIFY);
}
