use bitmask_enum::bitmask;

use super::node::{NodeId, NIL};

#[bitmask(u8)]
pub enum EraseFlags {
    Ok = 0,
    UpdateMin = 1,
    UpdateMax = 2,
    Rebalance = 4,
}

/// Bookkeeping for a single node removal: which boundary links must be
/// re-wired once the node is gone, and where deletion fixup starts.
#[derive(Debug)]
pub struct ErasePlan {
    pub flags: EraseFlags,
    pub new_min: NodeId,
    pub new_max: NodeId,
    pub violating: NodeId,
}

impl ErasePlan {
    pub fn new() -> Self {
        Self {
            flags: EraseFlags::Ok,
            new_min: NIL,
            new_max: NIL,
            violating: NIL,
        }
    }

    pub fn with_new_min(mut self, node: NodeId) -> Self {
        self.flags = self.flags | EraseFlags::UpdateMin;
        self.new_min = node;
        self
    }

    pub fn with_new_max(mut self, node: NodeId) -> Self {
        self.flags = self.flags | EraseFlags::UpdateMax;
        self.new_max = node;
        self
    }

    pub fn rebalance_from(&mut self, node: NodeId, removed_black: bool) {
        self.violating = node;
        if removed_black {
            self.flags = self.flags | EraseFlags::Rebalance;
        }
    }

    pub fn has(&self, flag: EraseFlags) -> bool {
        self.flags.contains(flag)
    }
}
