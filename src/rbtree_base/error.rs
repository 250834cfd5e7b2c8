use std::collections::TryReserveError;

use thiserror::Error;

use super::node::NodeId;

/// Failure of the node storage to hand out a slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("node storage exhausted: limit of {limit} live nodes reached")]
    CapacityExhausted { limit: usize },
    #[error("node storage could not grow: {0}")]
    Reserve(#[from] TryReserveError),
}

/// Structural defect found by `RBTree::verify`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeViolation {
    #[error("root node {0} is red")]
    RedRoot(NodeId),
    #[error("red node {parent} has red child {child}")]
    RedRedEdge { parent: NodeId, child: NodeId },
    #[error("black height differs below node {node}: left {left}, right {right}")]
    BlackHeightMismatch {
        node: NodeId,
        left: usize,
        right: usize,
    },
    #[error("linked node {0} holds no key")]
    KeylessNode(NodeId),
    #[error("in-order sequence is not strictly increasing at node {0}")]
    OutOfOrder(NodeId),
    #[error("node {child} does not point back to its parent {parent}")]
    BrokenParentLink { parent: NodeId, child: NodeId },
    #[error("boundary sentinel does not track the {0} node")]
    BoundaryMismatch(&'static str),
    #[error("tree counts {counted} nodes but records size {recorded}")]
    SizeMismatch { counted: usize, recorded: usize },
    #[error("sentinel {0} is not black")]
    SentinelColored(NodeId),
}
