//! Local-data tree errors.

use nocta_core::CoreError;
use thiserror::Error;

/// Errors produced while building or querying a local-data tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A tree needs at least one leaf.
    #[error("local-data tree has no leaves")]
    Empty,

    /// More leaves than a single transaction may carry.
    #[error("too many leaves: {0}")]
    TooManyLeaves(usize),

    /// A leaf index outside the tree was requested.
    #[error("leaf index {index} out of range for {len} leaves")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves in the tree.
        len: usize,
    },

    /// Leaf fields could not be encoded.
    #[error(transparent)]
    Core(#[from] CoreError),
}
