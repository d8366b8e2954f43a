//! Slot roles and the per-transaction context.

use core::fmt;

#[cfg(feature = "serde-types")]
use serde::{Deserialize, Serialize};

use nocta_core::{Hash32, ProgramId, Record};
use nocta_state::{LocalDataTree, MerklePath};

use crate::error::VerificationError;

/// Whether a slot consumes an old record or produces a new one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde-types", derive(Serialize, Deserialize))]
pub enum SlotRole {
    /// Old record; its death predicate runs.
    Death,
    /// New record; its birth predicate runs.
    Birth,
}

impl SlotRole {
    /// Program id the record declares for this role.
    pub fn declared_program_id(self, record: &Record) -> ProgramId {
        match self {
            SlotRole::Death => record.death_program_id,
            SlotRole::Birth => record.birth_program_id,
        }
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRole::Death => f.write_str("death"),
            SlotRole::Birth => f.write_str("birth"),
        }
    }
}

/// Public and private inputs needed to check local-data membership.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde-types", derive(Serialize, Deserialize))]
pub struct TransactionContext {
    /// Leaf whose membership `path` attests.
    pub leaf_index: usize,
    /// Claimed local-data root.
    pub root: Hash32,
    /// Authentication path for `leaf_index`.
    pub path: MerklePath,
    /// Transaction memo, hashed into every leaf.
    pub memo: Vec<u8>,
    /// Network the transaction targets.
    pub network_id: u8,
    /// One leaf randomizer per slot, in slot order.
    pub leaf_randomness: Vec<Hash32>,
}

impl TransactionContext {
    /// Context with leaf inputs only; root and path still to be filled in by
    /// [`TransactionContext::anchor`].
    pub fn unanchored(memo: Vec<u8>, network_id: u8, leaf_randomness: Vec<Hash32>) -> Self {
        Self {
            leaf_index: 0,
            root: Hash32::zero(),
            path: MerklePath::default(),
            memo,
            network_id,
            leaf_randomness,
        }
    }

    /// Anchor the context to `tree`, attesting membership of `leaf_index`.
    pub fn anchor(mut self, tree: &LocalDataTree, leaf_index: usize) -> Result<Self, VerificationError> {
        self.path = tree.path(leaf_index)?;
        self.root = tree.root();
        self.leaf_index = leaf_index;
        Ok(self)
    }
}
