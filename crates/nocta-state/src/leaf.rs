// Consensus-critical. Changes require a version bump + tests.
//! Local-data leaf derivation.
//!
//! One leaf per slot, in slot order (old records, then new records):
//!
//! `leaf = BLAKE3(DS_LOCAL_DATA_LEAF || borsh(slot_index, identity, registers_hash, memo, network_id, randomness))`

use borsh::BorshSerialize;

use nocta_core::{hash32, to_bytes, Commitment, Hash32, SerialNumber};

use crate::error::TreeError;

/// Domain separator for local-data leaves.
const DS_LOCAL_DATA_LEAF: &[u8] = b"NOCTA::LOCAL_DATA_LEAF::V0";

/// What a slot contributes as the identity of its record.
///
/// Consumed records are identified by their serial number and produced
/// records by their commitment.
#[derive(Clone, Copy, PartialEq, Eq, Debug, BorshSerialize)]
pub enum RecordIdentity {
    /// Serial number of a consumed (old) record.
    Spent(SerialNumber),
    /// Commitment of a produced (new) record.
    Created(Commitment),
}

/// Fields hashed into a single local-data leaf.
#[derive(Clone, Debug, BorshSerialize)]
pub struct LeafInput<'a> {
    /// Position of the slot in the transaction.
    pub slot_index: u32,
    /// Record identity for the slot.
    pub identity: RecordIdentity,
    /// Digest of the registers produced by the slot's predicate.
    pub register_snapshot_hash: Hash32,
    /// Transaction memo.
    pub memo: &'a [u8],
    /// Network the transaction targets.
    pub network_id: u8,
    /// Per-slot leaf randomizer.
    pub leaf_randomness: Hash32,
}

impl LeafInput<'_> {
    /// Hash the inputs into a leaf.
    pub fn hash(&self) -> Result<Hash32, TreeError> {
        let bytes = to_bytes(self)?;
        Ok(hash32(DS_LOCAL_DATA_LEAF, &bytes))
    }
}
