//! Verifier configuration.

use serde::{Deserialize, Serialize};

use nocta_core::{DEFAULT_NEW_SLOTS, DEFAULT_OLD_SLOTS, MAX_SLOTS_PER_TX};

use crate::error::VerificationError;

/// Shape and network parameters a [`crate::TransactionVerifier`] enforces.
///
/// Deserializes from any serde format; missing fields take their defaults
/// (2 old slots, 2 new slots, any network).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Number of old-record (death) slots per transaction.
    pub old_slots: usize,
    /// Number of new-record (birth) slots per transaction.
    pub new_slots: usize,
    /// If set, contexts naming another network are rejected.
    pub network_id: Option<u8>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            old_slots: DEFAULT_OLD_SLOTS,
            new_slots: DEFAULT_NEW_SLOTS,
            network_id: None,
        }
    }
}

impl VerifierConfig {
    /// Config for an explicit arity, not pinned to a network.
    pub fn with_arity(old_slots: usize, new_slots: usize) -> Self {
        Self {
            old_slots,
            new_slots,
            network_id: None,
        }
    }

    /// Pin the verifier to `network_id`.
    pub fn pinned_to(mut self, network_id: u8) -> Self {
        self.network_id = Some(network_id);
        self
    }

    /// Total number of slots.
    pub fn slot_count(&self) -> usize {
        self.old_slots.saturating_add(self.new_slots)
    }

    /// Check the arity is usable.
    pub fn validate(&self) -> Result<(), VerificationError> {
        match self.slot_count() {
            0 => Err(VerificationError::InvalidContext("transaction has no slots")),
            n if n > MAX_SLOTS_PER_TX => Err(VerificationError::InvalidContext("too many slots")),
            _ => Ok(()),
        }
    }
}
