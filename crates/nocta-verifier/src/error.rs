//! Verification error types.

use nocta_core::{Commitment, CoreError, Hash32, ProgramId, RegisterValue};
use nocta_state::TreeError;
use thiserror::Error;

use crate::context::SlotRole;

/// Errors an application predicate may return from [`crate::Predicate::apply`].
#[derive(Debug, Error)]
pub enum PredicateError {
    /// A register the predicate reads was absent.
    #[error("missing register `{0}`")]
    MissingRegister(String),

    /// A payload field the predicate reads was absent or mistyped.
    #[error("missing payload field `{0}`")]
    MissingPayloadField(String),

    /// The predicate's own rule rejected the slot.
    #[error("rejected: {0}")]
    Rejected(&'static str),

    /// Arithmetic or encoding failure in core types.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Where in the verification state machine a transaction currently is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    /// Shape checks before any predicate runs.
    Init,
    /// Running the predicate of the given slot.
    Executing(usize),
    /// Commitment, local-data and conservation checks.
    Finalizing,
}

/// Reasons a transaction is rejected.
///
/// All variants are deterministic for a given input; none are transient.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Record counts do not match the configured arity.
    #[error("arity mismatch: expected {expected_old} old + {expected_new} new, got {old} + {new}")]
    ArityMismatch {
        /// Configured number of old slots.
        expected_old: usize,
        /// Configured number of new slots.
        expected_new: usize,
        /// Old records supplied.
        old: usize,
        /// New records supplied.
        new: usize,
    },

    /// One predicate reference is required per slot.
    #[error("predicate count mismatch: expected {expected}, got {got}")]
    PredicateCountMismatch {
        /// Number of slots.
        expected: usize,
        /// Number of predicates supplied.
        got: usize,
    },

    /// The transaction context is malformed.
    #[error("invalid transaction context: {0}")]
    InvalidContext(&'static str),

    /// The context targets a different network.
    #[error("network mismatch: expected {expected}, got {actual}")]
    NetworkMismatch {
        /// Network the verifier is pinned to.
        expected: u8,
        /// Network named by the context.
        actual: u8,
    },

    /// No predicate is registered under the identifier.
    #[error("unknown predicate {0}")]
    UnknownPredicate(ProgramId),

    /// A bound payload field disagrees with the incoming registers.
    #[error("slot {slot}: payload field `{field}` mismatch (registers {expected:?}, record {actual:?})")]
    PayloadMismatch {
        /// Failing slot.
        slot: usize,
        /// Field name.
        field: String,
        /// Value carried by the registers.
        expected: Option<RegisterValue>,
        /// Value carried by the record payload.
        actual: Option<RegisterValue>,
    },

    /// The record declares a different program than the slot runs.
    #[error("slot {slot}: {role} program mismatch (expected {expected}, record declares {actual})")]
    PredicateIdentityMismatch {
        /// Failing slot.
        slot: usize,
        /// Role of the slot.
        role: SlotRole,
        /// Program the slot runs.
        expected: ProgramId,
        /// Program the record declares for that role.
        actual: ProgramId,
    },

    /// The application predicate rejected the slot.
    #[error("slot {slot}: predicate rejected: {source}")]
    PredicateRejected {
        /// Failing slot.
        slot: usize,
        /// Predicate failure.
        #[source]
        source: PredicateError,
    },

    /// Recomputed commitment differs from the stored one.
    #[error("slot {slot}: invalid commitment (stored {stored}, recomputed {recomputed})")]
    InvalidCommitment {
        /// Failing slot.
        slot: usize,
        /// Commitment carried by the record.
        stored: Commitment,
        /// Commitment recomputed from the opening.
        recomputed: Commitment,
    },

    /// An old record carries no serial number.
    #[error("slot {slot}: consumed record has no serial number")]
    MissingSerialNumber {
        /// Failing slot.
        slot: usize,
    },

    /// Two old records share a serial number.
    #[error("slot {slot}: duplicate serial number")]
    DuplicateSerialNumber {
        /// Slot holding the second occurrence.
        slot: usize,
    },

    /// Recomputed local-data root differs from the supplied one.
    #[error("invalid local-data root (supplied {expected}, computed {actual})")]
    InvalidLocalDataRoot {
        /// Root supplied by the context.
        expected: Hash32,
        /// Root computed from the slots.
        actual: Hash32,
    },

    /// The supplied path does not authenticate its leaf under the root.
    #[error("membership path does not authenticate leaf {leaf_index}")]
    InvalidMembershipPath {
        /// Leaf the path claims to authenticate.
        leaf_index: usize,
    },

    /// The terminal check over the final registers failed.
    #[error("conservation violation")]
    ConservationViolation,

    /// Local-data tree construction failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Core encoding failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl VerificationError {
    /// Stage of the state machine that produced this rejection.
    pub fn stage(&self) -> Stage {
        match self {
            VerificationError::ArityMismatch { .. }
            | VerificationError::PredicateCountMismatch { .. }
            | VerificationError::InvalidContext(_)
            | VerificationError::NetworkMismatch { .. }
            | VerificationError::UnknownPredicate(_) => Stage::Init,
            VerificationError::PayloadMismatch { slot, .. }
            | VerificationError::PredicateIdentityMismatch { slot, .. }
            | VerificationError::PredicateRejected { slot, .. } => Stage::Executing(*slot),
            _ => Stage::Finalizing,
        }
    }

    /// Slot the rejection is attributed to, if any.
    pub fn slot(&self) -> Option<usize> {
        match self {
            VerificationError::PayloadMismatch { slot, .. }
            | VerificationError::PredicateIdentityMismatch { slot, .. }
            | VerificationError::PredicateRejected { slot, .. }
            | VerificationError::InvalidCommitment { slot, .. }
            | VerificationError::MissingSerialNumber { slot }
            | VerificationError::DuplicateSerialNumber { slot } => Some(*slot),
            _ => None,
        }
    }
}
