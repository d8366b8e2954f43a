//! Protocol-wide constants for Nocta v0.

/// Length in bytes of a 32-byte hash.
pub const HASH32_LEN: usize = 32;

/// Length in bytes of a record commitment.
pub const COMMITMENT_LEN: usize = 32;

/// Length in bytes of a serial number.
pub const SERIAL_NUMBER_LEN: usize = 32;

/// Length in bytes of a predicate program identifier.
pub const PROGRAM_ID_LEN: usize = 32;

/// Length in bytes of an owner address or owner secret.
pub const ADDRESS_LEN: usize = 32;

/// Default number of old-record slots per transaction.
pub const DEFAULT_OLD_SLOTS: usize = 2;

/// Default number of new-record slots per transaction.
pub const DEFAULT_NEW_SLOTS: usize = 2;

/// Maximum number of slots (old + new) accepted in a single transaction.
///
/// This is a DoS-prevention bound, not a protocol limitation.
pub const MAX_SLOTS_PER_TX: usize = 64;

/// Program identifier carried by dummy (padding) records.
///
/// The dummy predicate only accepts records declaring this id, so a real
/// record can never be consumed or produced through a padding slot.
pub const DUMMY_PROGRAM_ID_BYTES: [u8; PROGRAM_ID_LEN] = [0u8; PROGRAM_ID_LEN];

/// Domain separator used when deriving record commitments.
///
/// Prevents cross-domain hash collisions.
pub const DS_COMMITMENT: &[u8] = b"NOCTA::COMMITMENT::V0";

/// Domain separator used when deriving serial numbers.
///
/// Prevents cross-domain hash collisions.
pub const DS_SERIAL_NUMBER: &[u8] = b"NOCTA::SERIAL_NUMBER::V0";

/// Domain separator used when deriving serial-number nonces for new records.
pub const DS_SERIAL_NONCE: &[u8] = b"NOCTA::SERIAL_NONCE::V0";

/// Domain separator used when deriving an owner address from its secret.
pub const DS_ADDRESS: &[u8] = b"NOCTA::ADDRESS::V0";

/// Domain separator used when hashing a register snapshot.
pub const DS_REGISTERS: &[u8] = b"NOCTA::REGISTERS::V0";
