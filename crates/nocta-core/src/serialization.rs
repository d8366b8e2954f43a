// Consensus-critical. Changes require a version bump + tests.
//! Canonical serialization helpers.
//!
//! Rule: every value that is hashed or committed to is encoded with Borsh.
//! Do not use JSON or non-canonical formats for hashing.

use crate::constants::*;
use crate::types::{CoreError, Hash32, Registers};
use borsh::to_vec;

/// Encode a value with canonical Borsh encoding.
pub fn to_bytes<T: borsh::BorshSerialize>(v: &T) -> Result<Vec<u8>, CoreError> {
    to_vec(v).map_err(|_| CoreError::InvalidValue("borsh serialization failed"))
}

/// Hash bytes with blake3 and return 32 bytes.
pub fn hash32(domain_sep: &[u8], bytes: &[u8]) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain_sep);
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut arr = [0u8; HASH32_LEN];
    arr.copy_from_slice(out.as_bytes());
    Hash32(arr)
}

/// Register snapshot digest = BLAKE3(DS_REGISTERS || borsh(registers)).
pub fn register_snapshot_hash(registers: &Registers) -> Result<Hash32, CoreError> {
    let bytes = to_bytes(registers)?;
    Ok(hash32(DS_REGISTERS, &bytes))
}
