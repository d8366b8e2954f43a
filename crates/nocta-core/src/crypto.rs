//! Commitment scheme and serial-number derivation.
//!
//! Important: this crate intentionally does NOT implement novel cryptography.
//! Both constructions are domain-separated BLAKE3 over canonical Borsh
//! encodings; the proof layer that would attest to them is out of scope.

use crate::constants::*;
use crate::serialization::{hash32, to_bytes};
use crate::types::{
    Address, Amount, Commitment, CommitmentRandomness, CoreError, Hash32, OwnerSecret, Payload,
    ProgramId, SerialNonce, SerialNumber,
};

/// Record commitment.
///
/// `cm = BLAKE3(DS_COMMITMENT || borsh(owner, value, payload, birth, death, nonce, randomness))`
///
/// Used both when a record is born and when finalization re-derives it, so
/// the field order here is consensus-critical.
pub fn commit(
    owner: &Address,
    value: Amount,
    payload: &Payload,
    birth_program_id: &ProgramId,
    death_program_id: &ProgramId,
    nonce: &SerialNonce,
    randomness: &CommitmentRandomness,
) -> Result<Commitment, CoreError> {
    let opening = to_bytes(&(
        owner,
        value,
        payload,
        birth_program_id,
        death_program_id,
        nonce,
        randomness,
    ))?;
    let h = hash32(DS_COMMITMENT, &opening);
    Ok(Commitment(h.0))
}

/// Serial number of a spent record.
///
/// `sn = BLAKE3(DS_SERIAL_NUMBER || owner_secret || nonce)`
pub fn derive_serial_number(owner_secret: &OwnerSecret, nonce: &SerialNonce) -> SerialNumber {
    let mut input = [0u8; ADDRESS_LEN + HASH32_LEN];
    input[..ADDRESS_LEN].copy_from_slice(owner_secret.as_bytes());
    input[ADDRESS_LEN..].copy_from_slice(nonce.as_bytes());

    let h = hash32(DS_SERIAL_NUMBER, &input);
    let mut out = [0u8; SERIAL_NUMBER_LEN];
    out.copy_from_slice(h.as_bytes());
    SerialNumber(out)
}

/// Serial-number nonce for the `index`-th new record of a transaction.
///
/// Binding the nonce to the serial numbers being spent makes new records
/// inherit their uniqueness from the consumed ones.
pub fn derive_serial_nonce(
    spent: &[SerialNumber],
    index: u32,
) -> Result<SerialNonce, CoreError> {
    let bytes = to_bytes(&(index, spent))?;
    Ok(hash32(DS_SERIAL_NONCE, &bytes))
}

/// Public address owned by `secret`.
pub fn derive_address(secret: &OwnerSecret) -> Address {
    let h: Hash32 = hash32(DS_ADDRESS, secret.as_bytes());
    Address(h.0)
}
