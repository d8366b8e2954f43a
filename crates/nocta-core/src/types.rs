// Consensus-critical. Changes require a version bump + tests.
//! Canonical protocol types for Nocta v0.
//!
//! This module defines the record model shared by every layer: fixed-size
//! byte identifiers, amounts, payload/register maps and the record itself.
//! All types here are Borsh-encoded for hashing; the encoding must remain
//! stable once released.

use std::collections::BTreeMap;

use crate::constants::*;
use borsh::{BorshDeserialize, BorshSerialize};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors related to parsing, validation, or construction of core protocol types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Hex string had an unexpected byte length.
    #[error("invalid hex length: expected {expected} bytes, got {got} bytes")]
    InvalidHexLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        got: usize,
    },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Arithmetic overflow or underflow occurred.
    #[error("amount overflow or underflow")]
    AmountOverflow,

    /// A value violated protocol constraints.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

fn parse_hex_array<const N: usize>(s: &str) -> Result<[u8; N], CoreError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s)?;
    if bytes.len() != N {
        return Err(CoreError::InvalidHexLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Declares a public fixed-size byte identifier with hex `Debug`/`Display`/`FromStr`.
macro_rules! byte_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Returns an all-zero value.
            pub const fn zero() -> Self {
                Self([0u8; $len])
            }

            /// Returns the underlying byte array.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl From<$name> for [u8; $len] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_array::<{ $len }>(s).map(Self)
            }
        }
    };
}

byte_id!(
    /// Fixed-size 32-byte hash used throughout the protocol.
    Hash32,
    HASH32_LEN
);

byte_id!(
    /// Binding and hiding commitment to a record's fields.
    Commitment,
    COMMITMENT_LEN
);

byte_id!(
    /// Per-spend identifier marking a record as consumed.
    SerialNumber,
    SERIAL_NUMBER_LEN
);

byte_id!(
    /// Identifier of a birth or death predicate program.
    ProgramId,
    PROGRAM_ID_LEN
);

byte_id!(
    /// Public owner address, derived from the owner's secret.
    Address,
    ADDRESS_LEN
);

impl ProgramId {
    /// The identifier declared by dummy (padding) records.
    pub const fn dummy() -> Self {
        Self(DUMMY_PROGRAM_ID_BYTES)
    }

    /// Whether this is the dummy program identifier.
    pub fn is_dummy(&self) -> bool {
        self.0 == DUMMY_PROGRAM_ID_BYTES
    }
}

/// Nonce from which a record's serial number is derived.
pub type SerialNonce = Hash32;

/// Randomness that makes a record commitment hiding.
pub type CommitmentRandomness = Hash32;

/// Secret key material of a record owner.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnerSecret(pub [u8; ADDRESS_LEN]);

impl OwnerSecret {
    /// Returns the underlying secret bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Debug for OwnerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OwnerSecret(..)")
    }
}

/// Amount expressed in the smallest unit ("atoms").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Amount(pub u64);

impl Amount {
    /// Returns a zero amount.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Constructs an amount from atoms.
    pub const fn from_atoms(atoms: u64) -> Self {
        Self(atoms)
    }

    /// Returns the underlying atom value.
    pub const fn atoms(self) -> u64 {
        self.0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Result<Self, CoreError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Result<Self, CoreError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(CoreError::AmountOverflow)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({} atoms)", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} atoms", self.0)
    }
}

/// A single named value held in a payload or a register snapshot.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegisterValue {
    /// Opaque bytes (identifiers, hashes).
    Bytes(Vec<u8>),
    /// Unsigned integer (balances, counters).
    U64(u64),
}

impl RegisterValue {
    /// Returns the integer value, if this is a `U64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RegisterValue::U64(v) => Some(*v),
            RegisterValue::Bytes(_) => None,
        }
    }

    /// Returns the byte value, if this is a `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RegisterValue::Bytes(b) => Some(b),
            RegisterValue::U64(_) => None,
        }
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            RegisterValue::U64(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for RegisterValue {
    fn from(value: u64) -> Self {
        RegisterValue::U64(value)
    }
}

impl From<Vec<u8>> for RegisterValue {
    fn from(value: Vec<u8>) -> Self {
        RegisterValue::Bytes(value)
    }
}

impl<const N: usize> From<[u8; N]> for RegisterValue {
    fn from(value: [u8; N]) -> Self {
        RegisterValue::Bytes(value.to_vec())
    }
}

/// Application-defined private data carried inside a record.
///
/// Fields are kept in name order so the encoding (and therefore the
/// commitment) does not depend on insertion order.
#[derive(Clone, PartialEq, Eq, Debug, Default, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Payload(BTreeMap<String, RegisterValue>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RegisterValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&RegisterValue> {
        self.0.get(name)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An immutable snapshot of transaction-scoped intermediate values.
///
/// Snapshots are never mutated in place: [`Registers::with`] and
/// [`Registers::without`] return a fresh snapshot and leave `self` untouched.
#[derive(Clone, PartialEq, Eq, Debug, Default, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Registers(BTreeMap<String, RegisterValue>);

impl Registers {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a register by name.
    pub fn get(&self, name: &str) -> Option<&RegisterValue> {
        self.0.get(name)
    }

    /// Look up an integer register by name.
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(RegisterValue::as_u64)
    }

    /// Returns a new snapshot with `name` set to `value`.
    pub fn with(&self, name: impl Into<String>, value: impl Into<RegisterValue>) -> Self {
        let mut next = self.0.clone();
        next.insert(name.into(), value.into());
        Self(next)
    }

    /// Returns a new snapshot without `name`.
    pub fn without(&self, name: &str) -> Self {
        let mut next = self.0.clone();
        next.remove(name);
        Self(next)
    }

    /// Iterate registers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Domain-separated digest summarizing this snapshot.
    pub fn snapshot_hash(&self) -> Result<Hash32, CoreError> {
        crate::serialization::register_snapshot_hash(self)
    }
}

impl<K: Into<String>, V: Into<RegisterValue>> FromIterator<(K, V)> for Registers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A committed unit of value and state.
///
/// `commitment` is derived from the seven opening fields; `serial_number` is
/// attached only when the owner spends the record.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Owner address.
    pub owner: Address,
    /// Value held by the record.
    pub value: Amount,
    /// Application-defined private data.
    pub payload: Payload,
    /// Predicate that must accept the record's creation.
    pub birth_program_id: ProgramId,
    /// Predicate that must accept the record's consumption.
    pub death_program_id: ProgramId,
    /// Nonce feeding serial-number derivation.
    pub serial_number_nonce: SerialNonce,
    /// Commitment randomness.
    pub commitment_randomness: CommitmentRandomness,
    /// Stored commitment over the fields above.
    pub commitment: Commitment,
    /// Serial number, present once the record is being spent.
    pub serial_number: Option<SerialNumber>,
}

impl Record {
    /// Build a record and compute its commitment.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: Address,
        value: Amount,
        payload: Payload,
        birth_program_id: ProgramId,
        death_program_id: ProgramId,
        serial_number_nonce: SerialNonce,
        commitment_randomness: CommitmentRandomness,
    ) -> Result<Self, CoreError> {
        let commitment = crate::crypto::commit(
            &owner,
            value,
            &payload,
            &birth_program_id,
            &death_program_id,
            &serial_number_nonce,
            &commitment_randomness,
        )?;
        Ok(Self {
            owner,
            value,
            payload,
            birth_program_id,
            death_program_id,
            serial_number_nonce,
            commitment_randomness,
            commitment,
            serial_number: None,
        })
    }

    /// Build a zero-value padding record governed by the dummy program.
    pub fn dummy(
        owner: Address,
        serial_number_nonce: SerialNonce,
        commitment_randomness: CommitmentRandomness,
    ) -> Result<Self, CoreError> {
        Self::new(
            owner,
            Amount::zero(),
            Payload::new(),
            ProgramId::dummy(),
            ProgramId::dummy(),
            serial_number_nonce,
            commitment_randomness,
        )
    }

    /// Recompute the commitment from the record's opening fields.
    pub fn recompute_commitment(&self) -> Result<Commitment, CoreError> {
        crate::crypto::commit(
            &self.owner,
            self.value,
            &self.payload,
            &self.birth_program_id,
            &self.death_program_id,
            &self.serial_number_nonce,
            &self.commitment_randomness,
        )
    }

    /// Attach the serial number derived from the owner's secret.
    ///
    /// Fails if the secret does not belong to `owner`.
    pub fn spend(mut self, secret: &OwnerSecret) -> Result<Self, CoreError> {
        if crate::crypto::derive_address(secret) != self.owner {
            return Err(CoreError::InvalidValue("secret does not match record owner"));
        }
        self.serial_number = Some(crate::crypto::derive_serial_number(
            secret,
            &self.serial_number_nonce,
        ));
        Ok(self)
    }

    /// Whether both program ids are the dummy program.
    pub fn is_dummy(&self) -> bool {
        self.birth_program_id.is_dummy() && self.death_program_id.is_dummy()
    }
}
