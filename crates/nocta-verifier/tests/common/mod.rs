//! Token-transfer fixtures shared by the integration tests.
//!
//! The death predicate credits the record's balance into the running
//! `value_balance` register and the birth predicate debits it, so a
//! balanced transfer ends at zero.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nocta_core::{
    derive_address, derive_serial_nonce, Amount, Hash32, OwnerSecret, Payload, ProgramId, Record,
    Registers,
};
use nocta_verifier::{
    Predicate, PredicateError, PredicateRef, SlotRole, TransactionBundle, TransactionContext,
    TransactionVerifier,
};

pub const TOKEN_ID: &str = "token_id";
pub const VALUE_BALANCE: &str = "value_balance";

pub const DEATH_ID: ProgramId = ProgramId([0xd1; 32]);
pub const BIRTH_ID: ProgramId = ProgramId([0xb1; 32]);

pub const NETWORK_ID: u8 = 1;

pub fn token(byte: u8) -> [u8; 32] {
    [byte; 32]
}

pub struct TokenPredicate {
    pub id: ProgramId,
    pub calls: Arc<AtomicUsize>,
}

impl Predicate for TokenPredicate {
    fn id(&self) -> ProgramId {
        self.id
    }

    fn bound_fields(&self) -> &[&'static str] {
        &[TOKEN_ID]
    }

    fn apply(
        &self,
        role: SlotRole,
        registers: &Registers,
        record: &Record,
        _context: &TransactionContext,
    ) -> Result<Registers, PredicateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let balance = registers
            .get_u64(VALUE_BALANCE)
            .ok_or_else(|| PredicateError::MissingRegister(VALUE_BALANCE.into()))?;
        let amount = record
            .payload
            .get(VALUE_BALANCE)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| PredicateError::MissingPayloadField(VALUE_BALANCE.into()))?;

        let next = match role {
            SlotRole::Death => balance
                .checked_add(amount)
                .ok_or(PredicateError::Rejected("balance overflow"))?,
            SlotRole::Birth => balance
                .checked_sub(amount)
                .ok_or(PredicateError::Rejected("insufficient balance"))?,
        };
        Ok(registers.with(VALUE_BALANCE, next))
    }
}

pub fn balance_is_zero(registers: &Registers) -> bool {
    registers.get_u64(VALUE_BALANCE) == Some(0)
}

pub fn registers(token_byte: u8, balance: u64) -> Registers {
    Registers::new()
        .with(TOKEN_ID, token(token_byte))
        .with(VALUE_BALANCE, balance)
}

pub fn token_payload(token_byte: u8, amount: u64) -> Payload {
    Payload::new()
        .with(TOKEN_ID, token(token_byte))
        .with(VALUE_BALANCE, amount)
}

pub struct Fixture {
    pub old_records: Vec<Record>,
    pub new_records: Vec<Record>,
    pub initial_registers: Registers,
    pub context: TransactionContext,
    pub slot_predicates: Vec<PredicateRef>,
    pub calls: Arc<AtomicUsize>,
    pub sender: OwnerSecret,
}

impl Fixture {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn verify(&self) -> Result<Registers, nocta_verifier::VerificationError> {
        nocta_verifier::verify_transaction(
            &self.old_records,
            &self.new_records,
            self.initial_registers.clone(),
            &self.context,
            &self.slot_predicates,
            balance_is_zero,
        )
    }

    pub fn bundle(&self) -> TransactionBundle {
        TransactionBundle {
            old_records: self.old_records.clone(),
            new_records: self.new_records.clone(),
            initial_registers: self.initial_registers.clone(),
            context: self.context.clone(),
            slot_predicates: self.slot_predicates.clone(),
        }
    }

    /// Re-derive root and path after the records were edited.
    pub fn reanchor(&mut self) {
        let tree = TransactionVerifier::default()
            .prepare_local_data(
                &self.old_records,
                &self.new_records,
                self.initial_registers.clone(),
                &self.context,
                &self.slot_predicates,
            )
            .expect("local data");
        self.context = self
            .context
            .clone()
            .anchor(&tree, self.context.leaf_index)
            .expect("anchor");
    }
}

/// Four-slot transfer: death on a spent token record, dummy, birth of a new
/// token record, dummy.
pub fn transfer(spent: u64, created: u64) -> Fixture {
    let sender = OwnerSecret([0x5a; 32]);
    let receiver = OwnerSecret([0xa5; 32]);
    let calls = Arc::new(AtomicUsize::new(0));

    let old_token = Record::new(
        derive_address(&sender),
        Amount::from_atoms(spent),
        token_payload(0x01, spent),
        BIRTH_ID,
        DEATH_ID,
        Hash32([0x10; 32]),
        Hash32([0x11; 32]),
    )
    .and_then(|r| r.spend(&sender))
    .expect("old token record");
    let old_dummy = Record::dummy(derive_address(&sender), Hash32([0x12; 32]), Hash32([0x13; 32]))
        .and_then(|r| r.spend(&sender))
        .expect("old dummy record");

    let spent_serials = [
        old_token.serial_number.expect("sn"),
        old_dummy.serial_number.expect("sn"),
    ];
    let new_token = Record::new(
        derive_address(&receiver),
        Amount::from_atoms(created),
        token_payload(0x01, created),
        BIRTH_ID,
        DEATH_ID,
        derive_serial_nonce(&spent_serials, 0).expect("nonce"),
        Hash32([0x20; 32]),
    )
    .expect("new token record");
    let new_dummy = Record::dummy(
        derive_address(&receiver),
        derive_serial_nonce(&spent_serials, 1).expect("nonce"),
        Hash32([0x21; 32]),
    )
    .expect("new dummy record");

    let slot_predicates = vec![
        PredicateRef::program(TokenPredicate {
            id: DEATH_ID,
            calls: calls.clone(),
        }),
        PredicateRef::Dummy,
        PredicateRef::program(TokenPredicate {
            id: BIRTH_ID,
            calls: calls.clone(),
        }),
        PredicateRef::Dummy,
    ];

    let mut fixture = Fixture {
        old_records: vec![old_token, old_dummy],
        new_records: vec![new_token, new_dummy],
        initial_registers: registers(0x01, 0),
        context: TransactionContext::unanchored(
            b"transfer".to_vec(),
            NETWORK_ID,
            (0..4u8).map(|i| Hash32([0x30 + i; 32])).collect(),
        ),
        slot_predicates,
        calls,
        sender,
    };
    fixture.reanchor();
    fixture.calls.store(0, Ordering::SeqCst);
    fixture
}
