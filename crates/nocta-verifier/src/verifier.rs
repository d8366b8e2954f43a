// Consensus-critical. Changes require a version bump + tests.
//! Transaction verifier.
//!
//! State machine:
//!
//! `Init -> Executing(0) -> ... -> Executing(N-1) -> Finalizing -> Accepted | Rejected`
//!
//! Slots run strictly in order (old records, then new records), each
//! predicate seeing only the snapshot produced by the previous slot. The
//! first failure rejects the transaction; nothing outside the call is touched
//! before acceptance, so a rejection needs no cleanup.

use hashbrown::HashSet;
use tracing::{debug, trace, warn};

use nocta_core::{Hash32, Record, Registers, MAX_SLOTS_PER_TX};
use nocta_state::{LeafInput, LocalDataTree, RecordIdentity};

use crate::config::VerifierConfig;
use crate::context::{SlotRole, TransactionContext};
use crate::error::{Stage, VerificationError};
use crate::executor::execute;
use crate::predicate::PredicateRef;

/// Verifies transactions of a fixed shape.
#[derive(Clone, Debug, Default)]
pub struct TransactionVerifier {
    config: VerifierConfig,
}

impl TransactionVerifier {
    /// Create a verifier enforcing `config`.
    pub fn new(config: VerifierConfig) -> Result<Self, VerificationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The enforced configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify one transaction, returning the final registers on acceptance.
    pub fn verify<F>(
        &self,
        old_records: &[Record],
        new_records: &[Record],
        initial_registers: Registers,
        context: &TransactionContext,
        slot_predicates: &[PredicateRef],
        terminal_check: F,
    ) -> Result<Registers, VerificationError>
    where
        F: Fn(&Registers) -> bool,
    {
        let result = self.run(
            old_records,
            new_records,
            initial_registers,
            context,
            slot_predicates,
            terminal_check,
        );
        match &result {
            Ok(_) => debug!(slots = slot_predicates.len(), "transaction accepted"),
            Err(e) => warn!(stage = ?e.stage(), error = %e, "transaction rejected"),
        }
        result
    }

    /// Run every slot's predicate and build the local-data tree, without
    /// checking commitments, the supplied root or conservation.
    ///
    /// Provers use this to obtain the root and paths the verifier will expect.
    pub fn prepare_local_data(
        &self,
        old_records: &[Record],
        new_records: &[Record],
        initial_registers: Registers,
        context: &TransactionContext,
        slot_predicates: &[PredicateRef],
    ) -> Result<LocalDataTree, VerificationError> {
        self.check_shape(old_records, new_records, context, slot_predicates)?;
        let slots = slots(old_records, new_records);
        let snapshots = execute_slots(&slots, initial_registers, context, slot_predicates)?;
        let leaves = local_data_leaves(&slots, &snapshots, context)?;
        Ok(LocalDataTree::from_leaves(&leaves)?)
    }

    fn run<F>(
        &self,
        old_records: &[Record],
        new_records: &[Record],
        initial_registers: Registers,
        context: &TransactionContext,
        slot_predicates: &[PredicateRef],
        terminal_check: F,
    ) -> Result<Registers, VerificationError>
    where
        F: Fn(&Registers) -> bool,
    {
        trace!(stage = ?Stage::Init, "entering stage");
        self.check_shape(old_records, new_records, context, slot_predicates)?;
        let slots = slots(old_records, new_records);

        let mut snapshots = execute_slots(&slots, initial_registers, context, slot_predicates)?;

        trace!(stage = ?Stage::Finalizing, "entering stage");
        check_commitments(&slots)?;
        check_serial_numbers(&slots)?;

        let leaves = local_data_leaves(&slots, &snapshots, context)?;
        let tree = LocalDataTree::from_leaves(&leaves)?;
        if tree.root() != context.root {
            return Err(VerificationError::InvalidLocalDataRoot {
                expected: context.root,
                actual: tree.root(),
            });
        }
        if !context
            .path
            .verify(&leaves[context.leaf_index], context.leaf_index, &context.root)
        {
            return Err(VerificationError::InvalidMembershipPath {
                leaf_index: context.leaf_index,
            });
        }

        let final_registers = snapshots
            .pop()
            .ok_or(VerificationError::InvalidContext("transaction has no slots"))?;
        if !terminal_check(&final_registers) {
            return Err(VerificationError::ConservationViolation);
        }
        Ok(final_registers)
    }

    fn check_shape(
        &self,
        old_records: &[Record],
        new_records: &[Record],
        context: &TransactionContext,
        slot_predicates: &[PredicateRef],
    ) -> Result<(), VerificationError> {
        let cfg = &self.config;
        if old_records.len() != cfg.old_slots || new_records.len() != cfg.new_slots {
            return Err(VerificationError::ArityMismatch {
                expected_old: cfg.old_slots,
                expected_new: cfg.new_slots,
                old: old_records.len(),
                new: new_records.len(),
            });
        }
        let slot_count = cfg.slot_count();
        if slot_count == 0 {
            return Err(VerificationError::InvalidContext("transaction has no slots"));
        }
        if slot_count > MAX_SLOTS_PER_TX {
            return Err(VerificationError::InvalidContext("too many slots"));
        }
        if slot_predicates.len() != slot_count {
            return Err(VerificationError::PredicateCountMismatch {
                expected: slot_count,
                got: slot_predicates.len(),
            });
        }
        if context.leaf_randomness.len() != slot_count {
            return Err(VerificationError::InvalidContext(
                "expected one leaf randomizer per slot",
            ));
        }
        if context.leaf_index >= slot_count {
            return Err(VerificationError::InvalidContext("leaf index out of range"));
        }
        if let Some(expected) = cfg.network_id {
            if context.network_id != expected {
                return Err(VerificationError::NetworkMismatch {
                    expected,
                    actual: context.network_id,
                });
            }
        }
        Ok(())
    }
}

/// Verify a transaction whose arity is taken from the supplied record lists.
pub fn verify_transaction<F>(
    old_records: &[Record],
    new_records: &[Record],
    initial_registers: Registers,
    context: &TransactionContext,
    slot_predicates: &[PredicateRef],
    terminal_check: F,
) -> Result<Registers, VerificationError>
where
    F: Fn(&Registers) -> bool,
{
    let verifier = TransactionVerifier::new(VerifierConfig::with_arity(
        old_records.len(),
        new_records.len(),
    ))?;
    verifier.verify(
        old_records,
        new_records,
        initial_registers,
        context,
        slot_predicates,
        terminal_check,
    )
}

/// Slots in execution order: old records, then new records.
fn slots<'a>(old_records: &'a [Record], new_records: &'a [Record]) -> Vec<(SlotRole, &'a Record)> {
    old_records
        .iter()
        .map(|r| (SlotRole::Death, r))
        .chain(new_records.iter().map(|r| (SlotRole::Birth, r)))
        .collect()
}

/// Thread registers through every slot, returning each slot's output snapshot.
fn execute_slots(
    slots: &[(SlotRole, &Record)],
    initial_registers: Registers,
    context: &TransactionContext,
    slot_predicates: &[PredicateRef],
) -> Result<Vec<Registers>, VerificationError> {
    let mut snapshots: Vec<Registers> = Vec::with_capacity(slots.len());
    for (slot, ((role, record), predicate)) in slots.iter().zip(slot_predicates).enumerate() {
        trace!(stage = ?Stage::Executing(slot), "entering stage");
        let registers_in = snapshots.last().unwrap_or(&initial_registers);
        let registers_out = execute(slot, *role, predicate, registers_in, record, context)?;
        debug!(slot, %role, program = %predicate.id(), "slot executed");
        snapshots.push(registers_out);
    }
    Ok(snapshots)
}

fn check_commitments(slots: &[(SlotRole, &Record)]) -> Result<(), VerificationError> {
    for (slot, (_, record)) in slots.iter().enumerate() {
        let recomputed = record.recompute_commitment()?;
        if recomputed != record.commitment {
            return Err(VerificationError::InvalidCommitment {
                slot,
                stored: record.commitment,
                recomputed,
            });
        }
    }
    Ok(())
}

/// Every consumed record carries a serial number, and none repeats.
fn check_serial_numbers(slots: &[(SlotRole, &Record)]) -> Result<(), VerificationError> {
    let mut seen = HashSet::new();
    for (slot, (role, record)) in slots.iter().enumerate() {
        if *role != SlotRole::Death {
            continue;
        }
        let sn = record
            .serial_number
            .ok_or(VerificationError::MissingSerialNumber { slot })?;
        if !seen.insert(sn) {
            return Err(VerificationError::DuplicateSerialNumber { slot });
        }
    }
    Ok(())
}

fn local_data_leaves(
    slots: &[(SlotRole, &Record)],
    snapshots: &[Registers],
    context: &TransactionContext,
) -> Result<Vec<Hash32>, VerificationError> {
    slots
        .iter()
        .zip(snapshots)
        .zip(&context.leaf_randomness)
        .enumerate()
        .map(|(slot, (((role, record), registers), randomness))| -> Result<Hash32, VerificationError> {
            let identity = match role {
                SlotRole::Death => RecordIdentity::Spent(
                    record
                        .serial_number
                        .ok_or(VerificationError::MissingSerialNumber { slot })?,
                ),
                SlotRole::Birth => RecordIdentity::Created(record.commitment),
            };
            let leaf = LeafInput {
                slot_index: slot as u32,
                identity,
                register_snapshot_hash: registers.snapshot_hash()?,
                memo: &context.memo,
                network_id: context.network_id,
                leaf_randomness: *randomness,
            }
            .hash()?;
            Ok(leaf)
        })
        .collect()
}
