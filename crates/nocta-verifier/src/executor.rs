// Consensus-critical. Changes require a version bump + tests.
//! Predicate executor.
//!
//! Runs one slot as a pure state transition: `registers_in` is borrowed and
//! never mutated, and a fresh snapshot is returned on success.

use nocta_core::{Record, Registers};

use crate::context::{SlotRole, TransactionContext};
use crate::error::VerificationError;
use crate::predicate::PredicateRef;

/// Execute `predicate` for the record occupying `slot`.
///
/// Checks, in order:
/// - the record declares the predicate's id for its role
/// - every field the predicate binds agrees between payload and registers
///
/// then hands the snapshot to the predicate. The dummy predicate returns
/// `registers_in` unchanged.
pub fn execute(
    slot: usize,
    role: SlotRole,
    predicate: &PredicateRef,
    registers_in: &Registers,
    record: &Record,
    context: &TransactionContext,
) -> Result<Registers, VerificationError> {
    let expected = predicate.id();
    let actual = role.declared_program_id(record);
    if actual != expected {
        return Err(VerificationError::PredicateIdentityMismatch {
            slot,
            role,
            expected,
            actual,
        });
    }

    match predicate {
        PredicateRef::Dummy => Ok(registers_in.clone()),
        PredicateRef::Program(program) => {
            check_bound_fields(slot, program.bound_fields(), record, registers_in)?;
            program
                .apply(role, registers_in, record, context)
                .map_err(|source| VerificationError::PredicateRejected { slot, source })
        }
    }
}

/// A bound field must be present on both sides and equal.
fn check_bound_fields(
    slot: usize,
    fields: &[&'static str],
    record: &Record,
    registers: &Registers,
) -> Result<(), VerificationError> {
    for field in fields {
        let expected = registers.get(field);
        let actual = record.payload.get(field);
        match (expected, actual) {
            (Some(e), Some(a)) if e == a => {}
            _ => {
                return Err(VerificationError::PayloadMismatch {
                    slot,
                    field: (*field).to_string(),
                    expected: expected.cloned(),
                    actual: actual.cloned(),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredicateError;
    use crate::predicate::Predicate;
    use nocta_core::{Address, Amount, Hash32, Payload, ProgramId};

    struct Bump;

    impl Predicate for Bump {
        fn id(&self) -> ProgramId {
            ProgramId([0x42; 32])
        }

        fn bound_fields(&self) -> &[&'static str] {
            &["kind"]
        }

        fn apply(
            &self,
            _role: SlotRole,
            registers: &Registers,
            _record: &Record,
            _context: &TransactionContext,
        ) -> Result<Registers, PredicateError> {
            let n = registers
                .get_u64("n")
                .ok_or_else(|| PredicateError::MissingRegister("n".into()))?;
            Ok(registers.with("n", n + 1))
        }
    }

    fn record(program: ProgramId, payload: Payload) -> Record {
        Record::new(
            Address::zero(),
            Amount::zero(),
            payload,
            program,
            program,
            Hash32::zero(),
            Hash32::zero(),
        )
        .expect("record")
    }

    #[test]
    fn program_predicate_produces_fresh_snapshot() {
        let regs: Registers = [("kind", 1u64), ("n", 0u64)].into_iter().collect();
        let rec = record(ProgramId([0x42; 32]), Payload::new().with("kind", 1u64));
        let out = execute(
            0,
            SlotRole::Death,
            &PredicateRef::program(Bump),
            &regs,
            &rec,
            &TransactionContext::default(),
        )
        .expect("execute");
        assert_eq!(out.get_u64("n"), Some(1));
        assert_eq!(regs.get_u64("n"), Some(0));
    }

    #[test]
    fn missing_bound_field_is_a_payload_mismatch() {
        let regs: Registers = [("n", 0u64)].into_iter().collect();
        let rec = record(ProgramId([0x42; 32]), Payload::new().with("kind", 1u64));
        let err = execute(
            3,
            SlotRole::Birth,
            &PredicateRef::program(Bump),
            &regs,
            &rec,
            &TransactionContext::default(),
        )
        .expect_err("mismatch");
        match err {
            VerificationError::PayloadMismatch {
                slot,
                field,
                expected,
                actual,
            } => {
                assert_eq!(slot, 3);
                assert_eq!(field, "kind");
                assert_eq!(expected, None);
                assert_eq!(actual, Some(1u64.into()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dummy_slot_rejects_real_record() {
        let regs = Registers::new();
        let rec = record(ProgramId([0x42; 32]), Payload::new());
        let err = execute(
            1,
            SlotRole::Death,
            &PredicateRef::Dummy,
            &regs,
            &rec,
            &TransactionContext::default(),
        )
        .expect_err("identity");
        assert!(matches!(
            err,
            VerificationError::PredicateIdentityMismatch { slot: 1, role: SlotRole::Death, .. }
        ));
    }

    #[test]
    fn predicate_failure_is_attributed_to_slot() {
        let regs: Registers = [("kind", 1u64)].into_iter().collect();
        let rec = record(ProgramId([0x42; 32]), Payload::new().with("kind", 1u64));
        let err = execute(
            2,
            SlotRole::Birth,
            &PredicateRef::program(Bump),
            &regs,
            &rec,
            &TransactionContext::default(),
        )
        .expect_err("missing n");
        assert!(matches!(
            err,
            VerificationError::PredicateRejected {
                slot: 2,
                source: PredicateError::MissingRegister(_)
            }
        ));
    }
}
