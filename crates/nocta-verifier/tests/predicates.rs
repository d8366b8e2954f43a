mod common;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use common::*;
use nocta_core::{Address, Hash32, ProgramId, Record, Registers};
use nocta_verifier::{
    execute, resolve_predicates, PredicateLoader, PredicateRef, ProgramRegistry, SlotRole,
    TransactionContext, VerificationError, VerifierConfig,
};
use proptest::prelude::*;

fn registry() -> ProgramRegistry {
    let mut registry = ProgramRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    assert!(registry.register(TokenPredicate {
        id: DEATH_ID,
        calls: calls.clone(),
    }));
    assert!(registry.register(TokenPredicate {
        id: BIRTH_ID,
        calls,
    }));
    registry
}

#[test]
fn registry_resolves_slot_programs() {
    let registry = registry();
    assert_eq!(registry.len(), 2);

    let ids = [DEATH_ID, ProgramId::dummy(), BIRTH_ID, ProgramId::dummy()];
    let resolved = resolve_predicates(&registry, &ids).expect("resolved");
    let resolved_ids: Vec<ProgramId> = resolved.iter().map(PredicateRef::id).collect();
    assert_eq!(resolved_ids, ids);
    assert!(resolved[1].is_dummy());
    assert!(!resolved[0].is_dummy());
}

#[test]
fn registry_refuses_duplicates_and_dummy_id() {
    let mut registry = registry();
    let calls = Arc::new(AtomicUsize::new(0));
    assert!(!registry.register(TokenPredicate {
        id: DEATH_ID,
        calls: calls.clone(),
    }));
    assert!(!registry.register(TokenPredicate {
        id: ProgramId::dummy(),
        calls,
    }));
    assert_eq!(registry.len(), 2);
}

#[test]
fn unknown_program_is_reported() {
    let registry = registry();
    let unknown = ProgramId([0x99; 32]);
    assert!(registry.load(&unknown).is_none());
    let err = resolve_predicates(&registry, &[DEATH_ID, unknown]).expect_err("unknown");
    assert!(matches!(err, VerificationError::UnknownPredicate(id) if id == unknown));
}

#[test]
fn resolved_predicates_verify_a_transfer() {
    let mut fx = transfer(4, 4);
    let ids: Vec<ProgramId> = fx.slot_predicates.iter().map(PredicateRef::id).collect();
    fx.slot_predicates = resolve_predicates(&registry(), &ids).expect("resolved");
    fx.verify().expect("accepted");
}

#[test]
fn config_parses_from_json() {
    let cfg: VerifierConfig =
        serde_json::from_str(r#"{"old_slots":1,"new_slots":3,"network_id":7}"#).expect("json");
    assert_eq!(cfg, VerifierConfig::with_arity(1, 3).pinned_to(7));

    let defaults: VerifierConfig = serde_json::from_str("{}").expect("json");
    assert_eq!(defaults, VerifierConfig::default());

    assert!(serde_json::from_str::<VerifierConfig>(r#"{"slots":4}"#).is_err());
}

fn dummy_record() -> Record {
    Record::dummy(Address::zero(), Hash32::zero(), Hash32::zero()).expect("dummy")
}

fn arb_registers() -> impl Strategy<Value = Registers> {
    prop::collection::vec(
        (
            "[a-z_]{1,12}",
            prop_oneof![
                any::<u64>().prop_map(nocta_core::RegisterValue::U64),
                prop::collection::vec(any::<u8>(), 0..40).prop_map(nocta_core::RegisterValue::Bytes),
            ],
        ),
        0..8,
    )
    .prop_map(|fields| fields.into_iter().collect())
}

proptest! {
    #[test]
    fn dummy_predicate_is_identity(regs in arb_registers(), slot in 0usize..8, death in any::<bool>()) {
        let role = if death { SlotRole::Death } else { SlotRole::Birth };
        let out = execute(
            slot,
            role,
            &PredicateRef::Dummy,
            &regs,
            &dummy_record(),
            &TransactionContext::default(),
        )
        .expect("dummy");
        prop_assert_eq!(&out, &regs);
        prop_assert_eq!(
            out.snapshot_hash().expect("hash"),
            regs.snapshot_hash().expect("hash")
        );
    }
}
