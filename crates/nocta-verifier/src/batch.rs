//! Concurrent verification of independent transactions.
//!
//! Verification holds no shared mutable state, so each transaction runs as
//! its own task on the rayon pool. Results keep input order.

use rayon::prelude::*;
use tracing::debug;

use nocta_core::{Record, Registers};

use crate::context::TransactionContext;
use crate::error::VerificationError;
use crate::predicate::PredicateRef;
use crate::verifier::TransactionVerifier;

/// Everything needed to verify one transaction.
#[derive(Clone, Debug)]
pub struct TransactionBundle {
    /// Records consumed, in slot order.
    pub old_records: Vec<Record>,
    /// Records produced, in slot order.
    pub new_records: Vec<Record>,
    /// Registers before the first slot.
    pub initial_registers: Registers,
    /// Local-data context.
    pub context: TransactionContext,
    /// One predicate per slot.
    pub slot_predicates: Vec<PredicateRef>,
}

impl TransactionVerifier {
    /// Verify a single bundle.
    pub fn verify_bundle<F>(
        &self,
        bundle: &TransactionBundle,
        terminal_check: F,
    ) -> Result<Registers, VerificationError>
    where
        F: Fn(&Registers) -> bool,
    {
        self.verify(
            &bundle.old_records,
            &bundle.new_records,
            bundle.initial_registers.clone(),
            &bundle.context,
            &bundle.slot_predicates,
            terminal_check,
        )
    }

    /// Verify many bundles concurrently; the i-th result belongs to the i-th bundle.
    pub fn verify_batch<F>(
        &self,
        bundles: &[TransactionBundle],
        terminal_check: F,
    ) -> Vec<Result<Registers, VerificationError>>
    where
        F: Fn(&Registers) -> bool + Sync,
    {
        debug!(transactions = bundles.len(), "verifying batch");
        bundles
            .par_iter()
            .map(|bundle| self.verify_bundle(bundle, &terminal_check))
            .collect()
    }
}
