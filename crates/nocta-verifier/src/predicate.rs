//! Predicate capability interface and program loading.
//!
//! Applications supply their birth/death logic by implementing [`Predicate`].
//! The engine only knows the distinguished [`PredicateRef::Dummy`] variant,
//! which pads transactions to a fixed arity and passes registers through.

use std::sync::Arc;

use core::fmt;

use hashbrown::HashMap;

use nocta_core::{ProgramId, Record, Registers};

use crate::context::{SlotRole, TransactionContext};
use crate::error::{PredicateError, VerificationError};

/// Application logic governing record creation or consumption.
///
/// Implementations must be pure: same inputs, same output, no side effects
/// visible outside the returned snapshot.
pub trait Predicate: Send + Sync {
    /// Program identifier records must declare to be governed by this predicate.
    fn id(&self) -> ProgramId;

    /// Payload fields that must equal the incoming registers of the same name.
    fn bound_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Produce the next register snapshot.
    fn apply(
        &self,
        role: SlotRole,
        registers: &Registers,
        record: &Record,
        context: &TransactionContext,
    ) -> Result<Registers, PredicateError>;
}

/// A predicate as referenced from a slot.
#[derive(Clone)]
pub enum PredicateRef {
    /// Identity transform used only for arity padding.
    Dummy,
    /// Application predicate.
    Program(Arc<dyn Predicate>),
}

impl PredicateRef {
    /// Wrap an application predicate.
    pub fn program<P: Predicate + 'static>(predicate: P) -> Self {
        PredicateRef::Program(Arc::new(predicate))
    }

    /// Program identifier the slot's record must declare.
    pub fn id(&self) -> ProgramId {
        match self {
            PredicateRef::Dummy => ProgramId::dummy(),
            PredicateRef::Program(p) => p.id(),
        }
    }

    /// Whether this is the padding predicate.
    pub fn is_dummy(&self) -> bool {
        matches!(self, PredicateRef::Dummy)
    }
}

impl fmt::Debug for PredicateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateRef::Dummy => f.write_str("PredicateRef::Dummy"),
            PredicateRef::Program(p) => write!(f, "PredicateRef::Program({})", p.id()),
        }
    }
}

/// Maps program identifiers to executable predicates.
pub trait PredicateLoader {
    /// Resolve `id`, or `None` if unknown.
    fn load(&self, id: &ProgramId) -> Option<PredicateRef>;
}

/// In-memory [`PredicateLoader`].
///
/// The dummy program id always resolves to [`PredicateRef::Dummy`].
#[derive(Clone, Default)]
pub struct ProgramRegistry {
    programs: HashMap<ProgramId, Arc<dyn Predicate>>,
}

impl ProgramRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under its own id.
    ///
    /// Returns `false` if the id was already taken (the old entry is kept) or
    /// is the reserved dummy id.
    pub fn register<P: Predicate + 'static>(&mut self, predicate: P) -> bool {
        let id = predicate.id();
        if id.is_dummy() || self.programs.contains_key(&id) {
            return false;
        }
        self.programs.insert(id, Arc::new(predicate));
        true
    }

    /// Number of registered programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether no programs are registered.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl PredicateLoader for ProgramRegistry {
    fn load(&self, id: &ProgramId) -> Option<PredicateRef> {
        if id.is_dummy() {
            return Some(PredicateRef::Dummy);
        }
        self.programs.get(id).cloned().map(PredicateRef::Program)
    }
}

/// Resolve the expected program of every slot, in slot order.
pub fn resolve_predicates<L: PredicateLoader + ?Sized>(
    loader: &L,
    ids: &[ProgramId],
) -> Result<Vec<PredicateRef>, VerificationError> {
    ids.iter()
        .map(|id| loader.load(id).ok_or(VerificationError::UnknownPredicate(*id)))
        .collect()
}
