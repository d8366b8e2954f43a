#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Nocta transaction verification engine.
//!
//! This crate is responsible for:
//! - running birth/death predicates slot by slot, threading register snapshots
//! - re-deriving every record commitment
//! - rebuilding the local-data tree and checking its root and membership path
//! - evaluating the application's terminal conservation check
//!
//! It intentionally does **not** include proof verification, predicate
//! compilation, or ledger-wide double-spend tracking.

pub mod batch;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod predicate;
pub mod verifier;

pub use batch::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use executor::*;
pub use predicate::*;
pub use verifier::*;
