#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Nocta local-data tree.
//!
//! Responsibilities:
//! - Derive one leaf per slot from its record identity and register snapshot
//! - Build a fixed-depth Merkle tree over those leaves
//! - Produce and check membership paths
//!
//! Trees are transaction-scoped: they are built from an explicit leaf list
//! and never retained or mutated afterwards.

pub mod error;
pub mod leaf;
pub mod merkle;

pub use error::*;
pub use leaf::*;
pub use merkle::*;
