//! Fixed-depth Merkle tree over local-data leaves.
//!
//! Design goals:
//! - Deterministic across platforms
//! - Pure function of its leaf list; built per transaction and dropped
//! - Depth is `ceil(log2(leaf count))`, padded with an empty node
//!
//! Hash function: BLAKE3 with domain separators.

use borsh::{BorshDeserialize, BorshSerialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nocta_core::{hash32, Hash32, MAX_SLOTS_PER_TX};

use crate::error::TreeError;

/// Domain separator for merkle node hashing.
const DS_MERKLE_NODE: &[u8] = b"NOCTA::MERKLE_NODE::V0";
/// Domain separator for merkle leaf hashing.
const DS_MERKLE_LEAF: &[u8] = b"NOCTA::MERKLE_LEAF::V0";
/// Domain separator for merkle empty hashing.
const DS_MERKLE_EMPTY: &[u8] = b"NOCTA::MERKLE_EMPTY::V0";

/// Tree depth needed to hold `len` leaves.
pub fn depth_for(len: usize) -> u32 {
    len.max(1).next_power_of_two().trailing_zeros()
}

/// A complete binary tree built from one transaction's local-data leaves.
#[derive(Clone, Debug)]
pub struct LocalDataTree {
    /// Number of real (non-padding) leaves.
    len: usize,
    /// Node levels, `levels[0]` being the hashed (and padded) leaves and the
    /// last level holding only the root.
    levels: Vec<Vec<Hash32>>,
}

impl LocalDataTree {
    /// Build a tree from leaves in slot order.
    pub fn from_leaves(leaves: &[Hash32]) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::Empty);
        }
        if leaves.len() > MAX_SLOTS_PER_TX {
            return Err(TreeError::TooManyLeaves(leaves.len()));
        }

        let width = 1usize << depth_for(leaves.len());
        let mut level: Vec<Hash32> = leaves.iter().map(leaf_hash).collect();
        level.resize(width, empty_node());

        let mut levels = vec![level];
        while levels.last().map_or(false, |l| l.len() > 1) {
            let next = levels
                .last()
                .map(|prev| {
                    prev.chunks(2)
                        .map(|pair| parent_hash(&pair[0], &pair[1]))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            levels.push(next);
        }

        Ok(Self {
            len: leaves.len(),
            levels,
        })
    }

    /// Number of real leaves.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: empty trees cannot be built.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Depth of the tree (number of siblings in a path).
    pub fn depth(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    /// Merkle root.
    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or_else(empty_node)
    }

    /// Authentication path for the leaf at `index`.
    pub fn path(&self, index: usize) -> Result<MerklePath, TreeError> {
        if index >= self.len {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }

        let mut siblings = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            siblings.push(level[idx ^ 1]);
            idx >>= 1;
        }
        Ok(MerklePath { siblings })
    }
}

/// Sibling hashes from a leaf up to (excluding) the root.
#[derive(Clone, PartialEq, Eq, Debug, Default, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MerklePath {
    /// Siblings ordered from the leaf level upward.
    pub siblings: Vec<Hash32>,
}

impl MerklePath {
    /// Fold `leaf` at position `index` up the path.
    pub fn compute_root(&self, leaf: &Hash32, index: usize) -> Hash32 {
        let mut node = leaf_hash(leaf);
        let mut idx = index;
        for sibling in &self.siblings {
            node = if idx & 1 == 0 {
                parent_hash(&node, sibling)
            } else {
                parent_hash(sibling, &node)
            };
            idx >>= 1;
        }
        node
    }

    /// Whether `leaf` at `index` authenticates to `root`.
    pub fn verify(&self, leaf: &Hash32, index: usize, root: &Hash32) -> bool {
        // Reject indices the path cannot address.
        if self.siblings.len() < usize::BITS as usize && index >> self.siblings.len() != 0 {
            return false;
        }
        self.compute_root(leaf, index) == *root
    }
}

/// Hash a leaf value into a level-0 node.
fn leaf_hash(leaf: &Hash32) -> Hash32 {
    hash32(DS_MERKLE_LEAF, leaf.as_bytes())
}

/// Compute parent hash for two child nodes.
fn parent_hash(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(left.as_bytes());
    bytes[32..].copy_from_slice(right.as_bytes());
    hash32(DS_MERKLE_NODE, &bytes)
}

/// Level-0 node used to pad the leaf list to a power of two.
fn empty_node() -> Hash32 {
    hash32(DS_MERKLE_EMPTY, &[0u8])
}
