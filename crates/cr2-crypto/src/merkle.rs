use cr2_types::Digest;
use serde::{Deserialize, Serialize};

use crate::hasher::Keccak;

/// Side of a sibling in a Merkle proof path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Binary Keccak Merkle tree over published commitments.
///
/// Leaves are used as-is (commitments are already digests). Each parent is
/// `keccak(left || right)`; a node left without a partner at the end of a
/// level is promoted to the next level unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    root: Digest,
    /// Level 0 = leaves, last level = `[root]`.
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree from leaves in order.
    ///
    /// An empty list produces the zero root. A single leaf is its own root.
    pub fn from_leaves(leaves: Vec<Digest>) -> Self {
        if leaves.is_empty() {
            return Self {
                root: Digest::zero(),
                levels: vec![],
            };
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Digest> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    _ => pair[0],
                })
                .collect();
            levels.push(next);
        }

        let root = levels[levels.len() - 1][0];
        Self { root, levels }
    }

    pub fn root(&self) -> Digest {
        self.root
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        let leaf = *self.levels.first()?.get(index)?;
        let mut path = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            if idx % 2 == 1 {
                path.push((level[idx - 1], Side::Left));
            } else if let Some(sibling) = level.get(idx + 1) {
                path.push((*sibling, Side::Right));
            }
            idx /= 2;
        }

        Some(MerkleProof {
            leaf,
            path,
            root: self.root,
        })
    }
}

/// Merkle inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: Digest,
    /// (sibling, sibling side) pairs from leaf to root. Levels where the
    /// node was promoted contribute no entry.
    pub path: Vec<(Digest, Side)>,
    pub root: Digest,
}

impl MerkleProof {
    /// Recompute the root from the leaf and path.
    pub fn verify(&self) -> bool {
        let mut current = self.leaf;
        for (sibling, side) in &self.path {
            current = match side {
                Side::Left => hash_pair(sibling, &current),
                Side::Right => hash_pair(&current, sibling),
            };
        }
        current == self.root
    }
}

fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    Keccak::hash_parts(&[left.as_bytes(), right.as_bytes()])
}
