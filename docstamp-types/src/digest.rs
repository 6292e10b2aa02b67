//! The digest function used for leaves and internal nodes

use sha2::{Digest as _, Sha256};

use crate::primitives::Digest;

/// SHA-256 of an arbitrary byte sequence, including the empty one
pub fn digest(bytes: &[u8]) -> Digest {
    let hash = Sha256::digest(bytes);
    Digest::new(hash.into())
}

/// Hash a pair of nodes: H(hex(left) || hex(right))
///
/// Children are concatenated in their lowercase hexadecimal form, not as raw
/// bytes. Stored roots were produced this way and must keep verifying.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left.to_hex().as_bytes());
    hasher.update(right.to_hex().as_bytes());
    Digest::new(hasher.finalize().into())
}
