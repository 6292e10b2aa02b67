//! Root-only inclusion verification
//!
//! [`MerkleTree::is_member`](crate::MerkleTree::is_member) needs the full
//! document list. The checks here need only a root and an audit path.

use docstamp_types::{digest, Digest, InclusionProof, MerklePath};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Merkle path verification failed: expected root {expected}, computed {computed}")]
    RootMismatch { expected: Digest, computed: Digest },

    #[error("Document digest does not match the proof")]
    DigestMismatch,
}

/// Verify that a document sits under `root` along `path`
pub fn verify_inclusion(
    document: &[u8],
    path: &MerklePath,
    root: &Digest,
) -> Result<(), VerificationError> {
    let leaf_hash = digest(document);
    let computed = path.compute_root(&leaf_hash);

    if computed != *root {
        return Err(VerificationError::RootMismatch {
            expected: *root,
            computed,
        });
    }

    Ok(())
}

/// Verify a complete inclusion proof against the document it claims to cover
pub fn verify_proof(document: &[u8], proof: &InclusionProof) -> Result<(), VerificationError> {
    if digest(document) != proof.document_digest {
        return Err(VerificationError::DigestMismatch);
    }

    verify_inclusion(document, &proof.path, &proof.merkle_root)
}
