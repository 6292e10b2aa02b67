//! Receipts, records and proof shapes exchanged with the timestamping service

use crate::digest::hash_pair;
use crate::primitives::{Digest, Document, Timestamp};
use serde::{Deserialize, Serialize};

/// Result of ingesting a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampReceipt {
    /// Digest of the ingested document
    pub document_digest: Digest,
    /// Root of the tree rebuilt over every document seen so far
    pub merkle_root: Digest,
}

/// Result of a verification request
///
/// Carries only the membership answer, never a root or a proof path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_valid: bool,
}

/// A persisted timestamp record, written once per ingested document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampRecord {
    /// Position of the document in ingestion order (0-based)
    pub sequence: u64,
    /// The original payload, base64 encoded
    pub document: Document,
    pub document_digest: Digest,
    /// Root in effect right after this document was ingested
    pub merkle_root: Digest,
    /// Wall-clock time of ingestion
    pub recorded_at: Timestamp,
}

impl TimestampRecord {
    /// Check that the stored payload still hashes to the recorded digest
    pub fn is_consistent(&self) -> bool {
        self.document.digest() == self.document_digest
    }

    pub fn receipt(&self) -> TimestampReceipt {
        TimestampReceipt {
            document_digest: self.document_digest,
            merkle_root: self.merkle_root,
        }
    }
}

/// Merkle path from leaf to root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// The leaf index in the tree
    pub leaf_index: u64,
    /// One sibling per level, leaf level first
    pub siblings: Vec<MerkleNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleNode {
    pub hash: Digest,
    /// True if this sibling is on the left of the path
    pub is_left: bool,
}

impl MerklePath {
    /// Compute the Merkle root from a leaf hash
    pub fn compute_root(&self, leaf_hash: &Digest) -> Digest {
        let mut current = *leaf_hash;

        for sibling in &self.siblings {
            current = if sibling.is_left {
                hash_pair(&sibling.hash, &current)
            } else {
                hash_pair(&current, &sibling.hash)
            };
        }

        current
    }
}

/// A compact proof that a document sits under a specific root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub document_digest: Digest,
    pub merkle_root: Digest,
    pub path: MerklePath,
}

impl InclusionProof {
    /// Recompute the root from the proof's own digest and path
    pub fn computed_root(&self) -> Digest {
        self.path.compute_root(&self.document_digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest;

    #[test]
    fn test_merkle_path_simple() {
        let leaf0 = digest(b"left");
        let leaf1 = digest(b"right");

        let root_expected = hash_pair(&leaf0, &leaf1);

        let path = MerklePath {
            leaf_index: 0,
            siblings: vec![MerkleNode {
                hash: leaf1,
                is_left: false,
            }],
        };
        assert_eq!(path.compute_root(&leaf0), root_expected);

        let path = MerklePath {
            leaf_index: 1,
            siblings: vec![MerkleNode {
                hash: leaf0,
                is_left: true,
            }],
        };
        assert_eq!(path.compute_root(&leaf1), root_expected);
    }

    #[test]
    fn test_empty_path_is_identity() {
        let leaf = digest(b"only");
        let path = MerklePath {
            leaf_index: 0,
            siblings: vec![],
        };
        assert_eq!(path.compute_root(&leaf), leaf);
    }

    #[test]
    fn test_record_json_shape() {
        let document = Document::from(b"document1");
        let record = TimestampRecord {
            sequence: 0,
            document_digest: document.digest(),
            merkle_root: document.digest(),
            document,
            recorded_at: Timestamp::new(1_700_000_000, 0).unwrap(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["document"], "ZG9jdW1lbnQx");
        assert_eq!(value["document_digest"], record.document_digest.to_hex());
        assert_eq!(value["merkle_root"], record.merkle_root.to_hex());
        assert!(record.is_consistent());

        let parsed: TimestampRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_tampered_record_is_inconsistent() {
        let record = TimestampRecord {
            sequence: 3,
            document: Document::from(b"tampered"),
            document_digest: digest(b"original"),
            merkle_root: digest(b"root"),
            recorded_at: Timestamp::new(1, 0).unwrap(),
        };
        assert!(!record.is_consistent());
        assert_eq!(record.receipt().document_digest, digest(b"original"));
    }
}
