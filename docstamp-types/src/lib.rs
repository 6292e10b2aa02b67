//! Core types and record definitions for docstamp
//!
//! This crate defines the digest function, the fundamental data structures
//! and the record shapes shared by the Merkle core and the timestamping
//! service.

pub mod digest;
pub mod error;
pub mod messages;
pub mod primitives;

pub use digest::{digest, hash_pair};
pub use error::{Error, Result};
pub use messages::{
    InclusionProof, MerkleNode, MerklePath, TimestampReceipt, TimestampRecord, VerificationResult,
};
pub use primitives::{Digest, Document, Timestamp};
