//! Merkle tree construction and verification for document timestamping
//!
//! This crate provides:
//! - Deterministic Merkle tree construction over an ordered document list
//! - Membership checks against the documents a tree was built from
//! - Audit-path generation and root-only inclusion verification

pub mod merkle;
pub mod verify;

pub use merkle::{MerkleTree, MerkleTreeBuilder};
pub use verify::{verify_inclusion, verify_proof, VerificationError};
