//! docstamp timestamping service
//!
//! Binds every ingested document to its digest and to the Merkle root over
//! all documents seen so far, and persists the result as a timestamp record.

pub mod config;
pub mod ledger;
pub mod policy;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use ledger::DocumentLedger;
pub use policy::UploadPolicy;
pub use service::TimestampService;
pub use store::{MemoryStore, RecordStore, SledStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File type not allowed: {0}")]
    DisallowedFileType(String),

    #[error("Corrupt record at sequence {sequence}: {reason}")]
    CorruptRecord { sequence: u64, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tree has no root after ingestion")]
    MissingRoot,

    #[error("Lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, ServiceError>;
