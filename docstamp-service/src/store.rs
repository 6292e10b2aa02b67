//! Storage for timestamp records

use std::collections::HashMap;
use std::sync::RwLock;

use docstamp_types::{Digest, TimestampRecord};
use sled::transaction::{TransactionError, TransactionResult};
use sled::{Db, Transactional, Tree};

use crate::{Result, ServiceError};

/// Persistent home of timestamp records
///
/// Records are written once and never updated. Lookups by digest return the
/// earliest record carrying that digest.
pub trait RecordStore: Send + Sync {
    /// Persist a new record
    fn insert(&self, record: &TimestampRecord) -> Result<()>;

    /// Find the first record whose document digest matches
    fn find_by_digest(&self, digest: &Digest) -> Result<Option<TimestampRecord>>;

    /// All records in sequence order
    fn all(&self) -> Result<Vec<TimestampRecord>>;

    /// Number of stored records
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-process record store, lost when dropped
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    records: Vec<TimestampRecord>,
    by_digest: HashMap<Digest, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, record: &TimestampRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| ServiceError::LockPoisoned)?;
        let position = inner.records.len();
        inner
            .by_digest
            .entry(record.document_digest)
            .or_insert(position);
        inner.records.push(record.clone());
        Ok(())
    }

    fn find_by_digest(&self, digest: &Digest) -> Result<Option<TimestampRecord>> {
        let inner = self.inner.read().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(inner
            .by_digest
            .get(digest)
            .and_then(|&position| inner.records.get(position))
            .cloned())
    }

    fn all(&self) -> Result<Vec<TimestampRecord>> {
        let inner = self.inner.read().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(inner.records.clone())
    }

    fn len(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(inner.records.len())
    }
}

const RECORDS_TREE: &str = "records";
const DIGEST_INDEX_TREE: &str = "by_digest";

/// On-disk record store backed by sled
///
/// Records are JSON encoded under big-endian sequence keys, so iteration
/// order is ingestion order. A second tree maps each digest to the sequence
/// of its first record.
pub struct SledStore {
    db: Db,
    records: Tree,
    by_digest: Tree,
}

impl SledStore {
    /// Open or create a record store at the given path
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| ServiceError::Storage(format!("Failed to open database: {}", e)))?;

        let records = db
            .open_tree(RECORDS_TREE)
            .map_err(|e| ServiceError::Storage(format!("Failed to open records tree: {}", e)))?;

        let by_digest = db
            .open_tree(DIGEST_INDEX_TREE)
            .map_err(|e| ServiceError::Storage(format!("Failed to open digest index: {}", e)))?;

        Ok(Self {
            db,
            records,
            by_digest,
        })
    }

    fn get_by_sequence(&self, sequence: &[u8]) -> Result<Option<TimestampRecord>> {
        let value = self
            .records
            .get(sequence)
            .map_err(|e| ServiceError::Storage(format!("Failed to retrieve record: {}", e)))?;

        value.map(|bytes| decode_record(&bytes)).transpose()
    }
}

fn decode_record(bytes: &[u8]) -> Result<TimestampRecord> {
    serde_json::from_slice(bytes)
        .map_err(|e| ServiceError::Storage(format!("Failed to deserialize record: {}", e)))
}

impl RecordStore for SledStore {
    fn insert(&self, record: &TimestampRecord) -> Result<()> {
        let key = record.sequence.to_be_bytes();
        let value = serde_json::to_vec(record)
            .map_err(|e| ServiceError::Storage(format!("Failed to serialize record: {}", e)))?;
        let digest_key = &record.document_digest.as_bytes()[..];

        // Record and index entry commit together. An existing index entry is
        // kept only while the record it points at still carries its digest.
        let outcome: TransactionResult<()> =
            (&self.records, &self.by_digest).transaction(|(records, by_digest)| {
                records.insert(&key[..], value.as_slice())?;

                let indexed = match by_digest.get(digest_key)? {
                    Some(sequence) => match records.get(&sequence)? {
                        Some(bytes) => decode_record(&bytes)
                            .map(|existing| existing.document_digest == record.document_digest)
                            .unwrap_or(false),
                        None => false,
                    },
                    None => false,
                };

                if !indexed {
                    by_digest.insert(digest_key, &key[..])?;
                }

                Ok(())
            });

        outcome.map_err(|e| match e {
            TransactionError::Abort(()) => {
                ServiceError::Storage("Record transaction aborted".to_string())
            }
            TransactionError::Storage(e) => {
                ServiceError::Storage(format!("Failed to store record: {}", e))
            }
        })?;

        self.db
            .flush()
            .map_err(|e| ServiceError::Storage(format!("Failed to flush database: {}", e)))?;

        Ok(())
    }

    fn find_by_digest(&self, digest: &Digest) -> Result<Option<TimestampRecord>> {
        let sequence = self
            .by_digest
            .get(digest.as_bytes())
            .map_err(|e| ServiceError::Storage(format!("Failed to query digest index: {}", e)))?;

        let record = match sequence {
            Some(sequence) => self.get_by_sequence(&sequence)?,
            None => None,
        };

        // A stale index entry must not vouch for another document
        Ok(record.filter(|record| record.document_digest == *digest))
    }

    fn all(&self) -> Result<Vec<TimestampRecord>> {
        let mut records = Vec::new();

        for item in self.records.iter() {
            let (_, value) = item
                .map_err(|e| ServiceError::Storage(format!("Failed to iterate database: {}", e)))?;

            records.push(decode_record(&value)?);
        }

        Ok(records)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
