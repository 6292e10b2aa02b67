//! Timestamping service implementation

use std::path::Path;
use std::sync::Arc;

use docstamp_types::{
    digest, Digest, Document, InclusionProof, Timestamp, TimestampReceipt, TimestampRecord,
    VerificationResult,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::ledger::DocumentLedger;
use crate::policy::UploadPolicy;
use crate::store::RecordStore;
use crate::{Result, ServiceError};

/// The timestamping service
///
/// Owns the document ledger and writes records to the injected store. Any
/// number of independent services can live in one process, each with its
/// own store.
pub struct TimestampService {
    ledger: RwLock<DocumentLedger>,
    store: Arc<dyn RecordStore>,
    policy: UploadPolicy,
}

impl TimestampService {
    /// Open a service over a store, replaying its records into the ledger
    pub fn open(store: Arc<dyn RecordStore>) -> Result<Self> {
        let records = store.all()?;
        let ledger = replay(&records)?;

        info!(
            "Timestamp service opened with {} documents, root: {}",
            ledger.len(),
            ledger
                .root()
                .map(|root| root.to_hex())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(Self {
            ledger: RwLock::new(ledger),
            store,
            policy: UploadPolicy::default(),
        })
    }

    /// Replace the upload whitelist
    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Timestamp a document
    ///
    /// Appending, rebuilding, persisting and publishing the new root happen
    /// under one write lock. If the record cannot be stored the document is
    /// removed again and the previous root stays current.
    pub async fn timestamp(&self, document: impl Into<Document>) -> Result<TimestampReceipt> {
        let document = document.into();
        let document_digest = document.digest();

        let mut ledger = self.ledger.write().await;
        let sequence = ledger.len() as u64;

        let merkle_root = match ledger.append(document.clone()) {
            Some(root) => root,
            None => {
                ledger.rollback_last();
                return Err(ServiceError::MissingRoot);
            }
        };

        let record = TimestampRecord {
            sequence,
            document,
            document_digest,
            merkle_root,
            recorded_at: Timestamp::now(),
        };

        if let Err(e) = self.store.insert(&record) {
            warn!("Failed to persist record {}: {}", sequence, e);
            ledger.rollback_last();
            return Err(e);
        }

        info!(
            "Timestamped document {} (sequence {}), merkle root: {}",
            document_digest, sequence, merkle_root
        );

        Ok(record.receipt())
    }

    /// Check whether a document was ever timestamped
    ///
    /// Looks the document's digest up in the record store. The tree is not
    /// consulted.
    pub async fn verify(&self, document: &[u8]) -> Result<VerificationResult> {
        let document_digest = digest(document);

        let _ledger = self.ledger.read().await;
        let is_valid = self.store.find_by_digest(&document_digest)?.is_some();

        debug!("Verification for {}: {}", document_digest, is_valid);

        Ok(VerificationResult { is_valid })
    }

    /// Check a document against the leaves of the current tree
    pub async fn is_member(&self, document: &[u8]) -> bool {
        self.ledger.read().await.tree().is_member(document)
    }

    /// Build a root-only inclusion proof for a document in the current tree
    pub async fn inclusion_proof(&self, document: &[u8]) -> Option<InclusionProof> {
        let ledger = self.ledger.read().await;
        let tree = ledger.tree();

        let index = tree.position_of(document)?;
        let path = tree.generate_path(index)?;

        Some(InclusionProof {
            document_digest: tree.leaves()[index],
            merkle_root: tree.root()?,
            path,
        })
    }

    /// The root currently in effect, `None` before the first document
    pub async fn current_root(&self) -> Option<Digest> {
        self.ledger.read().await.root()
    }

    pub async fn document_count(&self) -> usize {
        self.ledger.read().await.len()
    }

    /// Earliest record for a digest
    pub async fn record(&self, document_digest: &Digest) -> Result<Option<TimestampRecord>> {
        let _ledger = self.ledger.read().await;
        self.store.find_by_digest(document_digest)
    }

    /// All records in ingestion order
    pub async fn records(&self) -> Result<Vec<TimestampRecord>> {
        let _ledger = self.ledger.read().await;
        self.store.all()
    }

    /// Timestamp a file after checking it against the upload whitelist
    pub async fn timestamp_file(&self, path: &Path) -> Result<TimestampReceipt> {
        let bytes = self.read_upload(path).await?;
        self.timestamp(bytes).await
    }

    /// Verify a file after checking it against the upload whitelist
    pub async fn verify_file(&self, path: &Path) -> Result<VerificationResult> {
        let bytes = self.read_upload(path).await?;
        self.verify(&bytes).await
    }

    /// Check a file against the leaves of the current tree
    pub async fn is_member_file(&self, path: &Path) -> Result<bool> {
        let bytes = self.read_upload(path).await?;
        Ok(self.is_member(&bytes).await)
    }

    /// Inclusion proof for a file under the current root
    pub async fn inclusion_proof_file(&self, path: &Path) -> Result<Option<InclusionProof>> {
        let bytes = self.read_upload(path).await?;
        Ok(self.inclusion_proof(&bytes).await)
    }

    async fn read_upload(&self, path: &Path) -> Result<Vec<u8>> {
        self.policy.check(path)?;
        let bytes = tokio::fs::read(path).await?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }
}

/// Rebuild the ledger from stored records
///
/// Records must be numbered consecutively from zero and each payload must
/// still hash to its recorded digest. The last record's root has to match
/// the rebuilt tree.
fn replay(records: &[TimestampRecord]) -> Result<DocumentLedger> {
    let mut documents = Vec::with_capacity(records.len());

    for (expected, record) in records.iter().enumerate() {
        if record.sequence != expected as u64 {
            return Err(ServiceError::CorruptRecord {
                sequence: record.sequence,
                reason: format!("expected sequence {}", expected),
            });
        }

        if !record.is_consistent() {
            return Err(ServiceError::CorruptRecord {
                sequence: record.sequence,
                reason: "payload does not match recorded digest".to_string(),
            });
        }

        documents.push(record.document.clone());
    }

    let ledger = DocumentLedger::from_documents(documents);

    if let Some(last) = records.last() {
        if ledger.root() != Some(last.merkle_root) {
            return Err(ServiceError::CorruptRecord {
                sequence: last.sequence,
                reason: "recorded merkle root does not match replayed history".to_string(),
            });
        }
    }

    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use docstamp_core::MerkleTree;

    fn memory_service() -> TimestampService {
        TimestampService::open(Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_receipt_matches_tree() {
        let service = memory_service();
        assert_eq!(service.current_root().await, None);

        service.timestamp(b"document1").await.unwrap();
        service.timestamp(b"document2").await.unwrap();
        let receipt = service.timestamp(b"document3").await.unwrap();

        let expected = MerkleTree::build([b"document1", b"document2", b"document3"]);
        assert_eq!(Some(receipt.merkle_root), expected.root());
        assert_eq!(receipt.document_digest, digest(b"document3"));
        assert_eq!(service.current_root().await, expected.root());
        assert_eq!(service.document_count().await, 3);
    }

    #[tokio::test]
    async fn test_records_carry_root_at_insertion() {
        let service = memory_service();
        let first = service.timestamp(b"document1").await.unwrap();
        let second = service.timestamp(b"document2").await.unwrap();

        let records = service.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].merkle_root, first.merkle_root);
        assert_eq!(records[1].merkle_root, second.merkle_root);
        assert_ne!(first.merkle_root, second.merkle_root);
        assert_eq!(records[0].document.to_base64(), "ZG9jdW1lbnQx");
    }

    #[tokio::test]
    async fn test_verify_is_store_backed() {
        let service = memory_service();
        service.timestamp(b"document1").await.unwrap();

        assert!(service.verify(b"document1").await.unwrap().is_valid);
        assert!(!service.verify(b"document4").await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn test_membership_and_proofs() {
        let service = memory_service();
        assert!(!service.is_member(b"document1").await);
        assert!(service.inclusion_proof(b"document1").await.is_none());

        for document in [b"document1", b"document2", b"document3"] {
            service.timestamp(document).await.unwrap();
        }

        assert!(service.is_member(b"document2").await);
        assert!(!service.is_member(b"document4").await);

        let proof = service.inclusion_proof(b"document3").await.unwrap();
        assert_eq!(Some(proof.merkle_root), service.current_root().await);
        assert!(docstamp_core::verify_proof(b"document3", &proof).is_ok());
    }

    #[tokio::test]
    async fn test_record_reads_wait_for_ingestion() {
        let service = memory_service();
        service.timestamp(b"document1").await.unwrap();

        let ledger = service.ledger.write().await;
        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            service.records(),
        )
        .await;
        assert!(pending.is_err());

        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            service.record(&digest(b"document1")),
        )
        .await;
        assert!(pending.is_err());
        drop(ledger);

        assert_eq!(service.records().await.unwrap().len(), 1);
        assert!(service.record(&digest(b"document1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_file_membership_and_proof() {
        let temp_dir = tempfile::tempdir().unwrap();
        let allowed = temp_dir.path().join("contract.txt");
        let rejected = temp_dir.path().join("contract.png");
        std::fs::write(&allowed, b"signed contract").unwrap();
        std::fs::write(&rejected, b"signed contract").unwrap();

        let service = memory_service();
        assert!(!service.is_member_file(&allowed).await.unwrap());
        assert!(service.inclusion_proof_file(&allowed).await.unwrap().is_none());

        service.timestamp_file(&allowed).await.unwrap();

        assert!(service.is_member_file(&allowed).await.unwrap());
        let proof = service.inclusion_proof_file(&allowed).await.unwrap().unwrap();
        assert_eq!(proof.document_digest, digest(b"signed contract"));

        assert!(matches!(
            service.is_member_file(&rejected).await,
            Err(ServiceError::DisallowedFileType(_))
        ));
        assert!(service.inclusion_proof_file(&rejected).await.is_err());
    }

    #[test]
    fn test_replay_rejects_gaps() {
        let document = Document::from(b"document1");
        let record = TimestampRecord {
            sequence: 1,
            document_digest: document.digest(),
            merkle_root: document.digest(),
            document,
            recorded_at: Timestamp::new(0, 0).unwrap(),
        };

        let err = replay(&[record]).unwrap_err();
        assert!(matches!(err, ServiceError::CorruptRecord { sequence: 1, .. }));
    }

    #[test]
    fn test_replay_rejects_wrong_root() {
        let document = Document::from(b"document1");
        let record = TimestampRecord {
            sequence: 0,
            document_digest: document.digest(),
            merkle_root: digest(b"something else"),
            document,
            recorded_at: Timestamp::new(0, 0).unwrap(),
        };

        assert!(replay(&[record]).is_err());
    }
}
