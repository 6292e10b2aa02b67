//! The authoritative document history and its current tree

use docstamp_core::MerkleTree;
use docstamp_types::{Digest, Document};

/// Ordered history of every ingested document plus the tree built over it
///
/// Each append rebuilds the tree from the complete history. The previous
/// tree is discarded.
#[derive(Debug)]
pub struct DocumentLedger {
    documents: Vec<Document>,
    tree: MerkleTree,
}

impl DocumentLedger {
    pub fn new() -> Self {
        Self::from_documents(Vec::new())
    }

    /// Rebuild a ledger from a replayed history
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let tree = MerkleTree::build(documents.iter().cloned());
        Self { documents, tree }
    }

    /// Append a document and rebuild, returning the new root
    pub fn append(&mut self, document: Document) -> Option<Digest> {
        self.documents.push(document);
        self.rebuild();
        self.tree.root()
    }

    /// Drop the most recent document and rebuild
    pub fn rollback_last(&mut self) -> Option<Document> {
        let removed = self.documents.pop();
        if removed.is_some() {
            self.rebuild();
        }
        removed
    }

    fn rebuild(&mut self) {
        self.tree = MerkleTree::build(self.documents.iter().cloned());
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn root(&self) -> Option<Digest> {
        self.tree.root()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for DocumentLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_rebuilds_over_full_history() {
        let mut ledger = DocumentLedger::new();
        assert_eq!(ledger.root(), None);

        ledger.append(Document::from(b"document1"));
        ledger.append(Document::from(b"document2"));
        let root = ledger.append(Document::from(b"document3"));

        let expected = MerkleTree::build([b"document1", b"document2", b"document3"]);
        assert_eq!(root, expected.root());
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.tree().document_count(), 3);
    }

    #[test]
    fn test_rollback_restores_previous_root() {
        let mut ledger = DocumentLedger::from_documents(vec![
            Document::from(b"document1"),
            Document::from(b"document2"),
        ]);
        let before = ledger.root();

        ledger.append(Document::from(b"document3"));
        assert_ne!(ledger.root(), before);

        let removed = ledger.rollback_last().unwrap();
        assert_eq!(removed.as_bytes(), b"document3");
        assert_eq!(ledger.root(), before);
        assert!(!ledger.tree().is_member(b"document3"));
    }

    #[test]
    fn test_rollback_on_empty_ledger() {
        let mut ledger = DocumentLedger::default();
        assert!(ledger.rollback_last().is_none());
        assert!(ledger.is_empty());
        assert_eq!(ledger.root(), None);
    }
}
