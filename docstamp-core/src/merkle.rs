//! Merkle tree construction over an ordered document sequence

use docstamp_types::{digest, hash_pair, Digest, Document, MerkleNode, MerklePath};

/// A Merkle tree built over the full, ordered document sequence
///
/// The tree is never mutated after construction. Adding a document means
/// building a new tree from the complete history.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All documents in the tree (in order)
    documents: Vec<Document>,
    /// Digests organized by level
    /// levels[0] is the leaves, the last level holds the root.
    /// Empty when the tree has no documents.
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree from an ordered sequence of documents
    pub fn build<I, D>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Document>,
    {
        let mut builder = MerkleTreeBuilder::new();
        for document in documents {
            builder.add_document(document);
        }
        builder.build()
    }

    /// Get the root digest, `None` for a tree without documents
    pub fn root(&self) -> Option<Digest> {
        self.levels.last().and_then(|level| level.first()).copied()
    }

    /// Get the number of documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Get a specific document
    pub fn get_document(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Leaf digests in document order
    pub fn leaves(&self) -> &[Digest] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Number of hashing rounds between the leaves and the root
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Check whether a candidate's content matches any document in the tree
    ///
    /// This compares the candidate's digest with the leaf digests only. The
    /// root and the internal nodes play no part, so the answer is only as
    /// trustworthy as the document list the tree was built from.
    pub fn is_member(&self, candidate: &[u8]) -> bool {
        self.position_of(candidate).is_some()
    }

    /// Index of the first document whose content matches the candidate
    pub fn position_of(&self, candidate: &[u8]) -> Option<usize> {
        let candidate_digest = digest(candidate);
        self.leaves().iter().position(|leaf| *leaf == candidate_digest)
    }

    /// Generate a Merkle path for a specific leaf
    ///
    /// The path has one sibling per level. A node left without a partner is
    /// paired with itself, so its sibling entry repeats its own digest.
    pub fn generate_path(&self, leaf_index: usize) -> Option<MerklePath> {
        if leaf_index >= self.documents.len() {
            return None;
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut index = leaf_index;

        // Walk up the tree from leaf to root
        for level in &self.levels[..self.depth()] {
            let node = if index % 2 == 0 {
                // We're on the left, sibling is on the right (or ourselves)
                MerkleNode {
                    hash: level.get(index + 1).copied().unwrap_or(level[index]),
                    is_left: false,
                }
            } else {
                MerkleNode {
                    hash: level[index - 1],
                    is_left: true,
                }
            };
            siblings.push(node);

            // Move to parent index
            index /= 2;
        }

        Some(MerklePath {
            leaf_index: leaf_index as u64,
            siblings,
        })
    }
}

/// Builder for constructing Merkle trees
#[derive(Debug, Default)]
pub struct MerkleTreeBuilder {
    documents: Vec<Document>,
}

impl MerkleTreeBuilder {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            documents: Vec::with_capacity(capacity),
        }
    }

    /// Add a document to the tree
    pub fn add_document(&mut self, document: impl Into<Document>) {
        self.documents.push(document.into());
    }

    /// Build the tree
    pub fn build(self) -> MerkleTree {
        // Level 0: leaf hashes
        let leaf_hashes: Vec<Digest> = self.documents.iter().map(Document::digest).collect();

        if leaf_hashes.is_empty() {
            return MerkleTree {
                documents: self.documents,
                levels: Vec::new(),
            };
        }

        let mut levels = vec![leaf_hashes];

        // Build up the tree level by level
        while let Some(prev_level) = levels.last() {
            if prev_level.len() <= 1 {
                break;
            }

            let next_level: Vec<Digest> = prev_level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    // Odd number of nodes - duplicate the last one
                    [last] => hash_pair(last, last),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();

            levels.push(next_level);
        }

        MerkleTree {
            documents: self.documents,
            levels,
        }
    }
}
