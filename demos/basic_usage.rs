//! Basic usage example for docstamp's Merkle core
//!
//! This example demonstrates:
//! - Building a tree over an ordered document list
//! - Checking document membership
//! - Rebuilding after a new document arrives
//! - Generating and checking a root-only inclusion proof
//!
//! Run with: cargo run -p docstamp-core --example basic_usage

use docstamp_core::{verify_inclusion, MerkleTree};
use docstamp_types::digest;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("docstamp Merkle Example");
    println!("=======================\n");

    // Step 1: The documents seen so far, in arrival order
    let mut documents: Vec<&[u8]> = vec![&b"document1"[..], &b"document2"[..], &b"document3"[..]];

    println!("Documents:");
    for (i, document) in documents.iter().enumerate() {
        println!("  {}. {:?} -> {}", i + 1, String::from_utf8_lossy(document), digest(document));
    }
    println!();

    // Step 2: Build the tree over the whole list
    let tree = MerkleTree::build(documents.iter().copied());
    let root = tree.root().ok_or("tree has no root")?;

    println!("Tree Built:");
    println!("  Documents: {}", tree.document_count());
    println!("  Depth:     {}", tree.depth());
    println!("  Root:      {}", root);
    println!();

    // Step 3: Membership checks recompute the candidate's leaf digest
    for candidate in [&b"document2"[..], &b"document4"[..]] {
        println!(
            "  is_member({:?}) = {}",
            String::from_utf8_lossy(candidate),
            tree.is_member(candidate)
        );
    }
    println!();

    // Step 4: A new document triggers a full rebuild and a new root
    documents.push(b"document4");
    let rebuilt = MerkleTree::build(documents.iter().copied());
    let new_root = rebuilt.root().ok_or("tree has no root")?;

    println!("After adding document4:");
    println!("  Previous root: {}", root);
    println!("  New root:      {}", new_root);
    println!();

    // Step 5: Audit paths prove inclusion without the other documents
    println!("Audit Paths:");
    for (i, document) in documents.iter().enumerate() {
        let path = rebuilt.generate_path(i).ok_or("missing path")?;
        verify_inclusion(document, &path, &new_root)?;
        println!(
            "  {:?}: {} siblings, verified",
            String::from_utf8_lossy(document),
            path.siblings.len()
        );
    }
    println!();

    println!("Example completed successfully!");

    Ok(())
}
