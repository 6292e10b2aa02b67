//! Proptest-based fuzzing for input parsers in docstamp-types.
//!
//! These tests feed arbitrary and malformed inputs to the deserialization
//! paths and check they only ever return errors, never panic.

use docstamp_types::{Digest, Document, TimestampRecord};
use proptest::prelude::*;

proptest! {
    #[test]
    fn fuzz_digest_from_json(s in "\\PC{0,200}") {
        let json = format!("\"{}\"", s);
        let _ = serde_json::from_str::<Digest>(&json);
    }

    #[test]
    fn fuzz_document_from_json(s in "\\PC{0,200}") {
        let json = format!("\"{}\"", s);
        let _ = serde_json::from_str::<Document>(&json);
    }

    #[test]
    fn fuzz_document_from_base64(s in "[A-Za-z0-9+/=]{0,200}") {
        let _ = Document::from_base64(&s);
    }

    #[test]
    fn fuzz_digest_from_hex(s in "[0-9a-fA-F]{0,200}") {
        let _ = Digest::from_hex(&s);
    }

    #[test]
    fn fuzz_digest_from_slice(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = Digest::from_slice(&bytes);
    }

    #[test]
    fn fuzz_record_from_arbitrary_json(s in "\\PC{0,400}") {
        let _ = serde_json::from_str::<TimestampRecord>(&s);
    }

    #[test]
    fn fuzz_record_with_bad_fields(
        digest in "[0-9a-f]{0,80}",
        payload in "\\PC{0,40}",
        seconds in any::<i64>(),
        nanos in any::<u32>(),
    ) {
        let json = format!(
            r#"{{"sequence":0,"document":"{}","document_digest":"{}","merkle_root":"{}","recorded_at":{{"seconds":{},"nanos":{}}}}}"#,
            payload.replace('\\', "").replace('"', ""),
            digest,
            digest,
            seconds,
            nanos,
        );
        let _ = serde_json::from_str::<TimestampRecord>(&json);
    }
}

#[test]
fn odd_length_hex_is_rejected() {
    let hex = "a".repeat(63);
    assert!(Digest::from_hex(&hex).is_err());
}

#[test]
fn invalid_base64_payload_is_rejected() {
    assert!(Document::from_base64("***").is_err());
    assert!(serde_json::from_str::<Document>("\"***\"").is_err());
}
