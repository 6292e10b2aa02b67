//! Error types for docstamp

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid digest length: expected {expected}, got {actual}")]
    InvalidDigestLength { expected: usize, actual: usize },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Hex encoding error: {0}")]
    HexEncoding(#[from] hex::FromHexError),

    #[error("Base64 decoding error: {0}")]
    Base64Decoding(#[from] base64::DecodeError),
}
