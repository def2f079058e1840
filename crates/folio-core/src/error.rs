use thiserror::Error;

use crate::id::Id;

pub type FolioResult<T> = Result<T, FolioError>;

/// Coarse classification of a [`FolioError`], for callers that need to tell
/// tampering apart from corruption or a missing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong-length keys, truncated or undecodable buffers
    MalformedInput,
    /// A MAC or AEAD tag did not verify
    Authentication,
    /// Supplied pages do not match what an Entry references
    ReferentialIntegrity,
    /// Unknown compression codec identifier
    UnsupportedCodec,
    NotFound,
    MissingKey,
    Storage,
    Config,
    Other,
}

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("{what} has wrong length: {actual} bytes (expected {expected})")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("authentication failed for {what}")]
    Authentication { what: &'static str },

    #[error("page out of order: expected index {expected}, found {actual}")]
    OutOfOrderPage { expected: u32, actual: u32 },

    #[error("entry references {expected} pages, {actual} supplied")]
    PageCountMismatch { expected: usize, actual: usize },

    #[error("page {index} has key {actual}, entry expects {expected}")]
    PageKeyMismatch {
        index: usize,
        expected: Id,
        actual: Id,
    },

    #[error("document {requested} fetched with mismatched content address {actual}")]
    AddressMismatch { requested: Id, actual: Id },

    #[error("unexpected document type: expected {expected}, found {actual}")]
    UnexpectedDocument {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unsupported compression codec: {0:?}")]
    UnsupportedCodec(String),

    #[error("document not found: {0}")]
    NotFound(Id),

    #[error("no private key for public key {0}")]
    MissingKey(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    pub fn malformed(what: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            what,
            reason: reason.to_string(),
        }
    }

    /// No private key is held for `public_key`; the message carries its hex.
    pub fn missing_key(public_key: &[u8]) -> Self {
        Self::MissingKey(hex::encode(public_key))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. }
            | Self::Malformed { .. }
            | Self::InvalidPublicKey(_)
            | Self::UnexpectedDocument { .. } => ErrorKind::MalformedInput,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::OutOfOrderPage { .. }
            | Self::PageCountMismatch { .. }
            | Self::PageKeyMismatch { .. }
            | Self::AddressMismatch { .. } => ErrorKind::ReferentialIntegrity,
            Self::UnsupportedCodec(_) => ErrorKind::UnsupportedCodec,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MissingKey(_) => ErrorKind::MissingKey,
            Self::Storage(_) | Self::Io(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

/// Reject `bytes` unless it is exactly `expected` long.
pub fn check_length(what: &'static str, bytes: &[u8], expected: usize) -> FolioResult<()> {
    if bytes.len() != expected {
        return Err(FolioError::LengthMismatch {
            what,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}
