use thiserror::Error;

use bunk3r_core::Bunk3rError;
use bunk3r_crypto::CryptoError;

/// Rejections raised before any encryption work starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("max {max} files per post")]
    TooManyFiles { max: usize },

    #[error("a post needs a caption or at least one file")]
    EmptyPost,

    #[error("no queued file at index {0}")]
    NoSuchFile(usize),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("an upload is already in progress")]
    AlreadyUploading,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("encryption failed: {0}")]
    Encryption(#[from] CryptoError),

    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("publication rejected: {0}")]
    Rejected(String),

    #[error("metadata serialization: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] Bunk3rError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
