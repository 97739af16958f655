use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The OS secure random source could not be read. Never retried.
    #[error("secure random source unavailable: {0}")]
    Entropy(String),

    #[error("AES-256-GCM encryption failed")]
    Encryption,

    #[error("authentication failed: wrong key, wrong IV, or corrupted data")]
    AuthenticationFailure,

    #[error("invalid key or IV: {0}")]
    InvalidKeyOrIv(String),

    #[error("base64 decode: {0}")]
    Decoding(#[from] base64::DecodeError),
}
