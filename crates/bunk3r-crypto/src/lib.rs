//! bunk3r-crypto: client-side media encryption for BUNK3R publications
//!
//! Every selected file gets its own envelope:
//!
//! ```text
//! file bytes ─► fresh 256-bit key + fresh 96-bit IV ─► AES-256-GCM ─► ciphertext || tag
//!                        │                 │
//!                        └── base64 ───────┴──► {key, iv, type, name, size}  (JSON sidecar)
//! ```
//!
//! Keys are never reused across files, even within one post. The exported key
//! travels with the upload in `encryption_metadata`; the server can therefore
//! decrypt what it stores.

pub mod aead;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod keys;

pub use aead::{decrypt, encrypt, Sealed};
pub use encoding::{base64_to_bytes, bytes_to_base64, export_iv, export_key, import_iv, import_key};
pub use envelope::{decrypt_media, encrypt_file, EncryptedEnvelope, MediaBlob, MediaMetadata};
pub use error::{CryptoError, CryptoResult};
pub use keys::{generate_iv, generate_key, Iv, MediaKey};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const IV_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext
pub const TAG_SIZE: usize = 16;
