//! AES-256-GCM encryption/decryption of whole media buffers
//!
//! Ciphertext format (binary):
//! ```text
//! [N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The IV is not embedded; it travels base64-encoded in the upload metadata.
//! No AAD is bound: the positional index in the multipart body is the only
//! link between a ciphertext and its parameters.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{generate_iv, Iv, MediaKey};
use crate::TAG_SIZE;

/// Output of [`encrypt`]: ciphertext with tag, plus the IV it was sealed under.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub iv: Iv,
}

/// Encrypt a buffer with AES-256-GCM under a freshly generated IV.
pub fn encrypt(plaintext: &[u8], key: &MediaKey) -> CryptoResult<Sealed> {
    let iv = generate_iv()?;
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(iv.as_bytes()), plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    Ok(Sealed { ciphertext, iv })
}

/// Decrypt and verify a buffer produced by [`encrypt`].
///
/// The trailing 16 bytes are the GCM tag. Any mismatch of key, IV, or data
/// fails with [`CryptoError::AuthenticationFailure`].
pub fn decrypt(ciphertext: &[u8], key: &MediaKey, iv: &Iv) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(iv.as_bytes()), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}
