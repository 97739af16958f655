//! Per-file key and IV generation from the OS secure random source

use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{IV_SIZE, KEY_SIZE};

/// A per-file 256-bit AES key. Zeroized on drop.
#[derive(Clone)]
pub struct MediaKey {
    bytes: [u8; KEY_SIZE],
}

impl MediaKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for MediaKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A 96-bit AES-GCM nonce. Must never repeat under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Iv([u8; IV_SIZE]);

impl Iv {
    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }
}

/// Generate a random 256-bit media key.
pub fn generate_key() -> CryptoResult<MediaKey> {
    let mut bytes = [0u8; KEY_SIZE];
    fill_secure(&mut bytes)?;
    Ok(MediaKey::from_bytes(bytes))
}

/// Generate a random 96-bit IV.
pub fn generate_iv() -> CryptoResult<Iv> {
    let mut bytes = [0u8; IV_SIZE];
    fill_secure(&mut bytes)?;
    Ok(Iv::from_bytes(bytes))
}

fn fill_secure(buf: &mut [u8]) -> CryptoResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::Entropy(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_generation() {
        let k1 = generate_key().unwrap();
        let k2 = generate_key().unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes(), "random keys must differ");
    }

    #[test]
    fn test_iv_uniqueness() {
        let mut seen = HashSet::with_capacity(10_000);
        for _ in 0..10_000 {
            let iv = generate_iv().unwrap();
            assert!(seen.insert(iv), "duplicate IV generated");
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = MediaKey::from_bytes([0xAB; KEY_SIZE]);
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("171"));
    }
}
