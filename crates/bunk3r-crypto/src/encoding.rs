//! Base64 transport encoding for keys and IVs in JSON metadata

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{Iv, MediaKey};
use crate::{IV_SIZE, KEY_SIZE};

pub fn bytes_to_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn base64_to_bytes(s: &str) -> CryptoResult<Vec<u8>> {
    Ok(STANDARD.decode(s)?)
}

/// Export a key as standard base64 (44 characters).
pub fn export_key(key: &MediaKey) -> String {
    bytes_to_base64(key.as_bytes())
}

/// Import a key exported by [`export_key`].
pub fn import_key(encoded: &str) -> CryptoResult<MediaKey> {
    let mut raw = base64_to_bytes(encoded)?;
    if raw.len() != KEY_SIZE {
        let len = raw.len();
        raw.zeroize();
        return Err(CryptoError::InvalidKeyOrIv(format!(
            "key has wrong size: {len} bytes (expected {KEY_SIZE})"
        )));
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&raw);
    raw.zeroize();
    Ok(MediaKey::from_bytes(bytes))
}

pub fn export_iv(iv: &Iv) -> String {
    bytes_to_base64(iv.as_bytes())
}

pub fn import_iv(encoded: &str) -> CryptoResult<Iv> {
    let raw = base64_to_bytes(encoded)?;
    let bytes: [u8; IV_SIZE] = raw.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidKeyOrIv(format!(
            "IV has wrong size: {} bytes (expected {IV_SIZE})",
            raw.len()
        ))
    })?;
    Ok(Iv::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aead::{decrypt, encrypt};
    use crate::keys::{generate_iv, generate_key};

    #[test]
    fn test_exported_key_roundtrip_decrypts() {
        let key = generate_key().unwrap();
        let sealed = encrypt(b"exported and imported", &key).unwrap();

        let restored = import_key(&export_key(&key)).unwrap();
        assert_eq!(restored.as_bytes(), key.as_bytes());

        let decrypted = decrypt(&sealed.ciphertext, &restored, &sealed.iv).unwrap();
        assert_eq!(decrypted, b"exported and imported");
    }

    #[test]
    fn test_imported_key_encrypts_for_original() {
        let key = generate_key().unwrap();
        let restored = import_key(&export_key(&key)).unwrap();

        let sealed = encrypt(b"other direction", &restored).unwrap();
        let decrypted = decrypt(&sealed.ciphertext, &key, &sealed.iv).unwrap();
        assert_eq!(decrypted, b"other direction");
    }

    #[test]
    fn test_export_lengths() {
        let key = generate_key().unwrap();
        let iv = generate_iv().unwrap();
        assert_eq!(export_key(&key).len(), 44);
        assert_eq!(export_iv(&iv).len(), 16);
    }

    #[test]
    fn test_iv_roundtrip() {
        let iv = generate_iv().unwrap();
        assert_eq!(import_iv(&export_iv(&iv)).unwrap(), iv);
    }

    #[test]
    fn test_malformed_base64_is_decoding_error() {
        assert!(matches!(
            import_key("not base64!!"),
            Err(CryptoError::Decoding(_))
        ));
        assert!(matches!(
            base64_to_bytes("abc"),
            Err(CryptoError::Decoding(_))
        ));
    }

    #[test]
    fn test_wrong_length_is_rejected_not_truncated() {
        let short = bytes_to_base64(&[1u8; 16]);
        assert!(matches!(
            import_key(&short),
            Err(CryptoError::InvalidKeyOrIv(_))
        ));

        let long = bytes_to_base64(&[1u8; 13]);
        assert!(matches!(
            import_iv(&long),
            Err(CryptoError::InvalidKeyOrIv(_))
        ));
    }
}
