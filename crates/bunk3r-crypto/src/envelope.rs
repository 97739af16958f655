//! Per-file encryption envelopes and the decrypt consumer used by feed renderers
//!
//! An envelope is created once per selected file and never mutated. Its
//! metadata half is serialized into `encryption_metadata`; its ciphertext half
//! becomes the binary part at the same index.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bunk3r_core::SelectedFile;

use crate::aead::{decrypt, encrypt};
use crate::encoding::{export_iv, export_key, import_iv, import_key};
use crate::error::CryptoResult;
use crate::keys::generate_key;

/// Decryption parameters and cleartext description of one encrypted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// AES-256 key (base64)
    pub key: String,
    /// 96-bit IV (base64)
    pub iv: String,
    /// Original MIME type
    #[serde(rename = "type")]
    pub mime: String,
    /// Original file name
    pub name: String,
    /// Original size in bytes
    pub size: u64,
}

/// One encrypted file, ready for upload
#[derive(Debug, Clone)]
pub struct EncryptedEnvelope {
    ciphertext: Vec<u8>,
    metadata: MediaMetadata,
}

impl EncryptedEnvelope {
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    pub fn into_parts(self) -> (Vec<u8>, MediaMetadata) {
        (self.ciphertext, self.metadata)
    }
}

/// Encrypt one file under its own freshly generated key and IV.
///
/// The key exists in raw form only for the duration of this call.
pub fn encrypt_file(file: &SelectedFile) -> CryptoResult<EncryptedEnvelope> {
    let key = generate_key()?;
    let sealed = encrypt(&file.bytes, &key)?;

    debug!(
        name = %file.name,
        mime = %file.mime,
        size = file.bytes.len(),
        "encrypted media file"
    );

    Ok(EncryptedEnvelope {
        ciphertext: sealed.ciphertext,
        metadata: MediaMetadata {
            key: export_key(&key),
            iv: export_iv(&sealed.iv),
            mime: file.mime.clone(),
            name: file.name.clone(),
            size: file.size(),
        },
    })
}

/// Decrypted media, held in memory only
#[derive(Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl std::fmt::Debug for MediaBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBlob")
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Decrypt a media item for display.
///
/// Never fails: a malformed key or IV, or a ciphertext that does not
/// authenticate, is logged and yields `None` so the rest of the feed renders.
pub fn decrypt_media(
    ciphertext: &[u8],
    key_b64: &str,
    iv_b64: &str,
    original_type: &str,
) -> Option<MediaBlob> {
    match try_decrypt_media(ciphertext, key_b64, iv_b64) {
        Ok(bytes) => Some(MediaBlob {
            bytes,
            mime: original_type.to_string(),
        }),
        Err(e) => {
            warn!(error = %e, mime = %original_type, "media decryption failed");
            None
        }
    }
}

fn try_decrypt_media(ciphertext: &[u8], key_b64: &str, iv_b64: &str) -> CryptoResult<Vec<u8>> {
    let key = import_key(key_b64)?;
    let iv = import_iv(iv_b64)?;
    decrypt(ciphertext, &key, &iv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TAG_SIZE;
    use std::collections::HashSet;

    fn jpeg(name: &str, size: usize) -> SelectedFile {
        let bytes = (0..size).map(|i| (i.wrapping_mul(31) >> 2) as u8).collect();
        SelectedFile::new(name, "image/jpeg", bytes)
    }

    #[test]
    fn test_envelope_decrypts_back() {
        let file = jpeg("beach.jpg", 4096);
        let envelope = encrypt_file(&file).unwrap();
        let meta = envelope.metadata();

        assert_eq!(envelope.ciphertext().len(), 4096 + TAG_SIZE);
        assert_eq!(meta.mime, "image/jpeg");
        assert_eq!(meta.name, "beach.jpg");
        assert_eq!(meta.size, 4096);

        let blob = decrypt_media(envelope.ciphertext(), &meta.key, &meta.iv, &meta.mime).unwrap();
        assert_eq!(blob.bytes, file.bytes);
        assert_eq!(blob.mime, "image/jpeg");
    }

    #[test]
    fn test_batch_keys_and_ivs_are_independent() {
        let files = [jpeg("a.jpg", 10), jpeg("b.jpg", 10), jpeg("c.jpg", 10)];
        let envelopes: Vec<_> = files.iter().map(|f| encrypt_file(f).unwrap()).collect();

        let keys: HashSet<_> = envelopes.iter().map(|e| e.metadata().key.clone()).collect();
        let ivs: HashSet<_> = envelopes.iter().map(|e| e.metadata().iv.clone()).collect();

        assert_eq!(keys.len(), 3, "every file needs its own key");
        assert_eq!(ivs.len(), 3, "every file needs its own IV");
    }

    #[test]
    fn test_metadata_json_shape() {
        let envelope = encrypt_file(&jpeg("x.jpg", 3)).unwrap();
        let json = serde_json::to_value(envelope.metadata()).unwrap();

        assert_eq!(json["type"], "image/jpeg");
        assert_eq!(json["name"], "x.jpg");
        assert_eq!(json["size"], 3);
        assert!(json["key"].is_string());
        assert!(json["iv"].is_string());
        assert!(json.get("mime").is_none());
    }

    #[test]
    fn test_decrypt_media_bad_inputs_yield_none() {
        let envelope = encrypt_file(&jpeg("x.jpg", 32)).unwrap();
        let meta = envelope.metadata();

        assert!(decrypt_media(envelope.ciphertext(), "%%%", &meta.iv, "image/jpeg").is_none());
        assert!(decrypt_media(envelope.ciphertext(), &meta.key, "AAAA", "image/jpeg").is_none());

        let mut corrupted = envelope.ciphertext().to_vec();
        corrupted[0] ^= 0x80;
        assert!(decrypt_media(&corrupted, &meta.key, &meta.iv, "image/jpeg").is_none());
    }

    #[test]
    fn test_one_bad_item_does_not_affect_others() {
        let good = encrypt_file(&jpeg("good.jpg", 64)).unwrap();
        let bad = encrypt_file(&jpeg("bad.jpg", 64)).unwrap();

        let results: Vec<_> = [
            (good.ciphertext(), good.metadata().key.as_str()),
            (bad.ciphertext(), good.metadata().key.as_str()),
        ]
        .iter()
        .map(|(ct, key)| decrypt_media(ct, key, &good.metadata().iv, "image/jpeg"))
        .collect();

        assert!(results[0].is_some());
        assert!(results[1].is_none());
    }
}
