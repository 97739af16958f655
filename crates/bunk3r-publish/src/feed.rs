//! Just-in-time decryption of media referenced by feed items and stories

use serde::{Deserialize, Serialize};
use tracing::warn;

use bunk3r_crypto::{decrypt_media, MediaBlob};

use crate::client::ApiClient;

/// Encrypted media reference as returned inside a feed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub key: String,
    pub iv: String,
    #[serde(rename = "type")]
    pub mime: String,
}

/// Fetch and decrypt every reference in order.
///
/// Each slot is independent: a failed download or a ciphertext that does not
/// authenticate leaves `None` in that slot and the rest still load.
pub async fn load_feed_media(client: &ApiClient, refs: &[MediaRef]) -> Vec<Option<MediaBlob>> {
    let mut out = Vec::with_capacity(refs.len());
    for media in refs {
        let blob = match client.fetch_bytes(&media.url).await {
            Ok(ciphertext) => decrypt_media(&ciphertext, &media.key, &media.iv, &media.mime),
            Err(e) => {
                warn!(url = %media.url, error = %e, "media download failed");
                None
            }
        };
        out.push(blob);
    }
    out
}
