//! Upload assembly: per-file envelopes → one multipart form
//!
//! Multipart body layout:
//! ```text
//! caption              text
//! encryption_metadata  JSON array [{key, iv, type, name, size}, ...]
//! files                encrypted_0.bin   application/octet-stream
//! files                encrypted_1.bin   application/octet-stream
//! ...
//! ```
//!
//! Metadata index `i` belongs to part `encrypted_i.bin`. Position is the only
//! link between a ciphertext and its key.

use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use bunk3r_core::SelectedFile;
use bunk3r_crypto::{encrypt_file, MediaMetadata};

use crate::error::PublishError;

pub const CAPTION_FIELD: &str = "caption";
pub const METADATA_FIELD: &str = "encryption_metadata";
pub const FILES_FIELD: &str = "files";
pub const PART_CONTENT_TYPE: &str = "application/octet-stream";

/// Progress callback type (percent_done, 100, message)
pub type ProgressFn = Box<dyn Fn(u64, u64, &str) + Send + Sync>;

/// Share of the progress bar spent on encryption; the rest is transmission.
pub const ENCRYPTION_SHARE: u64 = 50;

pub(crate) fn report(progress: Option<&ProgressFn>, percent: u64, msg: &str) {
    if let Some(cb) = progress {
        cb(percent.min(100), 100, msg);
    }
}

/// One ciphertext part of the upload
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything one publish request carries
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub caption: String,
    pub metadata: Vec<MediaMetadata>,
    pub parts: Vec<FilePart>,
}

impl UploadForm {
    pub fn metadata_json(&self) -> Result<String, PublishError> {
        Ok(serde_json::to_string(&self.metadata)?)
    }

    /// Build the multipart body for reqwest.
    pub fn into_multipart(self) -> Result<Form, PublishError> {
        let metadata_json = self.metadata_json()?;
        let mut form = Form::new()
            .text(CAPTION_FIELD, self.caption)
            .text(METADATA_FIELD, metadata_json);

        for part in self.parts {
            let part = Part::bytes(part.bytes)
                .file_name(part.file_name)
                .mime_str(PART_CONTENT_TYPE)?;
            form = form.part(FILES_FIELD, part);
        }
        Ok(form)
    }
}

/// Name of the binary part at `index`.
pub fn part_name(index: usize) -> String {
    format!("encrypted_{index}.bin")
}

/// Encrypt every file, strictly one after another, and collect the form.
///
/// Any envelope failure aborts the whole batch; partial posts are never built.
pub fn assemble(
    caption: &str,
    files: &[SelectedFile],
    progress: Option<&ProgressFn>,
) -> Result<UploadForm, PublishError> {
    let total = files.len() as u64;
    let mut metadata = Vec::with_capacity(files.len());
    let mut parts = Vec::with_capacity(files.len());

    report(progress, 0, "encrypting");

    for (i, file) in files.iter().enumerate() {
        let (ciphertext, meta) = encrypt_file(file)?.into_parts();
        debug!(index = i, name = %meta.name, bytes = ciphertext.len(), "envelope built");

        metadata.push(meta);
        parts.push(FilePart {
            file_name: part_name(i),
            bytes: ciphertext,
        });

        let done = i as u64 + 1;
        report(
            progress,
            ENCRYPTION_SHARE * done / total,
            &format!("encrypted {done}/{total}"),
        );
    }

    info!(files = files.len(), "upload assembled");

    Ok(UploadForm {
        caption: caption.to_string(),
        metadata,
        parts,
    })
}
