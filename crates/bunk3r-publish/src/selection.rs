//! Media selection queue: client-side validation before encryption
//!
//! Count, type, and size limits are enforced when files are added, so nothing
//! that reaches the assembler can be rejected for these reasons later. Files
//! added from disk are checked before they are read.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use bunk3r_core::config::LimitsConfig;
use bunk3r_core::{types::guess_mime, MediaKind, SelectedFile};

use crate::error::{PublishError, ValidationError};

/// Why a single file was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("{kind} too large: {size} bytes (max {max})")]
    TooLarge { kind: MediaKind, size: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

/// Outcome of adding a batch whose count fit within the limit
#[derive(Debug, Default)]
pub struct AddReport {
    pub accepted: usize,
    pub rejected: Vec<Rejection>,
}

/// Files queued for the next post, in selection order
#[derive(Debug)]
pub struct MediaQueue {
    limits: LimitsConfig,
    files: Vec<SelectedFile>,
}

impl MediaQueue {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            limits,
            files: Vec::new(),
        }
    }

    /// Add a batch of selected files.
    ///
    /// If the batch would push the queue past `max_files`, nothing is added.
    /// Otherwise each file is validated on its own and offenders are reported
    /// while the valid files are queued.
    pub fn add_files(&mut self, batch: Vec<SelectedFile>) -> Result<AddReport, ValidationError> {
        self.check_count(batch.len())?;

        let mut report = AddReport::default();
        for file in batch {
            match self.check_media(&file.mime, file.size()) {
                Ok(()) => {
                    debug!(name = %file.name, size = file.size(), "queued media file");
                    self.files.push(file);
                    report.accepted += 1;
                }
                Err(reason) => {
                    warn!(name = %file.name, reason = %reason, "media file rejected");
                    report.rejected.push(Rejection {
                        name: file.name,
                        reason,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Add files from disk, same rules as [`MediaQueue::add_files`].
    ///
    /// Type and size are checked from the extension and file metadata, so an
    /// oversized or unsupported file is never read into memory.
    pub async fn add_paths(&mut self, paths: &[PathBuf]) -> Result<AddReport, PublishError> {
        self.check_count(paths.len())?;

        let mut report = AddReport::default();
        for path in paths {
            let name = display_name(path);
            let mime = guess_mime(path);
            let size = tokio::fs::metadata(path).await?.len();

            let checked = match self.check_media(mime, size) {
                Ok(()) => {
                    let bytes = tokio::fs::read(path).await?;
                    // the file may have grown since the metadata call
                    self.check_media(mime, bytes.len() as u64).map(|()| bytes)
                }
                Err(reason) => Err(reason),
            };

            match checked {
                Ok(bytes) => {
                    debug!(name = %name, size = bytes.len(), "queued media file");
                    self.files.push(SelectedFile::new(name, mime, bytes));
                    report.accepted += 1;
                }
                Err(reason) => {
                    warn!(path = %path.display(), reason = %reason, "media file rejected");
                    report.rejected.push(Rejection { name, reason });
                }
            }
        }
        Ok(report)
    }

    fn check_count(&self, incoming: usize) -> Result<(), ValidationError> {
        if self.files.len() + incoming > self.limits.max_files {
            warn!(
                queued = self.files.len(),
                incoming,
                max = self.limits.max_files,
                "file batch refused: too many files"
            );
            return Err(ValidationError::TooManyFiles {
                max: self.limits.max_files,
            });
        }
        Ok(())
    }

    fn check_media(&self, mime: &str, size: u64) -> Result<(), RejectReason> {
        let kind =
            MediaKind::from_mime(mime).ok_or_else(|| RejectReason::UnsupportedType(mime.to_string()))?;
        let max = match kind {
            MediaKind::Image => self.limits.max_image_bytes,
            MediaKind::Video => self.limits.max_video_bytes,
        };
        if size > max {
            return Err(RejectReason::TooLarge { kind, size, max });
        }
        Ok(())
    }

    /// Remove a queued file before submission.
    pub fn remove(&mut self, index: usize) -> Result<SelectedFile, ValidationError> {
        if index >= self.files.len() {
            return Err(ValidationError::NoSuchFile(index));
        }
        Ok(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// A post needs a non-blank caption when no media is attached.
    pub fn check_ready(&self, caption: &str) -> Result<(), ValidationError> {
        if self.files.is_empty() && caption.trim().is_empty() {
            return Err(ValidationError::EmptyPost);
        }
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "media".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn image(name: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, "image/jpeg", vec![0u8; size])
    }

    fn video(name: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, "video/mp4", vec![0u8; size])
    }

    #[test]
    fn test_oversized_image_rejected() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        let report = queue
            .add_files(vec![image("big.jpg", 11 * MIB), image("ok.jpg", 1024)])
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].name, "big.jpg");
        assert!(matches!(
            report.rejected[0].reason,
            RejectReason::TooLarge {
                kind: MediaKind::Image,
                ..
            }
        ));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.files()[0].name, "ok.jpg");
    }

    #[test]
    fn test_video_uses_video_limit() {
        let limits = LimitsConfig {
            max_image_bytes: 10,
            max_video_bytes: 100,
            ..Default::default()
        };
        let mut queue = MediaQueue::new(limits);
        let report = queue
            .add_files(vec![video("clip.mp4", 50), image("pic.jpg", 50)])
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(queue.files()[0].name, "clip.mp4");
        assert_eq!(report.rejected[0].name, "pic.jpg");
    }

    #[test]
    fn test_size_at_limit_is_accepted() {
        let limits = LimitsConfig {
            max_image_bytes: 64,
            ..Default::default()
        };
        let mut queue = MediaQueue::new(limits);
        let report = queue.add_files(vec![image("edge.jpg", 64)]).unwrap();
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        let report = queue
            .add_files(vec![SelectedFile::new("doc.pdf", "application/pdf", vec![1])])
            .unwrap();

        assert_eq!(report.accepted, 0);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::UnsupportedType("application/pdf".into())
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_too_many_files_adds_none() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        let first: Vec<_> = (0..9).map(|i| image(&format!("{i}.jpg"), 10)).collect();
        queue.add_files(first).unwrap();
        assert_eq!(queue.len(), 9);

        let second: Vec<_> = (0..11).map(|i| image(&format!("n{i}.jpg"), 10)).collect();
        let err = queue.add_files(second).unwrap_err();

        assert_eq!(err, ValidationError::TooManyFiles { max: 10 });
        assert_eq!(err.to_string(), "max 10 files per post");
        assert_eq!(queue.len(), 9, "a refused batch must add nothing");
    }

    #[test]
    fn test_filling_to_exact_limit() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        let batch: Vec<_> = (0..10).map(|i| image(&format!("{i}.jpg"), 10)).collect();
        assert_eq!(queue.add_files(batch).unwrap().accepted, 10);
        assert!(queue.add_files(vec![image("x.jpg", 1)]).is_err());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        queue
            .add_files(vec![image("a.jpg", 1), image("b.jpg", 1), image("c.jpg", 1)])
            .unwrap();

        let removed = queue.remove(1).unwrap();
        assert_eq!(removed.name, "b.jpg");
        let names: Vec<_> = queue.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "c.jpg"]);

        assert_eq!(queue.remove(5).unwrap_err(), ValidationError::NoSuchFile(5));

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_check_ready() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        assert_eq!(queue.check_ready("   "), Err(ValidationError::EmptyPost));
        assert!(queue.check_ready("hello").is_ok());

        queue.add_files(vec![image("a.jpg", 1)]).unwrap();
        assert!(queue.check_ready("").is_ok(), "caption optional with media");
    }

    #[tokio::test]
    async fn test_add_paths_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("sunset.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let mut queue = MediaQueue::new(LimitsConfig::default());
        let report = queue.add_paths(&[path]).await.unwrap();

        assert_eq!(report.accepted, 1);
        let file = &queue.files()[0];
        assert_eq!(file.name, "sunset.png");
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.size(), 16);
    }

    #[tokio::test]
    async fn test_add_paths_unknown_extension_skipped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let photo = tmp.path().join("a.jpg");
        let notes = tmp.path().join("notes.txt");
        std::fs::write(&photo, b"jpeg bytes").unwrap();
        std::fs::write(&notes, b"text").unwrap();

        let mut queue = MediaQueue::new(LimitsConfig::default());
        let report = queue.add_paths(&[photo, notes]).await.unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(queue.files()[0].name, "a.jpg");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].name, "notes.txt");
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::UnsupportedType("application/octet-stream".into())
        );
    }

    #[tokio::test]
    async fn test_add_paths_oversized_video_checked_from_metadata() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("huge.mp4");
        // sparse: reports 300 MiB without allocating it on disk
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(300 * MIB as u64).unwrap();
        drop(file);

        let mut queue = MediaQueue::new(LimitsConfig::default());
        let report = queue.add_paths(&[path]).await.unwrap();

        assert_eq!(report.accepted, 0);
        assert!(queue.is_empty());
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::TooLarge {
                kind: MediaKind::Video,
                size: 300 * MIB as u64,
                max: 100 * MIB as u64,
            }
        );
    }

    #[tokio::test]
    async fn test_add_paths_too_many_refused_before_io() {
        let mut queue = MediaQueue::new(LimitsConfig {
            max_files: 2,
            ..Default::default()
        });
        let paths: Vec<PathBuf> = (0..3).map(|i| PathBuf::from(format!("/nonexistent/{i}.jpg"))).collect();

        let err = queue.add_paths(&paths).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::Validation(ValidationError::TooManyFiles { max: 2 })
        ));
    }

    #[tokio::test]
    async fn test_add_paths_missing_file_is_io_error() {
        let mut queue = MediaQueue::new(LimitsConfig::default());
        let err = queue
            .add_paths(&[PathBuf::from("/nonexistent/missing.jpg")])
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Io(_)));
    }
}
