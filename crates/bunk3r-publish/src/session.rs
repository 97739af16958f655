//! Publish session: one upload at a time, progress milestones, queue reset
//!
//! The in-progress flag is taken with a compare-exchange and released by a
//! drop guard, so it is cleared on success, on error, and on early return.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::assembler::{assemble, report, ProgressFn, ENCRYPTION_SHARE};
use crate::client::{ApiClient, PublishResponse};
use crate::error::PublishError;
use crate::selection::MediaQueue;

struct UploadGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> UploadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Publisher {
    client: ApiClient,
    uploading: AtomicBool,
}

impl Publisher {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            uploading: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    /// Encrypt the queued files, upload them with the caption, and clear the
    /// queue once the server confirms the post.
    ///
    /// A second call while one is in flight fails with
    /// [`PublishError::AlreadyUploading`] without doing any work. Failures are
    /// never retried; the queue is left intact so the user can try again.
    pub async fn publish(
        &self,
        caption: &str,
        queue: &mut MediaQueue,
        progress: Option<&ProgressFn>,
    ) -> Result<PublishResponse, PublishError> {
        let _guard = UploadGuard::acquire(&self.uploading).ok_or(PublishError::AlreadyUploading)?;

        queue.check_ready(caption)?;

        let form = assemble(caption, queue.files(), progress)?;
        report(progress, ENCRYPTION_SHARE, "uploading");

        let response = match self.client.submit(form).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, files = queue.len(), "publish failed");
                return Err(e);
            }
        };

        report(progress, 100, "published");
        info!(
            files = queue.len(),
            publication_id = ?response.publication_id,
            "publication created"
        );
        queue.clear();
        Ok(response)
    }
}
