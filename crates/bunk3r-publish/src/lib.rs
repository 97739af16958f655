//! bunk3r-publish: encrypted publication pipeline
//!
//!   - `selection`: validate picked files (count, type, size) before any crypto
//!   - `assembler`: one envelope per file → ordered multipart form
//!   - `client`: HTTP transport to the publications API
//!   - `session`: single-flight publish with progress milestones
//!   - `feed`: fetch + decrypt media for display, failures isolated per item

pub mod assembler;
pub mod client;
pub mod error;
pub mod feed;
pub mod selection;
pub mod session;

pub use assembler::{assemble, ProgressFn, UploadForm};
pub use client::{ApiClient, PublishResponse};
pub use error::{PublishError, ValidationError};
pub use feed::{load_feed_media, MediaRef};
pub use selection::{AddReport, MediaQueue, RejectReason, Rejection};
pub use session::Publisher;
