pub mod config;
pub mod error;
pub mod types;

pub use error::{Bunk3rError, Bunk3rResult};
pub use types::{MediaKind, SelectedFile};
