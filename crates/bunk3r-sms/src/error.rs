use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("connection error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("status check failed: {0}")]
    Api(String),

    #[error(transparent)]
    Core(#[from] bunk3r_core::Bunk3rError),
}
