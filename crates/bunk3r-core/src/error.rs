use thiserror::Error;

pub type Bunk3rResult<T> = Result<T, Bunk3rError>;

#[derive(Debug, Error)]
pub enum Bunk3rError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
