use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShiftError {
    #[error("Cannot read shift file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid shift file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShiftError>;
