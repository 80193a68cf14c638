use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type TimeResult<T> = Result<T, TimeError>;
