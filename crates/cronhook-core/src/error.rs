use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request spec: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
