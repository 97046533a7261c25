use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Method outside GET/POST/PUT/DELETE — rejected before any network I/O.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The call completed but the target answered with a non-200 status.
    #[error("Request failed with HTTP status {status}")]
    RequestFailed { status: u16, body: String },

    /// The call could not complete (connection, TLS, timeout, I/O).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
