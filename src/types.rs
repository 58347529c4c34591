use thiserror::Error;

/// Errors surfaced by configuration loading and the HTTP transport.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP client unavailable: {0}")]
    ClientUnavailable(String),

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
}
