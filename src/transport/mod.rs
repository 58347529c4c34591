//! HTTP access used by polling sessions.

mod http;

use async_trait::async_trait;

use crate::types::PollerError;

pub use http::ReqwestTransport;

/// Status code and raw text body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentResponse {
    pub status: u16,
    pub body: String,
}

impl FragmentResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues one request per poll tick.
///
/// Returning [`PollerError::ClientUnavailable`] means no client could be
/// obtained at all; any other error is a failed request.
#[async_trait]
pub trait FragmentTransport: Send + Sync {
    async fn send(&self, method: &str, url: &str) -> Result<FragmentResponse, PollerError>;
}
