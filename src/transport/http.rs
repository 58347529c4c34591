use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::{debug, warn};

use crate::config::Config;
use crate::types::PollerError;

use super::{FragmentResponse, FragmentTransport};

/// [`FragmentTransport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: Result<Client, String>,
}

impl ReqwestTransport {
    /// Prepare an HTTP client. A client that fails to build is remembered
    /// and reported on every send instead of failing here.
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Self {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|err| err.to_string());

        if let Err(err) = &http {
            warn!(error = %err, "Failed to build HTTP client");
        }

        Self { http }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.request_timeout(), &config.user_agent)
    }
}

#[async_trait]
impl FragmentTransport for ReqwestTransport {
    async fn send(&self, method: &str, url: &str) -> Result<FragmentResponse, PollerError> {
        let http = self
            .http
            .as_ref()
            .map_err(|err| PollerError::ClientUnavailable(err.clone()))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| PollerError::InvalidMethod(method.to_string()))?;

        let response = http.request(method, url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(url = %url, status, bytes = body.len(), "Fragment response received");

        Ok(FragmentResponse { status, body })
    }
}
