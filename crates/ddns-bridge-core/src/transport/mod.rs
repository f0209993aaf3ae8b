//! reqwest-backed HTTP transport
//!
//! The daemon builds one [`ReqwestTransport`] at startup and shares it
//! between all registrars, so connections are pooled across requests.

use crate::error::{Error, Result};
use crate::traits::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::time::Duration;

/// [`HttpTransport`] implementation on top of `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with reqwest's default settings (no timeout)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::trace!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("HTTP request failed: {}", e);
            Error::executing_request(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::parsing_response(e)
        })?;

        Ok(HttpResponse { status, body })
    }
}
