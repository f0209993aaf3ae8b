//! HTTP transport abstraction
//!
//! Registrars describe the call they want as an [`HttpRequest`] and hand it
//! to an injected [`HttpTransport`]. Production code uses
//! [`ReqwestTransport`](crate::transport::ReqwestTransport); tests can swap in
//! anything that implements the trait.

use async_trait::async_trait;
pub use reqwest::{Method, StatusCode};
use serde::Serialize;

/// Content type sent with every JSON request body
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// An outbound request, independent of the HTTP client library
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Header name/value pairs, sent in order
    pub headers: Vec<(String, String)>,
    /// Serialized body, if any
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a request with no headers and no body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Shorthand for a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as JSON and set the JSON content type
    ///
    /// # Errors
    ///
    /// [`Error::BuildingRequest`](crate::Error::BuildingRequest) if the body
    /// cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, crate::Error> {
        let bytes = serde_json::to_vec(body).map_err(crate::Error::building_request)?;
        self.body = Some(bytes);
        Ok(self.header("Content-Type", JSON_CONTENT_TYPE))
    }

    /// Look up a header value by case-insensitive name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as seen by a registrar
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Body text, kept verbatim for error reporting
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    ///
    /// [`Error::ParsingResponse`](crate::Error::ParsingResponse) on malformed
    /// or unexpected payloads.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::Error> {
        serde_json::from_str(&self.body).map_err(crate::Error::parsing_response)
    }
}

/// Trait for executing registrar HTTP calls
///
/// # Contract
///
/// - A response with *any* status code is `Ok`; judging the status is the
///   registrar's job.
/// - Failing to reach the host yields `Error::ExecutingRequest`.
/// - Failing to read the body yields `Error::ParsingResponse`.
/// - No retries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the status and body
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, crate::Error>;
}
