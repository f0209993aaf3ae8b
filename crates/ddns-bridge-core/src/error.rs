//! Error types for the DDNS bridge
//!
//! This module defines all error types used throughout the workspace.
//! The `Display` text of each variant is what callers of the HTTP API see,
//! so the wording is part of the external interface.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS bridge
#[derive(Error, Debug)]
pub enum Error {
    /// The `ip` parameter is absent or not a dotted-quad IPv4 address
    #[error("missing or invalid IP address, only IPv4 allowed")]
    InvalidIp,

    /// The `domain` parameter is absent or not a valid DNS name
    #[error("missing or invalid domain name")]
    InvalidDomain,

    /// The `subdomain` parameter is absent or contains an empty entry
    #[error("missing subdomains parameter")]
    MissingSubdomains,

    /// A `subdomain` entry is neither `@` nor a valid sequence of DNS labels
    #[error("invalid subdomain name")]
    InvalidSubdomain,

    /// A registrar is enabled but one of its required settings is empty.
    ///
    /// The offending field is not named.
    #[error("cannot setup {registrar} service, missing config param")]
    MissingConfig {
        /// Registrar whose block is incomplete
        registrar: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No enabled registrar answers to the requested name
    #[error("registrar not found: {0}")]
    RegistrarNotFound(String),

    /// The outbound request could not be assembled
    #[error("error building request")]
    BuildingRequest {
        /// Underlying cause, for logs only
        detail: String,
    },

    /// The registrar host could not be reached
    #[error("error executing request")]
    ExecutingRequest {
        /// Underlying cause, for logs only
        detail: String,
    },

    /// The registrar answered with a payload we could not read
    #[error("error parsing api response")]
    ParsingResponse {
        /// Underlying cause, for logs only
        detail: String,
    },

    /// The existence check against the registrar failed
    #[error("could not query record: {body}")]
    QueryRejected {
        /// Registrar name
        registrar: &'static str,
        /// Raw response body
        body: String,
    },

    /// The registrar refused the create/update call
    #[error("{registrar} rejected request: {body}")]
    Rejected {
        /// Registrar name
        registrar: &'static str,
        /// Raw response body
        body: String,
    },

    /// Generic error, for registrars implemented outside this workspace
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing configuration error
    pub fn missing_config(registrar: impl Into<String>) -> Self {
        Self::MissingConfig {
            registrar: registrar.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "registrar not found" error
    pub fn registrar_not_found(name: impl Into<String>) -> Self {
        Self::RegistrarNotFound(name.into())
    }

    /// Create a request building error
    pub fn building_request(detail: impl ToString) -> Self {
        Self::BuildingRequest {
            detail: detail.to_string(),
        }
    }

    /// Create a transport execution error
    pub fn executing_request(detail: impl ToString) -> Self {
        Self::ExecutingRequest {
            detail: detail.to_string(),
        }
    }

    /// Create a response parsing error
    pub fn parsing_response(detail: impl ToString) -> Self {
        Self::ParsingResponse {
            detail: detail.to_string(),
        }
    }

    /// Create a query rejection error
    pub fn query_rejected(registrar: &'static str, body: impl Into<String>) -> Self {
        Self::QueryRejected {
            registrar,
            body: body.into(),
        }
    }

    /// Create a registrar rejection error
    pub fn rejected(registrar: &'static str, body: impl Into<String>) -> Self {
        Self::Rejected {
            registrar,
            body: body.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether the failure happened before the registrar produced a usable answer
    ///
    /// Transport-level errors carry no remote response body.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::BuildingRequest { .. }
                | Self::ExecutingRequest { .. }
                | Self::ParsingResponse { .. }
        )
    }

    /// Whether the error was caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidIp
                | Self::InvalidDomain
                | Self::MissingSubdomains
                | Self::InvalidSubdomain
        )
    }
}
