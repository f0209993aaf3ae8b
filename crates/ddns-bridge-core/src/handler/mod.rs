//! Update and status request handling
//!
//! This module holds the framework-independent part of the HTTP API: it
//! takes the bound query parameters and produces a status code and a body.
//! The daemon adapts it to the web framework.
//!
//! ## Update Flow
//!
//! 1. Validate `ip` (IPv4 only), then `domain`
//! 2. Split `subdomain` on commas; any empty entry rejects the request
//! 3. For each subdomain, in order: look up the registrar, push the record
//! 4. Stop at the first failure; nothing already applied is rolled back

use crate::error::Error;
use crate::registry::RegistrarRegistry;
use crate::traits::DynDnsRequest;
use crate::validation::{parse_subdomains, validate_domain, validate_ipv4};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters of `GET /api/update`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    /// Parent domain
    pub domain: Option<String>,
    /// Comma-separated subdomain list; `@` stands for the apex
    pub subdomain: Option<String>,
    /// Target IPv4 address
    pub ip: Option<String>,
    /// Registrar name, e.g. "cloudflare"
    pub registrar: Option<String>,
}

/// Plain-text reply of the update endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Body text
    pub body: String,
}

impl UpdateResponse {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// JSON reply of the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `true` while the process serves requests
    pub api_status: bool,
    /// Names of the registrars that can be targeted
    pub active_services: Vec<String>,
}

/// Request handler shared by all connections
pub struct UpdateHandler {
    registry: Arc<RegistrarRegistry>,
}

impl UpdateHandler {
    /// Create a handler over a built registry
    pub fn new(registry: Arc<RegistrarRegistry>) -> Self {
        Self { registry }
    }

    /// Handle `GET /api/update`
    ///
    /// # Status Codes
    ///
    /// - `200`: every subdomain was updated
    /// - `400`: invalid input or unknown registrar; no registrar was called
    ///   for the failing subdomain
    /// - `500`: a registrar call failed; later subdomains were not attempted
    pub async fn handle_update(&self, request: &UpdateRequest) -> UpdateResponse {
        let domain = request.domain.as_deref().unwrap_or_default();
        let subdomains_csv = request.subdomain.as_deref().unwrap_or_default();
        let ip = request.ip.as_deref().unwrap_or_default();
        let registrar_name = request.registrar.as_deref().unwrap_or_default();

        tracing::info!(
            subdomains = subdomains_csv,
            domain,
            ip,
            registrar = registrar_name,
            "Update request received"
        );

        let parsed_ip = match validate_ipv4(ip) {
            Ok(parsed) => parsed,
            Err(e) => return Self::client_error(e),
        };

        if let Err(e) = validate_domain(domain) {
            return Self::client_error(e);
        }

        let subdomains = match parse_subdomains(subdomains_csv) {
            Ok(subdomains) => subdomains,
            Err(e) => return Self::client_error(e),
        };

        let mut updated = 0usize;

        for subdomain in subdomains {
            let registrar = match self.registry.find(registrar_name) {
                Ok(registrar) => registrar,
                Err(e) => return Self::client_error(e),
            };

            let dyn_request = DynDnsRequest::new(domain, subdomain, parsed_ip);

            if let Err(e) = registrar.update_record(&dyn_request).await {
                if e.is_transport() {
                    tracing::error!(
                        "Could not talk to {} while updating {}: {:?}",
                        registrar.name(),
                        dyn_request.fqdn(),
                        e
                    );
                } else {
                    tracing::error!(
                        "{} refused update of {}: {}",
                        registrar.name(),
                        dyn_request.fqdn(),
                        e
                    );
                }
                return UpdateResponse::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }

            updated += 1;
        }

        tracing::info!(
            updates = updated,
            subdomains = subdomains_csv,
            domain,
            "Records successfully updated"
        );

        UpdateResponse::new(
            StatusCode::OK,
            format!(
                "created {} entries for subdomains {} on {}: {}",
                updated, subdomains_csv, domain, ip
            ),
        )
    }

    /// Handle `GET /api/status`
    pub fn handle_status(&self) -> StatusResponse {
        StatusResponse {
            api_status: true,
            active_services: self.registry.list_active(),
        }
    }

    fn client_error(e: Error) -> UpdateResponse {
        if e.is_validation() {
            tracing::warn!("Rejecting invalid update request: {}", e);
        } else {
            tracing::warn!("Rejecting update request: {}", e);
        }
        UpdateResponse::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}
