// # Registrar Trait
//
// Defines the interface for pushing an A record to a registrar API.
//
// ## Implementations
//
// - Cloudflare: `ddns-registrar-cloudflare` crate (query, then create or edit by id)
// - Gandi: `ddns-registrar-gandi` crate (single PUT upsert)
// - Porkbun: `ddns-registrar-porkbun` crate (query, then create or edit by name)
//
// ## Usage
//
// ```rust,ignore
// use ddns_bridge_core::{DynDnsRequest, Registrar};
//
// async fn push(registrar: &dyn Registrar) -> ddns_bridge_core::Result<()> {
//     let request = DynDnsRequest::new("example.com", "home", [203, 0, 113, 7].into());
//     registrar.update_record(&request).await
// }
// ```

use crate::config::BridgeConfig;
use crate::traits::HttpTransport;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// A single-subdomain update, as handed to a registrar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynDnsRequest {
    /// Parent domain (e.g., "example.com")
    pub domain: String,
    /// Subdomain label(s); empty means the apex record
    pub subdomain: String,
    /// Address the record must point to
    pub ip: Ipv4Addr,
}

impl DynDnsRequest {
    /// Create a new request
    pub fn new(domain: impl Into<String>, subdomain: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            ip,
        }
    }

    /// Whether the request targets the domain apex
    pub fn is_apex(&self) -> bool {
        self.subdomain.is_empty()
    }

    /// Fully qualified record name: `subdomain.domain`, or `domain` for the apex
    pub fn fqdn(&self) -> String {
        if self.is_apex() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.subdomain, self.domain)
        }
    }
}

/// Trait for registrar adapters
///
/// Each implementation hides one registrar's update protocol. After a
/// successful call the record for the request's FQDN exists and points at
/// the requested address; whether that took a create or an overwrite is the
/// adapter's business.
///
/// # Thread Safety
///
/// One instance serves every request for its registrar, concurrently.
/// Implementations hold immutable configuration and a shared transport only.
///
/// # Error Propagation
///
/// Adapters never log-and-swallow and never retry. Every failure is returned:
/// - transport problems as [`Error::ExecutingRequest`] / [`Error::ParsingResponse`]
/// - refusals by the registrar as [`Error::Rejected`] / [`Error::QueryRejected`],
///   carrying the response body
///
/// [`Error::ExecutingRequest`]: crate::Error::ExecutingRequest
/// [`Error::ParsingResponse`]: crate::Error::ParsingResponse
/// [`Error::Rejected`]: crate::Error::Rejected
/// [`Error::QueryRejected`]: crate::Error::QueryRejected
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Create or overwrite the A record described by `request`
    async fn update_record(&self, request: &DynDnsRequest) -> Result<(), crate::Error>;

    /// Stable registrar name, used as the registry key
    fn name(&self) -> &'static str;
}

/// Helper trait for constructing registrars from configuration
pub trait RegistrarFactory: Send + Sync {
    /// Name of the registrar this factory builds
    fn name(&self) -> &'static str;

    /// Create the registrar if its configuration block is enabled
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))`: enabled and fully configured
    /// - `Ok(None)`: not enabled
    /// - `Err(Error::MissingConfig)`: enabled, but a required value is empty
    fn create(
        &self,
        config: &BridgeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Option<Arc<dyn Registrar>>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(DynDnsRequest::new("foo.com", "bar", ip).fqdn(), "bar.foo.com");
        assert_eq!(
            DynDnsRequest::new("foo.com", "a.b", ip).fqdn(),
            "a.b.foo.com"
        );

        let apex = DynDnsRequest::new("foo.com", "", ip);
        assert!(apex.is_apex());
        assert_eq!(apex.fqdn(), "foo.com");
    }
}
