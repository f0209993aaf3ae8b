// # Gandi Registrar
//
// Gandi LiveDNS registrar for the DDNS bridge.
//
// LiveDNS replaces a whole rrset with one PUT, so there is no lookup step:
//
// ```http
// PUT /domains/:domain/records/:rrset_name/A
// Authorization: Apikey <key>
// { "rrset_name": "bar", "rrset_type": "A", "rrset_ttl": 300, "rrset_values": ["1.2.3.4"] }
// ```
//
// Gandi answers a successful upsert with 201. Any other status is reported
// as `Error::Rejected` carrying the response body.
//
// The apex record is addressed with the rrset name `@`.

use async_trait::async_trait;
use ddns_bridge_core::config::{BridgeConfig, GandiConfig};
use ddns_bridge_core::traits::{
    DynDnsRequest, HttpRequest, HttpTransport, Registrar, RegistrarFactory, StatusCode,
};
use ddns_bridge_core::{Error, Result};
use serde::Serialize;
use std::sync::Arc;

/// rrset name of the zone apex
const APEX_RRSET: &str = "@";

#[derive(Debug, Serialize)]
struct RrsetPayload<'a> {
    rrset_name: &'a str,
    rrset_type: &'static str,
    rrset_ttl: u32,
    rrset_values: Vec<String>,
}

/// Gandi LiveDNS registrar
pub struct GandiRegistrar {
    base_url: String,
    ttl: u32,

    /// ⚠️ NEVER log this value
    api_key: String,

    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for GandiRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiRegistrar")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl GandiRegistrar {
    /// Create a new Gandi registrar
    ///
    /// # Errors
    ///
    /// `Error::MissingConfig` if the base URL, TTL or API key is empty.
    pub fn new(config: &GandiConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        tracing::info!("Initializing Gandi registrar");
        config.validate()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ttl: config.ttl,
            api_key: config.api_key.clone(),
            transport,
        })
    }
}

#[async_trait]
impl Registrar for GandiRegistrar {
    async fn update_record(&self, request: &DynDnsRequest) -> Result<()> {
        let rrset_name = if request.is_apex() {
            APEX_RRSET
        } else {
            request.subdomain.as_str()
        };

        let endpoint = format!(
            "{}/domains/{}/records/{}/A",
            self.base_url, request.domain, rrset_name
        );

        let payload = RrsetPayload {
            rrset_name,
            rrset_type: "A",
            rrset_ttl: self.ttl,
            rrset_values: vec![request.ip.to_string()],
        };

        tracing::info!(
            "Building update request: subdomain={}, endpoint={}, ip={}",
            rrset_name,
            endpoint,
            request.ip
        );

        let http_request = HttpRequest::put(&endpoint)
            .header("Authorization", format!("Apikey {}", self.api_key))
            .json(&payload)?;

        let response = self.transport.execute(http_request).await?;

        if response.status != StatusCode::CREATED {
            tracing::error!(
                "Gandi rejected request: {} - {}",
                response.status,
                response.body
            );
            return Err(Error::rejected(GandiConfig::REGISTRAR, response.body));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        GandiConfig::REGISTRAR
    }
}

/// Factory for creating Gandi registrars
pub struct GandiFactory;

impl RegistrarFactory for GandiFactory {
    fn name(&self) -> &'static str {
        GandiConfig::REGISTRAR
    }

    fn create(
        &self,
        config: &BridgeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Option<Arc<dyn Registrar>>> {
        if !config.gandi.enabled {
            return Ok(None);
        }

        let registrar = GandiRegistrar::new(&config.gandi, transport)?;
        Ok(Some(Arc::new(registrar)))
    }
}
