// # Cloudflare Registrar
//
// This crate provides the Cloudflare registrar for the DDNS bridge.
//
// ## Protocol
//
// Cloudflare addresses records by an opaque id, so an update takes two calls:
//
// 1. List the zone's records and look for one named like the request's FQDN
// 2. Found: edit that record by id. Not found: create a new record
//
// Both the create and the edit call carry the same `{name, type, ttl, content}`
// payload and succeed with HTTP 200.
//
// ## Error Handling
//
// - Listing fails (non-200 status or a non-empty `errors` array)
//   -> `Error::QueryRejected` with the response body, nothing is written
// - Create/edit answered with anything but 200 -> `Error::Rejected` with the body
// - Host unreachable / unreadable payload -> transport errors from the core
// - No retry, no backoff: a failure goes straight back to the handler
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_bridge_core::config::{BridgeConfig, CloudflareConfig};
use ddns_bridge_core::traits::{
    DynDnsRequest, HttpRequest, HttpResponse, HttpTransport, Registrar, RegistrarFactory,
    StatusCode,
};
use ddns_bridge_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Record type managed by the bridge
const RECORD_TYPE: &str = "A";

/// Payload of the create and edit calls
#[derive(Debug, Serialize)]
struct RecordPayload {
    name: String,
    #[serde(rename = "type")]
    record_type: &'static str,
    ttl: u32,
    content: String,
}

/// Subset of the "list DNS records" response we rely on
#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    #[serde(default)]
    errors: Option<Vec<ApiMessage>>,
    #[serde(default)]
    result: Option<Vec<ListedRecord>>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListedRecord {
    name: String,
    id: String,
}

/// Cloudflare registrar
///
/// Holds the zone and credentials from configuration plus the shared
/// transport. Stateless between calls.
pub struct CloudflareRegistrar {
    /// API base URL, without trailing slash
    base_url: String,

    /// TTL for written records
    ttl: u32,

    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Zone holding the records
    zone_id: String,

    /// HTTP transport for API requests
    transport: Arc<dyn HttpTransport>,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareRegistrar")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("api_key", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

impl CloudflareRegistrar {
    /// Create a new Cloudflare registrar
    ///
    /// # Parameters
    ///
    /// - `config`: The `[cloudflare]` configuration block
    /// - `transport`: HTTP transport shared with the other registrars
    ///
    /// # Errors
    ///
    /// `Error::MissingConfig` if the base URL, TTL, token or zone ID is empty.
    pub fn new(config: &CloudflareConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        tracing::info!("Initializing Cloudflare registrar");
        config.validate()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ttl: config.ttl,
            api_key: config.api_key.clone(),
            zone_id: config.zone_id.clone(),
            transport,
        })
    }

    fn records_endpoint(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }

    fn authorized(&self, request: HttpRequest) -> HttpRequest {
        request.header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn payload(&self, request: &DynDnsRequest) -> RecordPayload {
        RecordPayload {
            name: request.fqdn(),
            record_type: RECORD_TYPE,
            ttl: self.ttl,
            content: request.ip.to_string(),
        }
    }

    /// Find the id of the zone record named `fqdn`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records
    /// Authorization: Bearer <token>
    /// ```
    ///
    /// # Returns
    ///
    /// - `Ok(Some(id))`: a record with that name exists
    /// - `Ok(None)`: no such record
    /// - `Err(Error::QueryRejected)`: listing failed
    async fn find_record_id(&self, fqdn: &str) -> Result<Option<String>> {
        let endpoint = self.records_endpoint();
        tracing::debug!("Listing Cloudflare records at {} to find {}", endpoint, fqdn);

        let response = self
            .transport
            .execute(self.authorized(HttpRequest::get(&endpoint)))
            .await?;

        if response.status != StatusCode::OK {
            log_rejection(&response, "Record lookup");
            return Err(Error::query_rejected(CloudflareConfig::REGISTRAR, response.body));
        }

        let listing: ListRecordsResponse = response.json()?;

        let errors = listing.errors.unwrap_or_default();
        if !errors.is_empty() {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            tracing::error!("Cloudflare reported errors while listing records: {:?}", messages);
            return Err(Error::query_rejected(CloudflareConfig::REGISTRAR, response.body));
        }

        let records = listing.result.unwrap_or_default();
        tracing::debug!("Comparing {} entries with {}", records.len(), fqdn);

        // DNS names compare case-insensitively; the last matching entry wins
        Ok(records
            .into_iter()
            .rfind(|record| record.name.eq_ignore_ascii_case(fqdn))
            .map(|record| record.id))
    }

    /// Create a new record
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "name": "bar.foo.com", "type": "A", "ttl": 300, "content": "1.2.3.4" }
    /// ```
    async fn create_record(&self, request: &DynDnsRequest) -> Result<()> {
        let endpoint = self.records_endpoint();
        let payload = self.payload(request);
        tracing::info!("Creating Cloudflare record {} -> {}", payload.name, payload.content);

        let http_request = self.authorized(HttpRequest::post(&endpoint)).json(&payload)?;
        let response = self.transport.execute(http_request).await?;

        self.expect_ok(response, "Record creation")
    }

    /// Overwrite the record with the given id
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// { "name": "bar.foo.com", "type": "A", "ttl": 300, "content": "1.2.3.4" }
    /// ```
    async fn edit_record(&self, request: &DynDnsRequest, id: &str) -> Result<()> {
        let endpoint = format!("{}/{}", self.records_endpoint(), id);
        let payload = self.payload(request);
        tracing::info!(
            "Updating Cloudflare record {} ({}) -> {}",
            payload.name,
            id,
            payload.content
        );

        let http_request = self.authorized(HttpRequest::put(&endpoint)).json(&payload)?;
        let response = self.transport.execute(http_request).await?;

        self.expect_ok(response, "Record update")
    }

    fn expect_ok(&self, response: HttpResponse, action: &str) -> Result<()> {
        if response.status != StatusCode::OK {
            log_rejection(&response, action);
            return Err(Error::rejected(CloudflareConfig::REGISTRAR, response.body));
        }

        tracing::debug!("{} successful", action);
        Ok(())
    }
}

/// Log a refused call with a hint for the common status codes
fn log_rejection(response: &HttpResponse, action: &str) {
    match response.status.as_u16() {
        401 | 403 => tracing::error!(
            "{} failed: invalid API token or insufficient permissions. Status: {}",
            action,
            response.status
        ),
        429 => tracing::error!(
            "{} failed: rate limit exceeded. Status: {}",
            action,
            response.status
        ),
        500..=599 => tracing::error!(
            "{} failed: Cloudflare server error: {} - {}",
            action,
            response.status,
            response.body
        ),
        _ => tracing::error!("{} failed: {} - {}", action, response.status, response.body),
    }
}

#[async_trait]
impl Registrar for CloudflareRegistrar {
    /// Create or update the A record for the request's FQDN
    ///
    /// # API Calls
    ///
    /// ```http
    /// # Look for an existing record
    /// GET /zones/:zone_id/dns_records
    ///
    /// # Then either
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// # or
    /// POST /zones/:zone_id/dns_records
    /// ```
    async fn update_record(&self, request: &DynDnsRequest) -> Result<()> {
        let fqdn = request.fqdn();

        match self.find_record_id(&fqdn).await? {
            Some(id) => {
                tracing::info!("Entry {} found, updating", fqdn);
                self.edit_record(request, &id).await
            }
            None => {
                tracing::info!("Entry {} not found, creating new", fqdn);
                self.create_record(request).await
            }
        }
    }

    fn name(&self) -> &'static str {
        CloudflareConfig::REGISTRAR
    }
}

/// Factory for creating Cloudflare registrars
pub struct CloudflareFactory;

impl RegistrarFactory for CloudflareFactory {
    fn name(&self) -> &'static str {
        CloudflareConfig::REGISTRAR
    }

    fn create(
        &self,
        config: &BridgeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Option<Arc<dyn Registrar>>> {
        if !config.cloudflare.enabled {
            return Ok(None);
        }

        tracing::debug!("Cloudflare enabled, registering");
        let registrar = CloudflareRegistrar::new(&config.cloudflare, transport)?;
        Ok(Some(Arc::new(registrar)))
    }
}
