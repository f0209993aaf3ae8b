// # Porkbun Registrar
//
// Porkbun registrar for the DDNS bridge.
//
// ## Protocol
//
// Every Porkbun call is a POST whose JSON body carries the credentials next
// to the record fields:
//
// ```json
// { "name": "bar", "type": "A", "ttl": 600, "content": "1.2.3.4",
//   "apikey": "pk1_...", "secretapikey": "sk1_..." }
// ```
//
// 1. `POST /dns/retrieveByNameType/:domain/A/:subdomain` to see whether the record exists
// 2. Exists: `POST /dns/editByNameType/:domain/A/:subdomain`
// 3. Otherwise: `POST /dns/create/:domain`
//
// The apex record drops the trailing `/:subdomain` segment and is sent with
// an empty `name`.
//
// ## Error Handling
//
// - Lookup answered with non-200, or a payload whose `status` is not
//   `SUCCESS` -> `Error::QueryRejected` with the body
// - Lookup payload that is not JSON -> `Error::ParsingResponse`
// - Create/edit answered with non-200 -> `Error::Rejected` with the body
//
// ## Security Requirements
//
// - Neither key appears in logs or `Debug` output

use async_trait::async_trait;
use ddns_bridge_core::config::{BridgeConfig, PorkbunConfig};
use ddns_bridge_core::traits::{
    DynDnsRequest, HttpRequest, HttpResponse, HttpTransport, Registrar, RegistrarFactory,
    StatusCode,
};
use ddns_bridge_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Value of `status` in a successful lookup
const STATUS_SUCCESS: &str = "SUCCESS";

/// Body of every Porkbun call
#[derive(Serialize)]
struct RecordPayload<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'static str,
    ttl: u32,
    content: String,
    apikey: &'a str,
    secretapikey: &'a str,
}

#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    records: Option<Vec<RetrievedRecord>>,
}

#[derive(Debug, Deserialize)]
struct RetrievedRecord {
    name: String,
}

/// Porkbun registrar
pub struct PorkbunRegistrar {
    /// API base URL, without trailing slash
    base_url: String,

    /// TTL for written records
    ttl: u32,

    /// ⚠️ NEVER log this value
    api_key: String,

    /// ⚠️ NEVER log this value
    api_secret_key: String,

    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for PorkbunRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunRegistrar")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("api_key", &"<REDACTED>")
            .field("api_secret_key", &"<REDACTED>")
            .finish()
    }
}

impl PorkbunRegistrar {
    /// Create a new Porkbun registrar
    ///
    /// # Parameters
    ///
    /// - `config`: The `[porkbun]` configuration block
    /// - `transport`: HTTP transport shared with the other registrars
    ///
    /// # Errors
    ///
    /// `Error::MissingConfig` if the base URL, TTL or either key is empty.
    pub fn new(config: &PorkbunConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        tracing::info!("Initializing Porkbun registrar");
        config.validate()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ttl: config.ttl,
            api_key: config.api_key.clone(),
            api_secret_key: config.api_secret_key.clone(),
            transport,
        })
    }

    fn payload<'a>(&'a self, request: &'a DynDnsRequest) -> RecordPayload<'a> {
        RecordPayload {
            name: &request.subdomain,
            record_type: "A",
            ttl: self.ttl,
            content: request.ip.to_string(),
            apikey: &self.api_key,
            secretapikey: &self.api_secret_key,
        }
    }

    /// Endpoint addressing a record by name and type
    ///
    /// `action` is `retrieveByNameType` or `editByNameType`.
    fn by_name_type_endpoint(&self, action: &str, request: &DynDnsRequest) -> String {
        let mut endpoint = format!("{}/dns/{}/{}/A", self.base_url, action, request.domain);
        if !request.is_apex() {
            endpoint.push('/');
            endpoint.push_str(&request.subdomain);
        }
        endpoint
    }

    async fn post(&self, endpoint: &str, request: &DynDnsRequest) -> Result<HttpResponse> {
        let http_request = HttpRequest::post(endpoint).json(&self.payload(request))?;
        self.transport.execute(http_request).await
    }

    /// Whether an A record named like the request's FQDN exists
    async fn record_exists(&self, request: &DynDnsRequest) -> Result<bool> {
        let endpoint = self.by_name_type_endpoint("retrieveByNameType", request);
        tracing::info!(
            "Checking if record exists: subdomain={}, endpoint={}",
            request.subdomain,
            endpoint
        );

        let response = self.post(&endpoint, request).await?;

        if response.status != StatusCode::OK {
            tracing::error!("Could not query record: {} - {}", response.status, response.body);
            return Err(Error::query_rejected(PorkbunConfig::REGISTRAR, response.body));
        }

        let retrieved: RetrieveResponse = response.json()?;
        if retrieved.status != STATUS_SUCCESS {
            tracing::error!("Could not query record: {}", response.body);
            return Err(Error::query_rejected(PorkbunConfig::REGISTRAR, response.body));
        }

        let fqdn = request.fqdn();
        Ok(retrieved
            .records
            .unwrap_or_default()
            .iter()
            .any(|record| record.name.eq_ignore_ascii_case(&fqdn)))
    }

    async fn create_record(&self, request: &DynDnsRequest) -> Result<()> {
        let endpoint = format!("{}/dns/create/{}", self.base_url, request.domain);
        tracing::info!(
            "Creating new record: subdomain={}, endpoint={}, ip={}",
            request.subdomain,
            endpoint,
            request.ip
        );

        let response = self.post(&endpoint, request).await?;
        expect_ok(response)
    }

    async fn edit_record(&self, request: &DynDnsRequest) -> Result<()> {
        let endpoint = self.by_name_type_endpoint("editByNameType", request);
        tracing::info!(
            "Updating record: subdomain={}, endpoint={}, ip={}",
            request.subdomain,
            endpoint,
            request.ip
        );

        let response = self.post(&endpoint, request).await?;
        expect_ok(response)
    }
}

fn expect_ok(response: HttpResponse) -> Result<()> {
    if response.status != StatusCode::OK {
        tracing::error!("Porkbun rejected request: {} - {}", response.status, response.body);
        return Err(Error::rejected(PorkbunConfig::REGISTRAR, response.body));
    }
    Ok(())
}

#[async_trait]
impl Registrar for PorkbunRegistrar {
    async fn update_record(&self, request: &DynDnsRequest) -> Result<()> {
        if self.record_exists(request).await? {
            tracing::info!("Record {} exists, updating", request.fqdn());
            self.edit_record(request).await
        } else {
            self.create_record(request).await
        }
    }

    fn name(&self) -> &'static str {
        PorkbunConfig::REGISTRAR
    }
}

/// Factory for creating Porkbun registrars
pub struct PorkbunFactory;

impl RegistrarFactory for PorkbunFactory {
    fn name(&self) -> &'static str {
        PorkbunConfig::REGISTRAR
    }

    fn create(
        &self,
        config: &BridgeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Option<Arc<dyn Registrar>>> {
        if !config.porkbun.enabled {
            return Ok(None);
        }

        let registrar = PorkbunRegistrar::new(&config.porkbun, transport)?;
        Ok(Some(Arc::new(registrar)))
    }
}
