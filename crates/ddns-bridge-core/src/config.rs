//! Configuration types for the DDNS bridge
//!
//! The configuration is loaded once at startup (see the `ddns-bridged`
//! daemon) and passed by reference into [`RegistrarRegistry::from_config`].
//! Nothing in the workspace reads configuration through global state.
//!
//! Keys are camelCase so that one file shape serves both the TOML file and
//! the JSON options file used by add-on deployments.
//!
//! [`RegistrarRegistry::from_config`]: crate::registry::RegistrarRegistry::from_config

use serde::{Deserialize, Serialize};

/// Environment variable overriding the Cloudflare API token
pub const ENV_CLOUDFLARE_API_KEY: &str = "DDNS_BRIDGE_CLOUDFLARE_API_KEY";
/// Environment variable overriding the Cloudflare zone ID
pub const ENV_CLOUDFLARE_ZONE_ID: &str = "DDNS_BRIDGE_CLOUDFLARE_ZONE_ID";
/// Environment variable overriding the Gandi API key
pub const ENV_GANDI_API_KEY: &str = "DDNS_BRIDGE_GANDI_API_KEY";
/// Environment variable overriding the Porkbun API key
pub const ENV_PORKBUN_API_KEY: &str = "DDNS_BRIDGE_PORKBUN_API_KEY";
/// Environment variable overriding the Porkbun secret API key
pub const ENV_PORKBUN_API_SECRET_KEY: &str = "DDNS_BRIDGE_PORKBUN_API_SECRET_KEY";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// HTTP API and logging settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Cloudflare registrar block
    #[serde(default)]
    pub cloudflare: CloudflareConfig,

    /// Gandi registrar block
    #[serde(default)]
    pub gandi: GandiConfig,

    /// Porkbun registrar block
    #[serde(default)]
    pub porkbun: PorkbunConfig,
}

impl BridgeConfig {
    /// Validate the api block
    ///
    /// Registrar blocks are checked when the registry is built, because
    /// only enabled registrars need complete settings.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.api.validate()
    }

    /// Names of the registrars whose `enabled` flag is set
    pub fn enabled_registrars(&self) -> Vec<&'static str> {
        let mut enabled = Vec::new();
        if self.cloudflare.enabled {
            enabled.push(CloudflareConfig::REGISTRAR);
        }
        if self.gandi.enabled {
            enabled.push(GandiConfig::REGISTRAR);
        }
        if self.porkbun.enabled {
            enabled.push(PorkbunConfig::REGISTRAR);
        }
        enabled
    }

    /// Replace credentials with values from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Replace credentials with values returned by `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_CLOUDFLARE_API_KEY) {
            self.cloudflare.api_key = v;
        }
        if let Some(v) = get(ENV_CLOUDFLARE_ZONE_ID) {
            self.cloudflare.zone_id = v;
        }
        if let Some(v) = get(ENV_GANDI_API_KEY) {
            self.gandi.api_key = v;
        }
        if let Some(v) = get(ENV_PORKBUN_API_KEY) {
            self.porkbun.api_key = v;
        }
        if let Some(v) = get(ENV_PORKBUN_API_SECRET_KEY) {
            self.porkbun.api_secret_key = v;
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Port the update API listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Human-readable multi-line log output instead of compact lines
    #[serde(default)]
    pub pretty_log: bool,

    /// Also log requests to the status endpoint
    ///
    /// Health checks poll the status endpoint often, so it is kept out of
    /// the request log unless asked for.
    #[serde(default)]
    pub enable_status_log: bool,

    /// Timeout for calls to registrar APIs, in seconds
    ///
    /// When unset the HTTP client defaults apply.
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

impl ApiConfig {
    /// Validate the api block
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.port == 0 {
            return Err(crate::Error::config("api.port must be > 0"));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(crate::Error::config(format!(
                "api.logLevel '{}' is not valid. Valid levels: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if self.upstream_timeout_secs == Some(0) {
            return Err(crate::Error::config("api.upstreamTimeoutSecs must be > 0"));
        }

        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            pretty_log: false,
            enable_status_log: false,
            upstream_timeout_secs: None,
        }
    }
}

fn default_port() -> u16 {
    9595
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Cloudflare registrar configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudflareConfig {
    /// Whether the registrar is registered at startup
    #[serde(default)]
    pub enabled: bool,

    /// API base URL, e.g. `https://api.cloudflare.com/client/v4`
    #[serde(default)]
    pub base_url: String,

    /// TTL for created/updated records
    #[serde(default)]
    pub ttl: u32,

    /// API token with Zone:DNS:Edit permission
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_key: String,

    /// Zone holding the managed records
    #[serde(default)]
    pub zone_id: String,
}

impl CloudflareConfig {
    /// Registry key of the Cloudflare registrar
    pub const REGISTRAR: &'static str = "cloudflare";

    /// Check that every required value is present
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty()
            || self.ttl == 0
            || self.api_key.is_empty()
            || self.zone_id.is_empty()
        {
            return Err(crate::Error::missing_config(Self::REGISTRAR));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("api_key", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

/// Gandi LiveDNS registrar configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GandiConfig {
    /// Whether the registrar is registered at startup
    #[serde(default)]
    pub enabled: bool,

    /// API base URL, e.g. `https://api.gandi.net/v5/livedns`
    #[serde(default)]
    pub base_url: String,

    /// TTL for created/updated records
    #[serde(default)]
    pub ttl: u32,

    /// LiveDNS API key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_key: String,
}

impl GandiConfig {
    /// Registry key of the Gandi registrar
    pub const REGISTRAR: &'static str = "gandi";

    /// Check that every required value is present
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() || self.ttl == 0 || self.api_key.is_empty() {
            return Err(crate::Error::missing_config(Self::REGISTRAR));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GandiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

/// Porkbun registrar configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PorkbunConfig {
    /// Whether the registrar is registered at startup
    #[serde(default)]
    pub enabled: bool,

    /// API base URL, e.g. `https://api.porkbun.com/api/json/v3`
    #[serde(default)]
    pub base_url: String,

    /// TTL for created/updated records
    #[serde(default)]
    pub ttl: u32,

    /// API key, sent in every request body
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_key: String,

    /// Secret API key, sent in every request body
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub api_secret_key: String,
}

impl PorkbunConfig {
    /// Registry key of the Porkbun registrar
    pub const REGISTRAR: &'static str = "porkbun";

    /// Check that every required value is present
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty()
            || self.ttl == 0
            || self.api_key.is_empty()
            || self.api_secret_key.is_empty()
        {
            return Err(crate::Error::missing_config(Self::REGISTRAR));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PorkbunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("api_key", &"<REDACTED>")
            .field("api_secret_key", &"<REDACTED>")
            .finish()
    }
}
