//! Configuration file discovery and loading
//!
//! Lookup order:
//! 1. `--config PATH` / `DDNS_BRIDGE_CONFIG`
//! 2. `/data/options.json` (add-on deployments)
//! 3. `./config.toml`
//!
//! Files ending in `.json` are parsed as JSON, everything else as TOML.
//! Credential overrides from the environment are applied after parsing.

use anyhow::{Context, Result, bail};
use ddns_bridge_core::BridgeConfig;
use std::path::{Path, PathBuf};

/// Options file mounted into add-on containers
pub const ADDON_OPTIONS_PATH: &str = "/data/options.json";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_PATH: &str = "config.toml";

/// Locate, parse, override and validate the configuration
pub fn load(explicit: Option<&Path>) -> Result<BridgeConfig> {
    let path = resolve_path(
        explicit,
        Path::new(ADDON_OPTIONS_PATH),
        Path::new(LOCAL_CONFIG_PATH),
    )?;

    let mut config = from_file(&path)?;
    config.apply_env_overrides();
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    Ok(config)
}

/// Pick the config file to read
///
/// An explicit path is used as given, even if it does not exist, so that a
/// typo surfaces as a read error instead of silently falling back.
fn resolve_path(explicit: Option<&Path>, addon: &Path, local: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if addon.exists() {
        return Ok(addon.to_path_buf());
    }

    if local.exists() {
        return Ok(local.to_path_buf());
    }

    bail!(
        "No configuration file found. Pass --config, set DDNS_BRIDGE_CONFIG, or create {}",
        local.display()
    )
}

/// Parse a config file, choosing the format by extension
pub fn from_file(path: &Path) -> Result<BridgeConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Could not parse JSON config {}", path.display()))?
    } else {
        toml::from_str(&contents)
            .with_context(|| format!("Could not parse TOML config {}", path.display()))?
    };

    Ok(config)
}
