//! Registrar registry
//!
//! The registry holds one adapter per enabled registrar, keyed by
//! [`Registrar::name`]. It is assembled once at startup from the
//! configuration and the factories compiled into the binary, then shared
//! read-only between requests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_bridge_core::{RegistrarRegistry, ReqwestTransport};
//! use std::sync::Arc;
//!
//! let factories: Vec<Box<dyn RegistrarFactory>> = vec![
//!     Box::new(ddns_registrar_cloudflare::CloudflareFactory),
//!     Box::new(ddns_registrar_gandi::GandiFactory),
//! ];
//!
//! let registry = RegistrarRegistry::from_config(
//!     &config,
//!     &factories,
//!     Arc::new(ReqwestTransport::new()),
//! )?;
//!
//! let cloudflare = registry.find("cloudflare")?;
//! ```

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::traits::{HttpTransport, Registrar, RegistrarFactory};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of enabled registrars
///
/// ## Thread Safety
///
/// The registry is never mutated after construction, so it is shared
/// behind an `Arc` without locking.
#[derive(Default)]
pub struct RegistrarRegistry {
    registrars: HashMap<String, Arc<dyn Registrar>>,
}

impl RegistrarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration
    ///
    /// Every factory is asked to build its registrar; disabled registrars are
    /// skipped.
    ///
    /// # Errors
    ///
    /// - `Error::MissingConfig` if an enabled registrar lacks a required value
    /// - `Error::Config` if a registrar is enabled but no factory for it was
    ///   supplied (not compiled in), or if no registrar ends up enabled
    pub fn from_config(
        config: &BridgeConfig,
        factories: &[Box<dyn RegistrarFactory>],
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        tracing::debug!("Initializing registrar registry");

        for enabled in config.enabled_registrars() {
            if !factories.iter().any(|f| f.name() == enabled) {
                return Err(Error::config(format!(
                    "Registrar '{}' is enabled but not supported by this build",
                    enabled
                )));
            }
        }

        let mut registry = Self::new();

        for factory in factories {
            match factory.create(config, Arc::clone(&transport)) {
                Ok(Some(registrar)) => {
                    tracing::info!("Registering {} registrar", registrar.name());
                    registry.register(registrar);
                }
                Ok(None) => {
                    tracing::debug!("{} registrar not enabled", factory.name());
                }
                Err(e) => {
                    tracing::error!("Cannot initialize {} registrar: {}", factory.name(), e);
                    return Err(e);
                }
            }
        }

        if registry.is_empty() {
            return Err(Error::config("No registrars enabled, config invalid"));
        }

        Ok(registry)
    }

    /// Register a registrar under its own name
    ///
    /// A registrar with the same name replaces the previous one.
    pub fn register(&mut self, registrar: Arc<dyn Registrar>) {
        self.registrars
            .insert(registrar.name().to_string(), registrar);
    }

    /// Look up a registrar by name
    ///
    /// # Errors
    ///
    /// `Error::RegistrarNotFound` if no enabled registrar has that name.
    pub fn find(&self, name: &str) -> Result<Arc<dyn Registrar>> {
        tracing::debug!("Fetching registrar '{}' from registry", name);

        self.registrars
            .get(name)
            .cloned()
            .ok_or_else(|| Error::registrar_not_found(name))
    }

    /// Names of all active registrars, in no particular order
    pub fn list_active(&self) -> Vec<String> {
        self.registrars.keys().cloned().collect()
    }

    /// Number of active registrars
    pub fn len(&self) -> usize {
        self.registrars.len()
    }

    /// Whether no registrar is active
    pub fn is_empty(&self) -> bool {
        self.registrars.is_empty()
    }
}
