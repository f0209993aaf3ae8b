// # ddns-bridge-core
//
// Core library for the dynamic DNS registrar bridge.
//
// ## Architecture Overview
//
// The bridge accepts a dyndns-style update request (domain, subdomains, IPv4)
// and forwards it to one of several registrar APIs:
// - **Registrar**: Trait every registrar adapter implements
// - **HttpTransport**: Injected HTTP capability adapters talk through
// - **RegistrarRegistry**: Set of enabled adapters, built once from config
// - **UpdateHandler**: Validates requests and fans them out per subdomain
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Protocol logic lives in the registrar crates,
//    request handling lives here, the daemon only wires things together
// 2. **Plugin-Based**: Registrars are selected through the registry, no
//    string matching on registrar names in the handler
// 3. **Library-First**: Everything except process bootstrap is usable as a library
// 4. **Fail Fast**: A multi-subdomain batch stops at the first failure

pub mod config;
pub mod error;
pub mod handler;
pub mod registry;
pub mod traits;
pub mod transport;
pub mod validation;

// Re-export core types for convenience
pub use config::{ApiConfig, BridgeConfig, CloudflareConfig, GandiConfig, PorkbunConfig};
pub use error::{Error, Result};
pub use handler::{StatusResponse, UpdateHandler, UpdateRequest, UpdateResponse};
pub use registry::RegistrarRegistry;
pub use traits::{DynDnsRequest, HttpTransport, Registrar, RegistrarFactory};
pub use transport::ReqwestTransport;
