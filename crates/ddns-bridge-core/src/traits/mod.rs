//! Core traits for the DDNS bridge
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Registrar`]: Create or update an A record through one registrar's API
//! - [`RegistrarFactory`]: Build a registrar from the bridge configuration
//! - [`HttpTransport`]: Execute HTTP requests on behalf of a registrar

pub mod registrar;
pub mod transport;

pub use registrar::{DynDnsRequest, Registrar, RegistrarFactory};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, JSON_CONTENT_TYPE, Method, StatusCode,
};
