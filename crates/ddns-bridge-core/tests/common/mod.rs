//! Test doubles and common utilities for handler contract tests
//!
//! This module provides minimal test doubles that record how the handler
//! drives registrars, without any network access.

#![allow(dead_code)]

use ddns_bridge_core::error::{Error, Result};
use ddns_bridge_core::traits::{DynDnsRequest, Registrar};
use ddns_bridge_core::{RegistrarRegistry, UpdateHandler, UpdateRequest};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mock Registrar that tracks calls and can be told to fail
pub struct MockRegistrar {
    /// Registry key
    pub name: &'static str,
    /// Call counter for update_record()
    update_call_count: AtomicUsize,
    /// Requests seen by update_record(), in call order
    requests: Mutex<Vec<DynDnsRequest>>,
    /// 1-based call number that fails, with its message
    failure: Option<(usize, String)>,
}

impl MockRegistrar {
    /// A registrar whose updates always succeed
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            update_call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            failure: None,
        })
    }

    /// A registrar whose `call`-th update (1-based) fails with `message`
    pub fn failing_on(name: &'static str, call: usize, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            update_call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            failure: Some((call, message.to_string())),
        })
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Subdomains passed to update_record(), in call order
    pub fn updated_subdomains(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.subdomain.clone())
            .collect()
    }

    /// All requests passed to update_record()
    pub fn requests(&self) -> Vec<DynDnsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Registrar for MockRegistrar {
    async fn update_record(&self, request: &DynDnsRequest) -> Result<()> {
        let call = self.update_call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());

        match &self.failure {
            Some((failing_call, message)) if *failing_call == call => {
                Err(Error::other(message.clone()))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Build a handler over the given registrars
pub fn handler_with(registrars: &[Arc<MockRegistrar>]) -> UpdateHandler {
    let mut registry = RegistrarRegistry::new();
    for registrar in registrars {
        registry.register(Arc::clone(registrar) as Arc<dyn Registrar>);
    }
    UpdateHandler::new(Arc::new(registry))
}

/// Build update query parameters
pub fn update_request(domain: &str, subdomain: &str, ip: &str, registrar: &str) -> UpdateRequest {
    UpdateRequest {
        domain: Some(domain.to_string()),
        subdomain: Some(subdomain.to_string()),
        ip: Some(ip.to_string()),
        registrar: Some(registrar.to_string()),
    }
}
