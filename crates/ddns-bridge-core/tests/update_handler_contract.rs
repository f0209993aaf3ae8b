//! Contract Test: Update Request Handling
//!
//! This test verifies how the update handler validates input, fans a
//! subdomain list out to the selected registrar and reports the outcome.
//!
//! Constraints verified:
//! - Invalid input is rejected with 400 before any registrar is called
//! - Subdomain entries must be `@` or DNS labels
//! - Each subdomain results in exactly one registrar call, in order
//! - The first registrar failure aborts the batch with 500
//! - Unknown registrars are reported with 400
//!
//! If this test fails, the HTTP API contract is broken.

mod common;

use common::*;
use ddns_bridge_core::UpdateRequest;
use reqwest::StatusCode;
use std::net::Ipv4Addr;

#[tokio::test]
async fn single_subdomain_success() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "bar", "10.0.0.1", "cloudflare"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        "created 1 entries for subdomains bar on foo.com: 10.0.0.1"
    );
    assert_eq!(cloudflare.update_call_count(), 1);

    let requests = cloudflare.requests();
    assert_eq!(requests[0].domain, "foo.com");
    assert_eq!(requests[0].subdomain, "bar");
    assert_eq!(requests[0].ip, Ipv4Addr::new(10, 0, 0, 1));
}

#[tokio::test]
async fn multiple_subdomains_are_updated_in_order() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "foo,bar,baz", "10.0.0.1", "cloudflare"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        "created 3 entries for subdomains foo,bar,baz on foo.com: 10.0.0.1"
    );
    assert_eq!(cloudflare.update_call_count(), 3);
    assert_eq!(cloudflare.updated_subdomains(), vec!["foo", "bar", "baz"]);
}

#[tokio::test]
async fn ipv6_address_is_rejected_without_registrar_call() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "bar", "::1", "cloudflare"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("invalid IP address"));
    assert_eq!(
        response.body,
        "missing or invalid IP address, only IPv4 allowed"
    );
    assert_eq!(cloudflare.update_call_count(), 0);
}

#[tokio::test]
async fn malformed_ip_is_checked_before_subdomains() {
    let porkbun = MockRegistrar::new("porkbun");
    let handler = handler_with(&[porkbun.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "", "10.0,0.1", "porkbun"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        "missing or invalid IP address, only IPv4 allowed"
    );
}

#[tokio::test]
async fn invalid_domain_is_rejected() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo bar.com", "bar", "10.0.0.1", "cloudflare"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "missing or invalid domain name");
    assert_eq!(cloudflare.update_call_count(), 0);
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler.handle_update(&UpdateRequest::default()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        "missing or invalid IP address, only IPv4 allowed"
    );

    let response = handler
        .handle_update(&UpdateRequest {
            ip: Some("10.0.0.1".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "missing or invalid domain name");

    assert_eq!(cloudflare.update_call_count(), 0);
}

#[tokio::test]
async fn empty_subdomain_parameter_is_rejected() {
    let porkbun = MockRegistrar::new("porkbun");
    let handler = handler_with(&[porkbun.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "", "10.0.0.1", "porkbun"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "missing subdomains parameter");
    assert_eq!(porkbun.update_call_count(), 0);
}

#[tokio::test]
async fn subdomain_list_with_empty_entries_is_rejected() {
    let porkbun = MockRegistrar::new("porkbun");
    let handler = handler_with(&[porkbun.clone()]);

    for csv in [",,,", "foo,,bar", "foo,"] {
        let response = handler
            .handle_update(&update_request("foo.com", csv, "10.0.0.1", "porkbun"))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", csv);
        assert_eq!(response.body, "missing subdomains parameter");
    }

    // Nothing was half-applied
    assert_eq!(porkbun.update_call_count(), 0);
}

#[tokio::test]
async fn subdomains_that_are_not_dns_labels_are_rejected() {
    let gandi = MockRegistrar::new("gandi");
    let handler = handler_with(&[gandi.clone()]);

    for csv in [
        "bar?x=",
        "../../other.org/records/www",
        "www,foo/bar",
        "foo..bar",
        "foo bar",
    ] {
        let response = handler
            .handle_update(&update_request("foo.com", csv, "10.0.0.1", "gandi"))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", csv);
        assert_eq!(response.body, "invalid subdomain name");
    }

    // The valid leading entry of "www,foo/bar" was not sent either
    assert_eq!(gandi.update_call_count(), 0);
}

#[tokio::test]
async fn apex_token_targets_the_bare_domain() {
    let gandi = MockRegistrar::new("gandi");
    let handler = handler_with(&[gandi.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "@,www", "10.0.0.1", "gandi"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        "created 2 entries for subdomains @,www on foo.com: 10.0.0.1"
    );

    let requests = gandi.requests();
    assert!(requests[0].is_apex());
    assert_eq!(requests[0].fqdn(), "foo.com");
    assert_eq!(requests[1].fqdn(), "www.foo.com");
}

#[tokio::test]
async fn unknown_registrar_is_a_bad_request() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "bar", "10.0.0.1", "porkbun"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "registrar not found: porkbun");
    assert_eq!(cloudflare.update_call_count(), 0);
}

#[tokio::test]
async fn registrar_failure_is_reported_verbatim() {
    let cloudflare = MockRegistrar::failing_on("cloudflare", 1, "failed to update");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "bar", "10.0.0.1", "cloudflare"))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "failed to update");
}

#[tokio::test]
async fn first_failure_aborts_remaining_subdomains() {
    let cloudflare = MockRegistrar::failing_on("cloudflare", 2, "failed to update");
    let handler = handler_with(&[cloudflare.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "foo,bar,baz", "10.0.0.1", "cloudflare"))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "failed to update");

    // foo applied, bar failed, baz never attempted
    assert_eq!(cloudflare.update_call_count(), 2);
    assert_eq!(cloudflare.updated_subdomains(), vec!["foo", "bar"]);
}

#[tokio::test]
async fn requests_are_dispatched_to_the_named_registrar_only() {
    let cloudflare = MockRegistrar::new("cloudflare");
    let gandi = MockRegistrar::new("gandi");
    let handler = handler_with(&[cloudflare.clone(), gandi.clone()]);

    let response = handler
        .handle_update(&update_request("foo.com", "a,b", "10.0.0.1", "gandi"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(gandi.update_call_count(), 2);
    assert_eq!(cloudflare.update_call_count(), 0);
}
