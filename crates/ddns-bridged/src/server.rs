//! HTTP routes
//!
//! Thin axum adapter around [`UpdateHandler`]: binds query parameters,
//! forwards them and turns the outcome into a response.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ddns_bridge_core::{StatusResponse, UpdateHandler, UpdateRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Build the API router
///
/// # Parameters
///
/// - `handler`: Shared update handler
/// - `enable_status_log`: Log requests to the status endpoint too
pub fn router(handler: Arc<UpdateHandler>, enable_status_log: bool) -> Router {
    Router::new()
        .route("/api/update", get(update))
        .route("/api/status", get(status))
        .with_state(handler)
        .layer(middleware::from_fn_with_state(
            enable_status_log,
            log_requests,
        ))
}

async fn update(
    State(handler): State<Arc<UpdateHandler>>,
    query: Result<Query<UpdateRequest>, QueryRejection>,
) -> Response {
    let Query(request) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!("Could not bind update parameters: {}", rejection);
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };

    let response = handler.handle_update(&request).await;
    (response.status, response.body).into_response()
}

async fn status(State(handler): State<Arc<UpdateHandler>>) -> Json<StatusResponse> {
    Json(handler.handle_status())
}

/// Log URI, status and latency of every request
///
/// Status checks are skipped unless `enable_status_log` is set.
async fn log_requests(
    State(enable_status_log): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    if enable_status_log || !uri.path().contains("/status") {
        info!(
            "{} {} -> {} ({:?})",
            method,
            uri,
            response.status().as_u16(),
            started.elapsed()
        );
    }

    response
}
