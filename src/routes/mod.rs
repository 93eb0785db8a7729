//! HTTP route handlers for the label API.
//!
//! Routes are grouped by caching behavior, with per-group Cache-Control
//! headers. Label data is slow-changing and gets a long public cache; the
//! health probe must never be cached. Label routes also carry a bounded
//! request timeout so a wedged upstream cannot hold connections open
//! indefinitely.
//!
//! Request tracing is enabled via middleware that generates a unique request
//! ID for each incoming request, allowing correlation of all logs within a
//! request.

pub mod drugs;
pub mod health;
pub mod index;

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::{CACHE_CONTROL_HEALTH, CACHE_CONTROL_INDEX, CACHE_CONTROL_LABELS};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes, cache headers, and timeouts.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.http.request_timeout_seconds);

    // Label data - long cache, bounded handling time
    let label_routes = Router::new()
        .route("/drug/indications", get(drugs::indications))
        .route("/drug/dosage", get(drugs::dosage))
        .route("/drug/populations", get(drugs::populations))
        .route("/drug/storage", get(drugs::storage))
        .route("/drug/warnings", get(drugs::warnings))
        .route("/drug/pharmacology", get(drugs::pharmacology))
        .route("/drug/description", get(drugs::description))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_LABELS),
        ))
        .layer(TimeoutLayer::new(request_timeout));

    // Service descriptor - static per build
    let index_routes = Router::new().route("/", get(index::index)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_INDEX),
        ),
    );

    // Health check - never cached, always fresh for liveness probes
    let health_routes = Router::new().route("/health", get(health::health)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ),
    );

    Router::new()
        .merge(label_routes)
        .merge(index_routes)
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
