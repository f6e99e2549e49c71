use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::{handlers::*, AppState};

/// Order submissions carry no request deadline: they make one model call per
/// order and each call is bounded by the LLM client timeout.
pub fn create_api_routes() -> Router<AppState> {
    Router::new().route("/invoices", post(create_invoices))
}

/// `request_timeout` bounds the page and health reads only.
pub fn create_page_routes(request_timeout: Duration) -> Router<AppState> {
    let timeout = TimeoutLayer::new(request_timeout);

    Router::new()
        .route("/", get(index).layer(timeout.clone()).post(submit_orders))
        .route("/health", get(health_check).layer(timeout))
}
