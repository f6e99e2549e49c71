//! DreamHaven Invoice Service
//!
//! Turns pasted customer orders into numbered PDF invoices and delivery
//! summaries, using a hosted chat model to read the free-form order text.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use dreamhaven_utils::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod handlers;
pub mod llm_client;
pub mod middleware;
pub mod numbering;
pub mod pdf;
pub mod routes;
pub mod service;
pub mod template_engine;

pub use llm_client::{InvoiceExtractor, LlmClient};
pub use service::InvoiceService;
pub use template_engine::{PageContext, TemplateEngine};

use middleware::request_id_middleware;
use pdf::INVOICE_URL_PREFIX;

#[derive(Clone)]
pub struct AppState {
    pub service: InvoiceService,
    pub templates: Arc<TemplateEngine>,
    pub config: Arc<AppConfig>,
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(routes::create_page_routes(Duration::from_secs(config.server.timeout_seconds)))
        .nest("/api/v1", routes::create_api_routes())
        // Generated PDFs; ServeDir rejects paths that climb out of the directory
        .nest_service(INVOICE_URL_PREFIX, ServeDir::new(state.service.output_dir()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}
