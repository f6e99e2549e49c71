use anyhow::Result;
use dreamhaven_invoice_service::{create_app, AppState, InvoiceService, LlmClient, TemplateEngine};
use dreamhaven_utils::{init_logging, AppConfig, CoercionDefaults};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    info!("Starting DreamHaven Invoice Service");

    if config.llm.api_key.trim().is_empty() {
        warn!("No LLM API key configured; set OPENAI_API_KEY or DREAMHAVEN__LLM__API_KEY");
    }

    let llm = LlmClient::new(&config.llm)?.with_pricing(CoercionDefaults::from(&config.invoice));
    info!(model = %llm.model(), "LLM client ready");

    let state = AppState {
        service: InvoiceService::new(&config, Arc::new(llm))?,
        templates: Arc::new(TemplateEngine::new()?),
        config: Arc::new(config.clone()),
    };
    let app = create_app(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(output_dir = %config.invoice.output_dir, "Invoice Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
