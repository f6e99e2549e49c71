use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let mut health_status = json!({
        "status": "healthy",
        "service": "dreamhaven-invoice-service",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    health_status["checks"]["counter"] = match state.service.counter().peek().await {
        Ok(last) => json!({"status": "healthy", "last_invoice_number": last}),
        Err(e) => json!({"status": "unhealthy", "message": e.to_string()}),
    };

    if health_status["checks"]["counter"]["status"] != "healthy" {
        health_status["status"] = json!("degraded");
    }

    Json(health_status)
}
