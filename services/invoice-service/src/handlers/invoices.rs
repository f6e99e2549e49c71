use axum::{extract::State, response::Json};
use dreamhaven_models::BatchOutcome;
use dreamhaven_utils::InvoiceResult;

use super::pages::OrderForm;
use crate::AppState;

/// JSON variant of the order form: same pipeline, structured outcome.
pub async fn create_invoices(
    State(state): State<AppState>,
    Json(request): Json<OrderForm>,
) -> InvoiceResult<Json<BatchOutcome>> {
    let outcome = state.service.process_orders(&request.order_details).await?;
    Ok(Json(outcome))
}
