use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::template_engine::PageContext;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub order_details: String,
}

pub async fn index(State(state): State<AppState>) -> Response {
    render_page(&state, StatusCode::OK, page_context(&state))
}

/// Form submission: run every pasted order and show the results on the same page.
pub async fn submit_orders(State(state): State<AppState>, Form(form): Form<OrderForm>) -> Response {
    let context = page_context(&state).with_order_details(form.order_details.as_str());

    if form.order_details.trim().is_empty() {
        return render_page(
            &state,
            StatusCode::BAD_REQUEST,
            context.with_error("Please paste at least one order."),
        );
    }

    match state.service.process_orders(&form.order_details).await {
        Ok(outcome) => {
            info!(
                invoiced = outcome.results.len(),
                failed = outcome.failures.len(),
                "Order form processed"
            );
            render_page(&state, StatusCode::OK, context.with_outcome(outcome))
        }
        Err(e) => {
            warn!(error = %e, "Order form rejected");
            let status = StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            render_page(&state, status, context.with_error(e.to_string()))
        }
    }
}

fn page_context(state: &AppState) -> PageContext {
    PageContext::new(state.config.company.name.as_str())
}

fn render_page(state: &AppState, status: StatusCode, context: PageContext) -> Response {
    match state.templates.render_index(&context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}
