use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuse the caller's `x-request-id` or mint one, and echo it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let header = match request
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|v| v.to_str().is_ok_and(|s| !s.is_empty()))
    {
        Some(existing) => existing.clone(),
        None => {
            // A UUID is always a valid header value
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request.headers_mut().insert(REQUEST_ID_HEADER, generated.clone());
            generated
        }
    };

    let span = tracing::info_span!("request", request_id = header.to_str().unwrap_or_default());
    let mut response = next.run(request).instrument(span).await;

    response.headers_mut().insert(REQUEST_ID_HEADER, header);
    response
}
