//! Request ID middleware for correlating logs with requests.
//!
//! Each request gets a UUID v4, unless the caller already sent an
//! `x-request-id` header, in which case that value is kept. The ID is attached
//! to a tracing span wrapping the whole request and echoed back in the
//! response's `x-request-id` header.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use http::header::{HeaderName, HeaderValue};
use tracing::Instrument;
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID, available from request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub HeaderValue);

/// Middleware that assigns a request ID and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .cloned()
        .unwrap_or_else(generate_request_id);

    let span = tracing::info_span!(
        "request",
        request_id = request_id.to_str().unwrap_or("<non-ascii>"),
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        response
            .headers_mut()
            .insert(X_REQUEST_ID.clone(), request_id);
        response
    }
    .instrument(span)
    .await
}

fn generate_request_id() -> HeaderValue {
    let id = Uuid::new_v4().hyphenated().to_string();
    // A hyphenated UUID is always a valid header value
    HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}
