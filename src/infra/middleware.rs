//! Middleware for tracing requests and responses.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::trace::MakeSpan;

use super::error::{ApiResult, ClientError};

static X_REQUEST_ID: &str = "x-request-id";

/// Creates a span per request, tagged with the request id.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MakeRequestIdSpan;

impl<B> MakeSpan<B> for MakeRequestIdSpan {
    fn make_span(&mut self, request: &http::Request<B>) -> tracing::Span {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|id| id.to_str().ok())
            .unwrap_or("unknown");
        tracing::info_span!(
            "request",
            request_id = request_id,
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}

/// The maximum size of a body to trace.
const MAX_BODY_SIZE: u64 = 8192;

/// Traces small request and response bodies.
pub(crate) async fn trace_bodies(req: Request, next: Next) -> ApiResult<impl IntoResponse> {
    let (parts, body) = req.into_parts();
    let body = buffer_and_print("Request", body).await?;
    let req = Request::from_parts(parts, body);

    let res = next.run(req).await;

    let (parts, body) = res.into_parts();
    let body = buffer_and_print("Response", body).await?;
    Ok(Response::from_parts(parts, body))
}

/// Traces the body if it is known to be small, and hands back an equivalent body.
async fn buffer_and_print(direction: &str, body: Body) -> ApiResult<Body> {
    let small = matches!(body.size_hint().upper(), Some(n) if n <= MAX_BODY_SIZE);
    if !small || !tracing::enabled!(tracing::Level::TRACE) {
        return Ok(body);
    }

    let bytes: Bytes = axum::body::to_bytes(body, MAX_BODY_SIZE as usize)
        .await
        .map_err(|e| {
            ClientError::Custom(
                http::StatusCode::BAD_REQUEST,
                format!("failed to read {direction} body: {e}"),
            )
        })?;
    if let Ok(text) = std::str::from_utf8(&bytes) {
        tracing::trace!("{} body = {:?}", direction, text);
    }
    Ok(Body::from(bytes))
}
