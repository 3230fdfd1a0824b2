//! Axum middleware: the error-envelope finalizer and request logging.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Instant;

use crate::error::ErrorBody;

/// Finalize error responses into the uniform envelope.
///
/// Handlers that fail through [`ApiError`](crate::error::ApiError) leave an
/// [`ErrorBody`] in the response extensions; this middleware fills in the
/// request path. Error statuses produced outside any handler — unmatched
/// routes, method mismatches — get a synthesized envelope so the wire shape
/// is uniform everywhere.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;
    finalize(response, &path)
}

fn finalize(response: Response, path: &str) -> Response {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let body = response.extensions().get::<ErrorBody>().map_or_else(
        || ErrorBody::from_status(status, path),
        |body| ErrorBody {
            path: path.to_string(),
            ..body.clone()
        },
    );

    (status, Json(body)).into_response()
}

/// Log one line per request: method, path, status, duration.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let duration_ms = started.elapsed().as_millis();
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), duration_ms, "request");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), duration_ms, "request");
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn success_responses_pass_through() {
        let response = (StatusCode::OK, "fine").into_response();
        let finalized = finalize(response, "/sale/status");
        assert_eq!(finalized.status(), StatusCode::OK);
    }

    #[test]
    fn bare_errors_get_an_envelope() {
        let response = StatusCode::NOT_FOUND.into_response();
        let finalized = finalize(response, "/nowhere");
        assert_eq!(finalized.status(), StatusCode::NOT_FOUND);
    }
}
