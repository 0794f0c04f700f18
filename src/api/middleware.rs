use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, error, warn};

/// Log every request outcome. 4xx are warnings, 5xx are errors, the rest is debug noise.
pub async fn log_request_errors(req: Request<Body>, next: Next) -> Response {
    let uri = req.uri().clone();
    let method = req.method().clone();
    let started = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status.as_u16() {
        400..=499 => warn!(%method, %uri, %status, elapsed_ms, "Client error"),
        500..=599 => error!(%method, %uri, %status, elapsed_ms, "Server error"),
        _ => debug!(%method, %uri, %status, elapsed_ms, "Request served"),
    }

    response
}
