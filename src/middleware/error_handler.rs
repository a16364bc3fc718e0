use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::error;

// 5xx bodies are generic by design; the detail worth keeping ends up here.
const LOGGED_BODY_LIMIT: usize = 1024;

/// Logs the body of any 5xx response, then rebuilds the response unchanged.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;
    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, LOGGED_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to read error response body: {e}");
            return Response::from_parts(parts, Body::empty());
        }
    };

    error!(
        status = %parts.status,
        body = %String::from_utf8_lossy(&bytes),
        "request failed with a server error"
    );

    // the collected body may have been truncated at the limit, so the
    // original length header no longer holds
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
