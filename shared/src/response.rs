use lambda_http::{Body, Error, Response, http::StatusCode};

use crate::error::ApiError;

/// JSON response with the CORS header every endpoint carries
pub fn json(status: StatusCode, body: &serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}

/// CORS preflight answer. `methods` is the handler's own method list.
pub fn preflight(methods: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", methods)
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn method_not_allowed() -> Result<Response<Body>, Error> {
    json(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({"error": "Method not allowed"}),
    )
}

/// Maps a pipeline outcome onto exactly one response, logging failures first.
pub fn respond(
    operation: &str,
    outcome: Result<serde_json::Value, ApiError>,
) -> Result<Response<Body>, Error> {
    match outcome {
        Ok(body) => json(StatusCode::OK, &body),
        Err(e) => {
            match &e {
                ApiError::InvalidRequest(_) => {
                    tracing::warn!("⚠️ {} rejected: {}", operation, e)
                }
                _ => tracing::error!("❌ {} failed: {}", operation, e),
            }
            json(e.status(), &e.body())
        }
    }
}
