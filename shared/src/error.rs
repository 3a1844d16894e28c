use lambda_http::http::StatusCode;

use crate::images::RecordError;
use crate::s3::BlobError;
use crate::vision::VisionError;

/// Everything a handler can answer with besides success.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client input missing or malformed (400)
    #[error("{0}")]
    InvalidRequest(&'static str),

    /// A called service answered with a non-success status (502)
    #[error("{error}: {detail}")]
    Upstream { error: String, detail: String },

    /// Anything else (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> serde_json::Value {
        match self {
            ApiError::InvalidRequest(message) => serde_json::json!({ "error": message }),
            ApiError::Upstream { error, detail } => {
                serde_json::json!({ "error": error, "detail": detail })
            }
            ApiError::Internal(message) => serde_json::json!({ "error": message }),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(e: BlobError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<VisionError> for ApiError {
    fn from(e: VisionError) -> Self {
        match e {
            VisionError::Upstream { body, .. } => ApiError::Upstream {
                error: "Vision API failed".to_string(),
                detail: body,
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_upstream_maps_to_bad_gateway_with_detail() {
        let err: ApiError = VisionError::Upstream {
            status: 401,
            body: "{\"code\":\"Unauthorized\"}".to_string(),
        }
        .into();

        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.body(),
            serde_json::json!({
                "error": "Vision API failed",
                "detail": "{\"code\":\"Unauthorized\"}",
            })
        );
    }

    #[test]
    fn record_errors_are_internal() {
        let err: ApiError = RecordError::NotFound("a::b".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body()["error"], "image record not found: a::b");
    }

    #[test]
    fn invalid_request_is_bad_request() {
        let err = ApiError::InvalidRequest("album and name required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), serde_json::json!({"error": "album and name required"}));
    }
}
