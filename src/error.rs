use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Pre-flight gateway failures.
///
/// Everything here is detected before any network activity. Post-flight
/// failures (transport errors, timeouts) are not errors at this level; they
/// are normalized into a status-0 response instead.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid target URL: {0}")]
    InvalidTarget(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid CA certificate: {0}")]
    InvalidCertificate(String),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidTarget(_) => "INVALID_TARGET",
            GatewayError::InvalidMethod(_) => "INVALID_METHOD",
            GatewayError::InvalidCertificate(_) => "INVALID_CERTIFICATE",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "code": self.code(),
            }
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
