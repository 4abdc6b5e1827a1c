use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Incoming request description from the request composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescription {
    pub method: String,
    pub target_url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// A JSON string is sent verbatim; any other JSON value is a structured
    /// payload and is serialized as JSON on the wire.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub insecure_tls: bool,
    /// Base64-encoded PEM authority to validate against instead of the
    /// system trust store. Ignored when `insecure_tls` is set.
    #[serde(default)]
    pub ca_certificate: Option<String>,
}

/// Status text for a call that exceeded the deadline.
pub const STATUS_TEXT_TIMEOUT: &str = "Request Timeout";
/// Status text for a DNS/connect/TLS/transport failure.
pub const STATUS_TEXT_NETWORK_ERROR: &str = "Network Error";
/// Status text for an unexpected internal fault.
pub const STATUS_TEXT_SERVER_ERROR: &str = "Server Error";

/// The single canonical response shape returned for every call, including
/// locally-generated failures (status 0), so downstream consumers never
/// special-case error paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    /// Remote HTTP status, or 0 for a local failure.
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    /// URL after redirect following, as reported by the transport.
    pub final_url: String,
    pub redirected: bool,
}

impl NormalizedResponse {
    fn local_failure(url: &str, status_text: &str, diagnostic: String) -> Self {
        Self {
            status: 0,
            status_text: status_text.to_string(),
            headers: HashMap::new(),
            body: diagnostic,
            final_url: url.to_string(),
            redirected: false,
        }
    }

    pub fn timeout(url: &str, deadline: std::time::Duration) -> Self {
        Self::local_failure(
            url,
            STATUS_TEXT_TIMEOUT,
            format!("Request exceeded the {deadline:?} deadline and was cancelled"),
        )
    }

    pub fn network_error(url: &str, diagnostic: String) -> Self {
        Self::local_failure(url, STATUS_TEXT_NETWORK_ERROR, diagnostic)
    }

    pub fn server_error(url: &str, diagnostic: String) -> Self {
        Self::local_failure(url, STATUS_TEXT_SERVER_ERROR, diagnostic)
    }

    /// True for locally-generated failures (timeout, transport, internal).
    pub fn is_local_failure(&self) -> bool {
        self.status == 0
    }
}
