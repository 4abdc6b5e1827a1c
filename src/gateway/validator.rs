//! Pre-flight request validation. Pure and synchronous: no network or
//! filesystem access happens here.

use crate::error::GatewayError;
use crate::gateway::types::RequestDescription;
use reqwest::Method;
use url::Url;

/// Methods the gateway will forward.
pub const ALLOWED_METHODS: [&str; 7] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS",
];

/// A request that passed validation: parsed method and absolute target URL,
/// with the hostname captured for the resolver.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub method: Method,
    pub url: Url,
    pub host: String,
}

pub fn validate(request: &RequestDescription) -> Result<ValidatedRequest, GatewayError> {
    let normalized = request.method.trim().to_ascii_uppercase();
    if !ALLOWED_METHODS.contains(&normalized.as_str()) {
        return Err(GatewayError::InvalidMethod(request.method.clone()));
    }
    let method = Method::from_bytes(normalized.as_bytes())
        .map_err(|_| GatewayError::InvalidMethod(request.method.clone()))?;

    let url = Url::parse(&request.target_url)
        .map_err(|e| GatewayError::InvalidTarget(format!("{}: {e}", request.target_url)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::InvalidTarget(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| GatewayError::InvalidTarget("URL has no host".to_string()))?
        .to_string();

    Ok(ValidatedRequest { method, url, host })
}

/// GET and HEAD never carry a body, regardless of caller input.
pub fn body_allowed(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}
