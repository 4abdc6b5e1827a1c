//! The forwarding pipeline: validate, resolve, execute under a trust policy,
//! normalize.
//!
//! One configurable pipeline covers every call; address substitution and
//! trust-policy selection are independent stages, not separate code paths.
//! Post-flight failures come back as status-0 responses, so callers always
//! receive something renderable.

use crate::error::GatewayError;
use crate::gateway::response;
use crate::gateway::types::{NormalizedResponse, RequestDescription};
use crate::gateway::validator::{self, ValidatedRequest};
use crate::infra::resolver::{HostResolver, StaticHostMap};
use crate::infra::tls::TlsTrustPolicy;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, HOST, USER_AGENT},
    Client, Method,
};
use std::{collections::HashMap, error::Error as _, sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::Instrument;
use uuid::Uuid;

/// Hard per-call deadline covering resolution and the outbound call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Sent unless the caller supplies their own User-Agent.
pub const DEFAULT_USER_AGENT: &str =
    concat!("http-workbench-gateway/", env!("CARGO_PKG_VERSION"));

/// The outbound request forwarding gateway.
///
/// Stateless across calls apart from the immutable static host table held by
/// the resolver; invocations may run concurrently without coordination.
pub struct Gateway {
    resolver: HostResolver,
    deadline: Duration,
}

impl Gateway {
    pub fn new(static_hosts: Arc<StaticHostMap>) -> Self {
        Self {
            resolver: HostResolver::new(static_hosts),
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Overrides the per-call deadline. Production keeps the default; tests
    /// shorten it.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Replaces the resolution chain wholesale.
    pub fn with_resolver(mut self, resolver: HostResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Forwards one request.
    ///
    /// `Err` is strictly pre-flight (invalid target, method, or certificate)
    /// and implies no network activity happened. Every post-flight outcome,
    /// including timeouts and transport failures, is an `Ok` response.
    pub async fn forward(
        &self,
        request: RequestDescription,
    ) -> Result<NormalizedResponse, GatewayError> {
        let correlation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "forward",
            %correlation_id,
            method = %request.method,
            target = %request.target_url,
        );
        self.forward_inner(request).instrument(span).await
    }

    async fn forward_inner(
        &self,
        request: RequestDescription,
    ) -> Result<NormalizedResponse, GatewayError> {
        let validated = validator::validate(&request)?;
        let policy = TlsTrustPolicy::from_request(&request)?;
        tracing::debug!(policy = policy.label(), "trust policy selected");
        if policy.is_insecure() && validated.url.scheme() != "https" {
            tracing::debug!("insecureTls set on a plain-http target, nothing to skip");
        }

        let builder = policy.apply(Client::builder().timeout(self.deadline))?;
        let client = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "failed to build outbound client");
                return Ok(NormalizedResponse::server_error(
                    validated.url.as_str(),
                    format!("Failed to build outbound client: {e}"),
                ));
            }
        };

        // Single timeout boundary around resolution and dispatch; dropping
        // the future on expiry cancels the in-flight call and releases the
        // pooled connection.
        match timeout(self.deadline, self.dispatch(&client, &validated, &request)).await {
            Ok(normalized) => Ok(normalized),
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "call cancelled at deadline");
                Ok(NormalizedResponse::timeout(
                    validated.url.as_str(),
                    self.deadline,
                ))
            }
        }
    }

    async fn dispatch(
        &self,
        client: &Client,
        validated: &ValidatedRequest,
        request: &RequestDescription,
    ) -> NormalizedResponse {
        let outcome = self.resolver.resolve(&validated.host).await;
        tracing::debug!(
            source = ?outcome.source,
            address = ?outcome.resolved_address,
            "resolution outcome"
        );

        let mut dial_url = validated.url.clone();
        let mut host_override = None;
        if outcome.source.overrides_dial_target() {
            if let Some(address) = outcome.resolved_address {
                if dial_url.set_ip_host(address).is_ok() {
                    // Dial the override address; the Host header keeps the
                    // original hostname for virtual hosting.
                    host_override = Some(host_header_value(validated));
                    tracing::debug!(address = %address, "dialing substituted address");
                } else {
                    tracing::warn!(address = %address, "address substitution failed, dialing original hostname");
                }
            }
        }

        let body = prepare_body(&validated.method, request.body.as_ref());
        let auto_json = matches!(body, OutboundBody::Json(_));
        let headers = build_headers(&request.headers, auto_json, host_override);

        let mut outbound = client
            .request(validated.method.clone(), dial_url.clone())
            .headers(headers);
        outbound = match body {
            OutboundBody::None => outbound,
            OutboundBody::Text(text) => outbound.body(text),
            OutboundBody::Json(json) => outbound.body(json),
        };

        match outbound.send().await {
            Ok(resp) => response::normalize(&dial_url, resp).await,
            Err(e) if e.is_timeout() => {
                NormalizedResponse::timeout(validated.url.as_str(), self.deadline)
            }
            Err(e) => {
                let diagnostic = error_chain(&e);
                tracing::warn!(error = %diagnostic, "outbound call failed");
                NormalizedResponse::network_error(validated.url.as_str(), diagnostic)
            }
        }
    }
}

/// Body to attach to the outbound call.
enum OutboundBody {
    None,
    /// Caller supplied a JSON string: sent verbatim, no content-type derived.
    Text(String),
    /// Caller supplied a structured payload: serialized, JSON content-type
    /// derived when the caller set none.
    Json(String),
}

fn prepare_body(method: &Method, body: Option<&serde_json::Value>) -> OutboundBody {
    if !validator::body_allowed(method) {
        return OutboundBody::None;
    }
    match body {
        None => OutboundBody::None,
        Some(serde_json::Value::String(text)) => OutboundBody::Text(text.clone()),
        Some(value) => OutboundBody::Json(value.to_string()),
    }
}

fn has_header(headers: &HashMap<String, String>, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// Default User-Agent merged under caller headers (caller values win), plus
/// the derived JSON content-type and the Host override when applicable.
fn build_headers(
    caller: &HashMap<String, String>,
    auto_json_content_type: bool,
    host_override: Option<String>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    if auto_json_content_type && !has_header(caller, "content-type") {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    for (name, value) in caller {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "dropping malformed caller header");
            }
        }
    }

    if let Some(host) = host_override {
        if let Ok(value) = HeaderValue::from_str(&host) {
            headers.insert(HOST, value);
        }
    }

    headers
}

/// Host header carrying the original hostname (and any explicit port) when
/// the dialed address was substituted.
fn host_header_value(validated: &ValidatedRequest) -> String {
    match validated.url.port() {
        Some(port) => format!("{}:{port}", validated.host),
        None => validated.host.clone(),
    }
}

/// Flattens a reqwest error and its source chain into one diagnostic line.
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
