//! TLS trust policy selection.
//!
//! Exactly one policy applies per call. `insecure_tls` takes precedence over
//! a supplied CA certificate; that ordering is a confirmed product decision,
//! not an accident of the request shape.

use crate::error::GatewayError;
use crate::gateway::types::RequestDescription;
use base64::Engine;
use reqwest::{Certificate, ClientBuilder};

/// Marker required in a decoded caller-supplied authority.
pub const PEM_CERT_MARKER: &str = "-----BEGIN CERTIFICATE-----";

/// How the remote endpoint's certificate is validated for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsTrustPolicy {
    /// System trust store, full verification.
    Default,
    /// No certificate chain or hostname verification. A deliberate caller
    /// trade-off, surfaced on the stored history record.
    InsecureSkipVerify,
    /// Verification enabled, restricted to exactly this authority.
    CustomAuthority(String),
}

impl TlsTrustPolicy {
    /// Selects the policy for a request. Pre-flight: a bad CA payload fails
    /// here, before any network activity.
    pub fn from_request(request: &RequestDescription) -> Result<Self, GatewayError> {
        if request.insecure_tls {
            return Ok(Self::InsecureSkipVerify);
        }

        match request.ca_certificate.as_deref() {
            None => Ok(Self::Default),
            Some(encoded) => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| {
                        GatewayError::InvalidCertificate(format!("payload is not valid base64: {e}"))
                    })?;
                let pem = String::from_utf8(decoded).map_err(|_| {
                    GatewayError::InvalidCertificate(
                        "decoded payload is not UTF-8 text".to_string(),
                    )
                })?;
                if !pem.contains(PEM_CERT_MARKER) {
                    return Err(GatewayError::InvalidCertificate(
                        "decoded payload carries no PEM certificate".to_string(),
                    ));
                }
                Ok(Self::CustomAuthority(pem))
            }
        }
    }

    /// Applies the policy to an outbound client builder.
    pub fn apply(&self, builder: ClientBuilder) -> Result<ClientBuilder, GatewayError> {
        match self {
            Self::Default => Ok(builder),
            Self::InsecureSkipVerify => Ok(builder.danger_accept_invalid_certs(true)),
            Self::CustomAuthority(pem) => {
                let authority = Certificate::from_pem(pem.as_bytes()).map_err(|e| {
                    GatewayError::InvalidCertificate(format!("certificate rejected: {e}"))
                })?;
                Ok(builder
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(authority))
            }
        }
    }

    pub fn is_insecure(&self) -> bool {
        matches!(self, Self::InsecureSkipVerify)
    }

    /// Short form for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::InsecureSkipVerify => "insecure-skip-verify",
            Self::CustomAuthority(_) => "custom-authority",
        }
    }
}
