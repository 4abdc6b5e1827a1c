//! Gateway service abstraction layer.
//!
//! Provides a trait-based abstraction over request forwarding, enabling
//! dependency injection and easier testing.

use super::executor::Gateway;
use super::types::{NormalizedResponse, RequestDescription};
use crate::error::GatewayError;
use std::future::Future;
use std::pin::Pin;

type ForwardFuture<'a> =
    Pin<Box<dyn Future<Output = Result<NormalizedResponse, GatewayError>> + Send + 'a>>;

/// Trait for services that forward composed HTTP requests.
pub trait ForwardService: Send + Sync {
    /// Forwards a request description and returns the normalized outcome.
    fn forward(&self, request: RequestDescription) -> ForwardFuture<'_>;
}

impl ForwardService for Gateway {
    fn forward(&self, request: RequestDescription) -> ForwardFuture<'_> {
        Box::pin(Gateway::forward(self, request))
    }
}

/// Extension trait for `ForwardService` with composer-style conveniences.
pub trait ForwardServiceExt: ForwardService {
    /// Forwards a plain GET to the given URL.
    fn get(&self, url: &str) -> ForwardFuture<'_> {
        self.forward(RequestDescription {
            method: "GET".to_string(),
            target_url: url.to_string(),
            headers: Default::default(),
            body: None,
            insecure_tls: false,
            ca_certificate: None,
        })
    }

    /// Forwards a POST with the given body to the given URL.
    fn post(&self, url: &str, body: Option<serde_json::Value>) -> ForwardFuture<'_> {
        self.forward(RequestDescription {
            method: "POST".to_string(),
            target_url: url.to_string(),
            headers: Default::default(),
            body,
            insecure_tls: false,
            ca_certificate: None,
        })
    }
}

impl<T: ForwardService + ?Sized> ForwardServiceExt for T {}
