//! Infrastructure layer for the gateway's external concerns.
//!
//! - hostname resolution (ordered fallback chain)
//! - TLS trust policy selection
//!
//! Both are consumed by the executor and are swappable in tests.

pub mod resolver;
pub mod tls;

pub use resolver::{
    HostResolver, ResolutionOutcome, ResolutionSource, ResolveStrategy, StaticHostMap,
};
pub use tls::TlsTrustPolicy;
