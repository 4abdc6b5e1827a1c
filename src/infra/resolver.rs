//! Hostname resolution fallback chain.
//!
//! Resolution is best-effort diagnostics plus an override mechanism, never a
//! gate: system lookups only record what the transport will resolve on its
//! own, while static-mapping and hosts-file hits substitute the address that
//! is actually dialed. Strategies implement a common trait and are tried in
//! order; the chain never fails the call.

use async_trait::async_trait;
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};
use std::{
    collections::HashMap,
    net::IpAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

/// Per-attempt bound on system lookups so that exhausting the chain stays
/// well inside the caller's overall deadline.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// How a hostname was (or was not) mapped to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    SystemDualStack,
    SystemIpv4Only,
    StaticMapping,
    HostsFile,
    Unresolved,
}

impl ResolutionSource {
    /// Whether the resolved address replaces the hostname in the dialed URL.
    /// System results are advisory; the transport resolves on its own.
    pub fn overrides_dial_target(self) -> bool {
        matches!(self, Self::StaticMapping | Self::HostsFile)
    }
}

/// Record of a resolution attempt, used for logging and, for override
/// sources, for substituting the dialed address.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub hostname: String,
    pub resolved_address: Option<IpAddr>,
    pub source: ResolutionSource,
}

impl ResolutionOutcome {
    fn unresolved(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            resolved_address: None,
            source: ResolutionSource::Unresolved,
        }
    }
}

/// Immutable hostname-to-address override table, built once at startup from
/// a comma-separated `hostname=address` list.
#[derive(Debug, Default, Clone)]
pub struct StaticHostMap {
    entries: HashMap<String, IpAddr>,
}

impl StaticHostMap {
    pub fn parse(raw: &str) -> Self {
        let mut entries = HashMap::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some((host, addr)) => match addr.trim().parse::<IpAddr>() {
                    Ok(ip) => {
                        entries.insert(host.trim().to_ascii_lowercase(), ip);
                    }
                    Err(_) => {
                        tracing::warn!(entry = %pair, "ignoring static host mapping with unparseable address");
                    }
                },
                None => {
                    tracing::warn!(entry = %pair, "ignoring malformed static host mapping");
                }
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, hostname: &str) -> Option<IpAddr> {
        self.entries.get(&hostname.to_ascii_lowercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One step in the fallback chain. Returning `None` hands over to the next
/// strategy; strategies never fail the overall resolution.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    async fn resolve(&self, hostname: &str) -> Option<ResolutionOutcome>;
}

fn system_resolver(strategy: LookupIpStrategy) -> TokioAsyncResolver {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(error = %e, "system resolver configuration unavailable, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.ip_strategy = strategy;
    opts.timeout = LOOKUP_TIMEOUT;
    opts.attempts = 1;

    TokioAsyncResolver::tokio(config, opts)
}

/// System resolution over both address families.
pub struct SystemDualStack {
    resolver: Arc<TokioAsyncResolver>,
}

impl SystemDualStack {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(system_resolver(LookupIpStrategy::Ipv4AndIpv6)),
        }
    }
}

impl Default for SystemDualStack {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolveStrategy for SystemDualStack {
    async fn resolve(&self, hostname: &str) -> Option<ResolutionOutcome> {
        match self.resolver.lookup_ip(hostname).await {
            Ok(lookup) => {
                let address = lookup.iter().next()?;
                Some(ResolutionOutcome {
                    hostname: hostname.to_string(),
                    resolved_address: Some(address),
                    source: ResolutionSource::SystemDualStack,
                })
            }
            Err(e) => {
                tracing::debug!(hostname = %hostname, error = %e, "dual-stack system lookup failed");
                None
            }
        }
    }
}

/// IPv4-only diagnostic retry after a dual-stack failure.
pub struct SystemIpv4Only {
    resolver: Arc<TokioAsyncResolver>,
}

impl SystemIpv4Only {
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(system_resolver(LookupIpStrategy::Ipv4Only)),
        }
    }
}

impl Default for SystemIpv4Only {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolveStrategy for SystemIpv4Only {
    async fn resolve(&self, hostname: &str) -> Option<ResolutionOutcome> {
        match self.resolver.ipv4_lookup(hostname).await {
            Ok(lookup) => {
                let address = lookup.iter().next().map(|a| IpAddr::V4(a.0))?;
                Some(ResolutionOutcome {
                    hostname: hostname.to_string(),
                    resolved_address: Some(address),
                    source: ResolutionSource::SystemIpv4Only,
                })
            }
            Err(e) => {
                tracing::debug!(hostname = %hostname, error = %e, "IPv4-only system lookup failed");
                None
            }
        }
    }
}

/// Operator-supplied override table, consulted after system resolution has
/// been exhausted. Hits substitute the dialed address.
pub struct StaticMappingStrategy {
    map: Arc<StaticHostMap>,
}

impl StaticMappingStrategy {
    pub fn new(map: Arc<StaticHostMap>) -> Self {
        Self { map }
    }
}

#[async_trait]
impl ResolveStrategy for StaticMappingStrategy {
    async fn resolve(&self, hostname: &str) -> Option<ResolutionOutcome> {
        let address = self.map.lookup(hostname)?;
        Some(ResolutionOutcome {
            hostname: hostname.to_string(),
            resolved_address: Some(address),
            source: ResolutionSource::StaticMapping,
        })
    }
}

/// Local hosts file lookup, last override before giving up.
pub struct HostsFileStrategy {
    path: PathBuf,
}

impl HostsFileStrategy {
    pub fn new() -> Self {
        Self {
            path: default_hosts_path(),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for HostsFileStrategy {
    fn default() -> Self {
        Self::new()
    }
}

fn default_hosts_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// Scans hosts-file content for the first address line naming `hostname`.
/// `#` starts a comment; a line is `address name [name ...]`.
fn scan_hosts_content(content: &str, hostname: &str) -> Option<IpAddr> {
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("");
        let mut tokens = line.split_whitespace();
        let Some(address) = tokens.next().and_then(|t| t.parse::<IpAddr>().ok()) else {
            continue;
        };
        if tokens.any(|name| name.eq_ignore_ascii_case(hostname)) {
            return Some(address);
        }
    }
    None
}

#[async_trait]
impl ResolveStrategy for HostsFileStrategy {
    async fn resolve(&self, hostname: &str) -> Option<ResolutionOutcome> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "hosts file unreadable");
                return None;
            }
        };

        let address = scan_hosts_content(&content, hostname)?;
        Some(ResolutionOutcome {
            hostname: hostname.to_string(),
            resolved_address: Some(address),
            source: ResolutionSource::HostsFile,
        })
    }
}

/// Ordered fallback chain over [`ResolveStrategy`] implementations.
pub struct HostResolver {
    chain: Vec<Box<dyn ResolveStrategy>>,
}

impl HostResolver {
    /// Builds the standard chain: dual-stack, IPv4-only, a second dual-stack
    /// attempt (last system-level retry), static mappings, hosts file.
    pub fn new(static_hosts: Arc<StaticHostMap>) -> Self {
        Self {
            chain: vec![
                Box::new(SystemDualStack::new()),
                Box::new(SystemIpv4Only::new()),
                Box::new(SystemDualStack::new()),
                Box::new(StaticMappingStrategy::new(static_hosts)),
                Box::new(HostsFileStrategy::new()),
            ],
        }
    }

    pub fn with_chain(chain: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { chain }
    }

    /// Resolves a hostname through the chain. Never fails: an exhausted chain
    /// yields `Unresolved` and the outbound call proceeds with the original
    /// hostname.
    pub async fn resolve(&self, hostname: &str) -> ResolutionOutcome {
        // Literal addresses need no resolution at all.
        if let Ok(address) = hostname.parse::<IpAddr>() {
            return ResolutionOutcome {
                hostname: hostname.to_string(),
                resolved_address: Some(address),
                source: ResolutionSource::Unresolved,
            };
        }

        for strategy in &self.chain {
            if let Some(outcome) = strategy.resolve(hostname).await {
                return outcome;
            }
        }

        tracing::debug!(hostname = %hostname, "resolution chain exhausted");
        ResolutionOutcome::unresolved(hostname)
    }
}
