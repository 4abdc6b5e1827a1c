use crate::infra::resolver::StaticHostMap;
use std::env;

/// Environment variable holding comma-separated `hostname=address` overrides.
pub const STATIC_HOST_MAPPINGS_VAR: &str = "STATIC_HOST_MAPPINGS";

pub struct Config {
    pub port: u16,
    pub static_hosts: StaticHostMap,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            static_hosts: env::var(STATIC_HOST_MAPPINGS_VAR)
                .map(|raw| StaticHostMap::parse(&raw))
                .unwrap_or_default(),
        }
    }
}
