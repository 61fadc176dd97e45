use std::time::Duration;

use urldispatch_core::endpoint;

/// Fake dispatcher configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// `host:port` authority the service binds. Env var:
    /// `URL_DISPATCHER_ENDPOINT` (defaults to the well-known address).
    pub authority: String,
    /// Bound on endpoint publication (default 5s). Env var:
    /// `URL_DISPATCHER_START_TIMEOUT_SECS`.
    pub start_timeout: Duration,
    /// Bound on waiting for in-flight calls to drain at stop (default 5s).
    /// Env var: `URL_DISPATCHER_DRAIN_TIMEOUT_SECS`.
    pub drain_timeout: Duration,
}

impl DispatcherConfig {
    pub fn from_env() -> Self {
        Self {
            authority: endpoint::well_known_authority(),
            start_timeout: Duration::from_secs(
                std::env::var("URL_DISPATCHER_START_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            drain_timeout: Duration::from_secs(
                std::env::var("URL_DISPATCHER_DRAIN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }

    /// Config bound to an OS-assigned loopback port, for tests that must
    /// not touch the well-known endpoint.
    pub fn ephemeral() -> Self {
        Self {
            authority: "127.0.0.1:0".to_owned(),
            start_timeout: Duration::from_secs(5),
            drain_timeout: Duration::from_secs(5),
        }
    }
}
