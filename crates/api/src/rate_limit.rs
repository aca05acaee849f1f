//! Per-Client Throttling for Estimate Routes
//!
//! Keyed on the peer IP, so the server must be started with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor settings for the estimate routes, reporting quota headers
pub type DefaultGovernorConfig = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// `[rate_limit]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Seconds for one spent request to be restored
    pub per_second: u64,
    /// Requests a client may send back to back
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 10,
        }
    }
}

/// Build the governor for the estimate routes. `None` if either value is zero.
pub fn create_governor_config(config: &RateLimitConfig) -> Option<Arc<DefaultGovernorConfig>> {
    let governor = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()?;
    Some(Arc::new(governor))
}
