//! Operational knobs for the dispatch engine. Read dynamically per request
//! with [`Default`] as the hard-coded fallback, so a missing config resource
//! never fails a ride.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Maximum drivers offered a session per search pass.
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Driver search radius around the pickup point, metres.
    pub search_radius_m: f64,
    /// Requests below this route distance are rejected up front.
    pub min_trip_km: f64,
    /// A session still Searching after this window is cancelled.
    pub search_timeout_secs: u64,
    /// A session still Negotiating after this window reverts to Searching.
    pub negotiation_timeout_secs: u64,
    /// TTL of the per-requester duplicate-submission lock.
    pub lock_ttl_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 3_000.0,
            min_trip_km: 1.0,
            search_timeout_secs: 90,
            negotiation_timeout_secs: 60,
            lock_ttl_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_operational_constants() {
        let config = DispatchConfig::default();
        assert_eq!(config.search_timeout_secs, 90);
        assert_eq!(config.negotiation_timeout_secs, 60);
        assert_eq!(config.lock_ttl_ms, 10_000);
        assert!(config.min_trip_km > 0.0);
    }
}
