//! Dispatch telemetry: counters plus a record per completed ride.

use bevy_ecs::prelude::{Entity, Resource};

use crate::session::{Fare, SessionId};

/// One completed ride, recorded when the driver marks dropoff.
/// Timestamps are scheduler-clock milliseconds; use the helpers for KPIs.
#[derive(Debug, Clone)]
pub struct CompletedRideRecord {
    pub session: SessionId,
    pub rider: Entity,
    pub driver: Entity,
    pub fare: Fare,
    pub created_at: u64,
    pub claimed_at: u64,
    pub accepted_at: u64,
    pub started_at: u64,
    pub completed_at: u64,
}

impl CompletedRideRecord {
    /// Time from request to a driver claiming the session.
    pub fn time_to_claim(&self) -> u64 {
        self.claimed_at.saturating_sub(self.created_at)
    }

    /// Time spent haggling before the requester accepted.
    pub fn negotiation_time(&self) -> u64 {
        self.accepted_at.saturating_sub(self.claimed_at)
    }

    /// Time from pickup to dropoff.
    pub fn trip_time(&self) -> u64 {
        self.completed_at.saturating_sub(self.started_at)
    }
}

#[derive(Debug, Default, Resource)]
pub struct DispatchTelemetry {
    pub sessions_created: u64,
    pub claims_accepted: u64,
    /// Claims that lost the conditional write ("already taken").
    pub claims_conflicted: u64,
    pub fares_proposed: u64,
    pub fares_rejected: u64,
    pub search_timeouts: u64,
    pub negotiation_timeouts: u64,
    /// Timeout jobs that found the session already resolved.
    pub stale_timeout_jobs: u64,
    pub sessions_cancelled: u64,
    pub completed_rides: Vec<CompletedRideRecord>,
}
