//! New ride request: create -> Searching.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::{JobKind, JobScheduler};
use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::{broadcast_to_candidates, clock_now, dispatch_config, tariff_config};
use crate::error::DispatchError;
use crate::locks::RequestLocks;
use crate::notify::Outbox;
use crate::pricing::fare_candidates;
use crate::routing::{estimate_distance_km, RouteEstimatorResource};
use crate::session::{Place, RideSession, ServiceTier, SessionId, SessionStatus};
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSpec {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

impl PlaceSpec {
    pub fn new(label: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            label: label.into(),
            lat,
            lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RideRequest {
    pub origin: PlaceSpec,
    pub destination: PlaceSpec,
    pub tier: ServiceTier,
}

/// Creates a session for the requester, schedules the search timeout, and
/// offers the ride to candidate drivers.
///
/// The whole operation runs under the requester's short-TTL lock so a
/// double-tap or retry storm cannot create two sessions; a concurrent
/// duplicate fails fast with [`DispatchError::LockBusy`].
pub fn request_ride(
    world: &mut World,
    rider: Entity,
    request: RideRequest,
) -> Result<SessionId, DispatchError> {
    authorize(world, Actor::Rider(rider), Action::RequestRide, None)?;

    let config = dispatch_config(world);
    let now = clock_now(world);
    if !world
        .resource_mut::<RequestLocks>()
        .try_acquire(rider, now, config.lock_ttl_ms)
    {
        return Err(DispatchError::LockBusy);
    }
    let result = request_ride_locked(world, rider, request, now);
    world.resource_mut::<RequestLocks>().release(rider);
    result
}

fn request_ride_locked(
    world: &mut World,
    rider: Entity,
    request: RideRequest,
    now: u64,
) -> Result<SessionId, DispatchError> {
    let config = dispatch_config(world);

    // Validation happens before any write.
    let origin = Place::new(request.origin.label, request.origin.lat, request.origin.lng)?;
    let destination = Place::new(
        request.destination.label,
        request.destination.lat,
        request.destination.lng,
    )?;

    if let Some(open) = world.resource::<SessionStore>().open_session_for(rider) {
        return Err(DispatchError::RequesterBusy(open));
    }

    let distance_km = {
        let estimator = world.resource::<RouteEstimatorResource>();
        estimate_distance_km(&**estimator, origin.cell, destination.cell)
    };
    if distance_km < config.min_trip_km {
        return Err(DispatchError::TripTooShort {
            distance_km,
            minimum_km: config.min_trip_km,
        });
    }

    let tariff = tariff_config(world);
    let candidates = fare_candidates(distance_km, request.tier, &tariff);

    let id = world.resource_mut::<SessionStore>().create(|id| RideSession {
        id,
        rider,
        driver: None,
        origin,
        destination,
        tier: request.tier,
        distance_km,
        fare_candidates: candidates,
        proposed_fare: None,
        final_fare: None,
        status: SessionStatus::Searching,
        rejected_drivers: Default::default(),
        notified_drivers: Default::default(),
        cancel_reason: None,
        completed_by: None,
        created_at: now,
        negotiation_started_at: None,
        accepted_at: None,
        started_at: None,
        completed_at: None,
    });

    world.resource_mut::<JobScheduler>().schedule_in_secs(
        config.search_timeout_secs,
        JobKind::SearchTimeout,
        id,
    );
    world.resource_mut::<DispatchTelemetry>().sessions_created += 1;

    broadcast_to_candidates(world, id);
    Ok(id)
}
