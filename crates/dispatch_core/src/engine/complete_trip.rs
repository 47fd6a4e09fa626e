//! Driver marks dropoff: Active (started) -> Completed.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{Driver, DriverStats};
use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::{clock_now, release_driver};
use crate::error::DispatchError;
use crate::notify::{NotifyEvent, Outbox};
use crate::session::{Fare, SessionId, SessionStatus};
use crate::store::SessionStore;
use crate::telemetry::{CompletedRideRecord, DispatchTelemetry};

/// Completes the trip: session terminal, driver stats bumped exactly once,
/// driver released back to the pool. A retry by the driver who completed the
/// trip returns the same fare without re-applying any effect.
pub fn complete_trip(
    world: &mut World,
    id: SessionId,
    driver: Entity,
) -> Result<Fare, DispatchError> {
    let snapshot = world.resource::<SessionStore>().expect(id)?.clone();

    if snapshot.status == SessionStatus::Completed && snapshot.completed_by == Some(driver) {
        return snapshot.final_fare.ok_or(DispatchError::NoProposedFare);
    }

    authorize(world, Actor::Driver(driver), Action::CompleteTrip, Some(&snapshot))?;

    let now = clock_now(world);
    let mut fare: Fare = 0;
    world
        .resource_mut::<SessionStore>()
        .conditional_update(id, SessionStatus::Active, |s| {
            if !s.trip_started() {
                return Err(DispatchError::TripNotStarted);
            }
            let assigned = s.driver.take().ok_or(DispatchError::DriverUnavailable)?;
            fare = s.final_fare.ok_or(DispatchError::NoProposedFare)?;
            debug_assert!(s.completed_at.is_none(), "completed_at is set exactly once");
            s.completed_by = Some(assigned);
            s.status = SessionStatus::Completed;
            s.completed_at = Some(now);
            Ok(())
        })?;

    // Stats and availability change in the same step as the terminal write;
    // a driver is never left unavailable with no active trip.
    if let Some(mut stats) = world.get_mut::<DriverStats>(driver) {
        stats.trips_completed += 1;
        stats.total_earnings += u64::from(fare);
    }
    release_driver(world, driver);

    let session = world.resource::<SessionStore>().expect(id)?.clone();
    world
        .resource_mut::<DispatchTelemetry>()
        .completed_rides
        .push(CompletedRideRecord {
            session: id,
            rider: session.rider,
            driver,
            fare,
            created_at: session.created_at,
            claimed_at: session.negotiation_started_at.unwrap_or(session.created_at),
            accepted_at: session.accepted_at.unwrap_or(session.created_at),
            started_at: session.started_at.unwrap_or(session.created_at),
            completed_at: now,
        });
    world
        .resource_mut::<Outbox>()
        .notify(session.rider, NotifyEvent::TripCompleted { session: id, amount: fare });
    Ok(fare)
}
