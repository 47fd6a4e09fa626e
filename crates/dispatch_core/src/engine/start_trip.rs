//! Driver marks pickup: Active (accepted) -> Active (started).

use bevy_ecs::prelude::{Entity, World};

use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::clock_now;
use crate::error::DispatchError;
use crate::notify::{NotifyEvent, Outbox};
use crate::session::{SessionId, SessionStatus};
use crate::store::SessionStore;

/// Sets the start timestamp. A retry by the same assigned driver after the
/// trip already started succeeds without re-applying effects, so clients can
/// safely retry after a network drop.
pub fn start_trip(world: &mut World, id: SessionId, driver: Entity) -> Result<(), DispatchError> {
    let snapshot = world.resource::<SessionStore>().expect(id)?.clone();
    authorize(world, Actor::Driver(driver), Action::StartTrip, Some(&snapshot))?;

    if snapshot.status == SessionStatus::Active && snapshot.trip_started() {
        return Ok(());
    }

    let now = clock_now(world);
    world
        .resource_mut::<SessionStore>()
        .conditional_update(id, SessionStatus::Active, |s| {
            debug_assert!(s.started_at.is_none(), "started_at is set exactly once");
            s.started_at = Some(now);
            Ok(())
        })?;

    world
        .resource_mut::<Outbox>()
        .notify(snapshot.rider, NotifyEvent::TripStarted { session: id });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_helpers::{accepted_session, create_dispatch_world, spawn_driver, test_cell};

    #[test]
    fn start_sets_the_timestamp_and_notifies_the_rider() {
        let mut world = create_dispatch_world();
        let (rider, driver, id) = accepted_session(&mut world);

        start_trip(&mut world, id, driver).expect("start");

        let session = world.resource::<SessionStore>().get(id).expect("session");
        assert!(session.trip_started());
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(
            world.resource::<Outbox>().pending_for(rider).last().map(|n| &n.event),
            Some(&NotifyEvent::TripStarted { session: id })
        );
    }

    #[test]
    fn retry_by_the_assigned_driver_is_idempotent() {
        let mut world = create_dispatch_world();
        let (rider, driver, id) = accepted_session(&mut world);

        start_trip(&mut world, id, driver).expect("start");
        let started_at = world
            .resource::<SessionStore>()
            .get(id)
            .expect("session")
            .started_at;
        let notifications = world.resource::<Outbox>().pending_for(rider).len();

        start_trip(&mut world, id, driver).expect("retried after network loss");

        let session = world.resource::<SessionStore>().get(id).expect("session");
        assert_eq!(session.started_at, started_at);
        assert_eq!(
            world.resource::<Outbox>().pending_for(rider).len(),
            notifications,
            "retry must not re-notify"
        );
    }

    #[test]
    fn only_the_assigned_driver_starts() {
        let mut world = create_dispatch_world();
        let (_rider, _driver, id) = accepted_session(&mut world);
        let stranger = spawn_driver(&mut world, test_cell());

        assert_eq!(
            start_trip(&mut world, id, stranger),
            Err(DispatchError::NotAuthorized)
        );
    }

    #[test]
    fn starting_before_acceptance_is_a_conflict() {
        let mut world = create_dispatch_world();
        let (_rider, driver, id) = crate::test_helpers::claimed_session(&mut world);

        let err = start_trip(&mut world, id, driver).expect_err("not active yet");
        assert_eq!(
            err,
            DispatchError::StatusConflict {
                expected: SessionStatus::Active,
                actual: SessionStatus::Negotiating,
            }
        );
    }
}
