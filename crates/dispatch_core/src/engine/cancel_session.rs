//! Cancellation: any non-terminal status -> Cancelled.

use bevy_ecs::prelude::{Entity, World};

use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::release_driver;
use crate::error::DispatchError;
use crate::notify::{NotifyEvent, Outbox};
use crate::session::{CancelReason, SessionId};
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

/// Cancels the session with `reason`. The CAS runs against the status the
/// caller observed, so a cancellation racing any other transition resolves
/// to exactly one effect. An assigned driver is released; the counterpart is
/// notified; while still Searching, every driver who was offered the session
/// learns it is off the table.
pub fn cancel_session(
    world: &mut World,
    id: SessionId,
    actor: Actor,
    reason: CancelReason,
) -> Result<(), DispatchError> {
    let snapshot = world.resource::<SessionStore>().expect(id)?.clone();
    authorize(world, actor, Action::Cancel, Some(&snapshot))?;

    if snapshot.status.is_terminal() {
        return Err(DispatchError::AlreadyResolved(snapshot.status));
    }

    let mut released: Option<Entity> = None;
    world
        .resource_mut::<SessionStore>()
        .conditional_update(id, snapshot.status, |s| {
            released = s.driver.take();
            s.proposed_fare = None;
            s.status = crate::session::SessionStatus::Cancelled;
            s.cancel_reason = Some(reason);
            Ok(())
        })?;

    if let Some(driver) = released {
        release_driver(world, driver);
        if actor != Actor::Driver(driver) {
            world
                .resource_mut::<Outbox>()
                .notify(driver, NotifyEvent::SessionCancelled { session: id, reason });
        }
    } else if !snapshot.notified_drivers.is_empty() {
        // Still Searching: tell the offered pool the session is gone.
        let mut outbox = world.resource_mut::<Outbox>();
        for driver in &snapshot.notified_drivers {
            outbox.notify(*driver, NotifyEvent::SessionOffTheTable { session: id });
        }
    }

    if actor != Actor::Rider(snapshot.rider) {
        world
            .resource_mut::<Outbox>()
            .notify(snapshot.rider, NotifyEvent::SessionCancelled { session: id, reason });
    }
    world.resource_mut::<DispatchTelemetry>().sessions_cancelled += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ecs::{Driver, DriverState};
    use crate::session::SessionStatus;
    use crate::test_helpers::{
        accepted_session, create_dispatch_world, requested_session, spawn_driver, test_cell,
    };

    #[test]
    fn requester_cancels_a_search_and_the_pool_is_told() {
        let mut world = create_dispatch_world();
        let offered = spawn_driver(&mut world, test_cell());
        let (rider, id) = requested_session(&mut world);

        cancel_session(&mut world, id, Actor::Rider(rider), CancelReason::Requester)
            .expect("cancel");

        let session = world.resource::<SessionStore>().get(id).expect("session");
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert_eq!(session.cancel_reason, Some(CancelReason::Requester));
        assert!(session.assignment_invariant_holds());
        assert!(world
            .resource::<Outbox>()
            .pending_for(offered)
            .iter()
            .any(|n| n.event == NotifyEvent::SessionOffTheTable { session: id }));
    }

    #[test]
    fn driver_cancellation_releases_them_and_notifies_the_rider() {
        let mut world = create_dispatch_world();
        let (rider, driver, id) = accepted_session(&mut world);

        cancel_session(&mut world, id, Actor::Driver(driver), CancelReason::Driver)
            .expect("cancel");

        let session = world.resource::<SessionStore>().get(id).expect("session");
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert_eq!(session.driver, None);

        assert_eq!(
            world.get::<Driver>(driver).expect("driver").state,
            DriverState::Available
        );
        assert!(world
            .resource::<Outbox>()
            .pending_for(rider)
            .iter()
            .any(|n| matches!(n.event, NotifyEvent::SessionCancelled { .. })));
    }

    #[test]
    fn terminal_sessions_cannot_be_cancelled() {
        let mut world = create_dispatch_world();
        let (rider, id) = requested_session(&mut world);

        cancel_session(&mut world, id, Actor::Rider(rider), CancelReason::Requester)
            .expect("first");
        assert_eq!(
            cancel_session(&mut world, id, Actor::Rider(rider), CancelReason::Requester),
            Err(DispatchError::AlreadyResolved(SessionStatus::Cancelled))
        );
    }

    #[test]
    fn strangers_cannot_cancel() {
        let mut world = create_dispatch_world();
        let (_rider, id) = requested_session(&mut world);
        let stranger = spawn_driver(&mut world, test_cell());

        assert_eq!(
            cancel_session(&mut world, id, Actor::Driver(stranger), CancelReason::Driver),
            Err(DispatchError::NotAuthorized)
        );
    }
}
