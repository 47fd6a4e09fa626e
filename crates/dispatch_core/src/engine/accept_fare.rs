//! Requester acceptance: Negotiating -> Active.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{self, DriverState};
use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::clock_now;
use crate::error::DispatchError;
use crate::notify::{NotifyEvent, Outbox};
use crate::session::{Fare, SessionId, SessionStatus};
use crate::store::SessionStore;

/// Fixes the final fare from the standing proposal (never recomputed), moves
/// the session to Active, and hands the driver the rider's contact details.
pub fn accept_fare(world: &mut World, id: SessionId, rider: Entity) -> Result<Fare, DispatchError> {
    let snapshot = world.resource::<SessionStore>().expect(id)?.clone();
    authorize(world, Actor::Rider(rider), Action::AcceptFare, Some(&snapshot))?;

    let now = clock_now(world);
    let mut fare: Fare = 0;
    world.resource_mut::<SessionStore>().conditional_update(
        id,
        SessionStatus::Negotiating,
        |s| {
            let proposed = s.proposed_fare.ok_or(DispatchError::NoProposedFare)?;
            debug_assert!(s.accepted_at.is_none(), "accepted_at is set exactly once");
            s.final_fare = Some(proposed);
            s.status = SessionStatus::Active;
            s.accepted_at = Some(now);
            fare = proposed;
            Ok(())
        },
    )?;

    // Session and driver change together: the CAS above decided the outcome,
    // and this process owns both records for the rest of the step.
    let driver = snapshot.driver.ok_or(DispatchError::DriverUnavailable)?;
    if let Some(mut record) = world.get_mut::<ecs::Driver>(driver) {
        record.hold(id, DriverState::OnTrip);
    }

    let rider_contact = world
        .get::<ecs::Rider>(rider)
        .map(|r| r.contact.clone())
        .unwrap_or_default();
    world.resource_mut::<Outbox>().notify(
        driver,
        NotifyEvent::RideAccepted {
            session: id,
            amount: fare,
            rider_contact,
        },
    );
    Ok(fare)
}
