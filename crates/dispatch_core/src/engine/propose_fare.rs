//! Driver price proposal: Negotiating -> Negotiating.

use bevy_ecs::prelude::{Entity, World};

use crate::engine::authority::{authorize, Action, Actor};
use crate::error::DispatchError;
use crate::notify::{NotifyEvent, Outbox};
use crate::session::{Fare, SessionId, SessionStatus};
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

/// Puts `amount` on the table. The amount must be one of the candidate fares
/// generated when the session was created; anything else is rejected before
/// any write.
pub fn propose_fare(
    world: &mut World,
    id: SessionId,
    driver: Entity,
    amount: Fare,
) -> Result<(), DispatchError> {
    let snapshot = world.resource::<SessionStore>().expect(id)?.clone();
    authorize(world, Actor::Driver(driver), Action::ProposeFare, Some(&snapshot))?;

    world.resource_mut::<SessionStore>().conditional_update(
        id,
        SessionStatus::Negotiating,
        |s| {
            if !s.fare_candidates.contains(&amount) {
                return Err(DispatchError::FareNotOffered(amount));
            }
            s.proposed_fare = Some(amount);
            Ok(())
        },
    )?;

    world
        .resource_mut::<Outbox>()
        .notify(snapshot.rider, NotifyEvent::FareProposed { session: id, amount });
    world.resource_mut::<DispatchTelemetry>().fares_proposed += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_helpers::{claimed_session, create_dispatch_world};

    #[test]
    fn proposal_from_the_candidate_list_sticks() {
        let mut world = create_dispatch_world();
        let (rider, driver, id) = claimed_session(&mut world);
        let amount = world
            .resource::<SessionStore>()
            .get(id)
            .expect("session")
            .fare_candidates[1];

        propose_fare(&mut world, id, driver, amount).expect("proposal");

        let session = world.resource::<SessionStore>().get(id).expect("session");
        assert_eq!(session.proposed_fare, Some(amount));
        assert_eq!(session.status, SessionStatus::Negotiating);
        assert_eq!(
            world.resource::<Outbox>().pending_for(rider).last().map(|n| &n.event),
            Some(&NotifyEvent::FareProposed { session: id, amount })
        );
    }

    #[test]
    fn amounts_off_the_candidate_list_are_rejected() {
        let mut world = create_dispatch_world();
        let (_rider, driver, id) = claimed_session(&mut world);

        let err = propose_fare(&mut world, id, driver, 1).expect_err("not offered");
        assert_eq!(err, DispatchError::FareNotOffered(1));
        assert_eq!(
            world.resource::<SessionStore>().get(id).expect("session").proposed_fare,
            None
        );
    }

    #[test]
    fn a_new_proposal_replaces_the_previous_one() {
        let mut world = create_dispatch_world();
        let (_rider, driver, id) = claimed_session(&mut world);
        let candidates = world
            .resource::<SessionStore>()
            .get(id)
            .expect("session")
            .fare_candidates
            .clone();

        propose_fare(&mut world, id, driver, candidates[2]).expect("first");
        propose_fare(&mut world, id, driver, candidates[0]).expect("haggled down");

        assert_eq!(
            world.resource::<SessionStore>().get(id).expect("session").proposed_fare,
            Some(candidates[0])
        );
    }

    #[test]
    fn unassigned_drivers_cannot_propose() {
        let mut world = create_dispatch_world();
        let (_rider, _driver, id) = claimed_session(&mut world);
        let stranger =
            crate::test_helpers::spawn_driver(&mut world, crate::test_helpers::test_cell());

        assert_eq!(
            propose_fare(&mut world, id, stranger, 4_500),
            Err(DispatchError::NotAuthorized)
        );
    }
}
