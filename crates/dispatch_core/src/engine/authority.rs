//! Capability checks at the engine boundary.
//!
//! Which party may trigger which transition is decided here, once, against
//! the lifecycle table, not scattered through the operation bodies. Role is
//! proven by component presence; party match by the session's assignment.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs;
use crate::error::DispatchError;
use crate::session::RideSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Rider(Entity),
    Driver(Entity),
    /// Timeout jobs and other engine-internal recovery.
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RequestRide,
    Claim,
    ProposeFare,
    AcceptFare,
    RejectFare,
    StartTrip,
    CompleteTrip,
    Cancel,
}

fn has_rider_role(world: &World, entity: Entity) -> bool {
    world.get::<ecs::Rider>(entity).is_some()
}

fn has_driver_role(world: &World, entity: Entity) -> bool {
    world.get::<ecs::Driver>(entity).is_some()
}

/// Role and party checks for every lifecycle transition, as a single table.
pub fn authorize(
    world: &World,
    actor: Actor,
    action: Action,
    session: Option<&RideSession>,
) -> Result<(), DispatchError> {
    match (action, actor) {
        (Action::RequestRide, Actor::Rider(rider)) if has_rider_role(world, rider) => Ok(()),

        // Claiming needs the driver role; identity against the session is
        // settled by the conditional write and the exclusion set.
        (Action::Claim, Actor::Driver(driver)) if has_driver_role(world, driver) => Ok(()),

        (
            Action::ProposeFare | Action::StartTrip | Action::CompleteTrip,
            Actor::Driver(driver),
        ) if has_driver_role(world, driver)
            && session.is_some_and(|s| s.is_assigned_driver(driver)) =>
        {
            Ok(())
        }

        (Action::AcceptFare | Action::RejectFare, Actor::Rider(rider))
            if has_rider_role(world, rider) && session.is_some_and(|s| s.rider == rider) =>
        {
            Ok(())
        }

        (Action::Cancel, Actor::System) => Ok(()),
        (Action::Cancel, Actor::Rider(rider))
            if has_rider_role(world, rider) && session.is_some_and(|s| s.rider == rider) =>
        {
            Ok(())
        }
        (Action::Cancel, Actor::Driver(driver))
            if has_driver_role(world, driver)
                && session.is_some_and(|s| s.is_assigned_driver(driver)) =>
        {
            Ok(())
        }

        _ => Err(DispatchError::NotAuthorized),
    }
}
