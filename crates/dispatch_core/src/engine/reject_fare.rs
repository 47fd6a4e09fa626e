//! Requester rejection: Negotiating -> Searching.
//!
//! The stuck-negotiation timeout runs the exact same
//! [`crate::engine::return_to_search`] path; this operation only adds the
//! requester's capability check on top.

use bevy_ecs::prelude::{Entity, World};

use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::return_to_search;
use crate::error::DispatchError;
use crate::session::SessionId;
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

pub fn reject_fare(world: &mut World, id: SessionId, rider: Entity) -> Result<(), DispatchError> {
    let snapshot = world.resource::<SessionStore>().expect(id)?.clone();
    authorize(world, Actor::Rider(rider), Action::RejectFare, Some(&snapshot))?;

    return_to_search(world, id)?;
    world.resource_mut::<DispatchTelemetry>().fares_rejected += 1;
    Ok(())
}
