//! Stuck-negotiation timeout: a claim that neither party resolved is treated
//! exactly like a requester rejection, through the same shared path.

use bevy_ecs::prelude::World;

use crate::clock::{CurrentJob, JobKind};
use crate::engine::return_to_search;
use crate::session::SessionStatus;
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

pub fn negotiation_timeout_system(world: &mut World) {
    let Some(job) = world.get_resource::<CurrentJob>().map(|j| j.0) else {
        return;
    };
    if job.kind != JobKind::NegotiationTimeout {
        return;
    }

    if world
        .resource::<SessionStore>()
        .find_by_status(job.session, SessionStatus::Negotiating)
        .is_none()
    {
        world.resource_mut::<DispatchTelemetry>().stale_timeout_jobs += 1;
        return;
    }

    match return_to_search(world, job.session) {
        Ok(()) => {
            world
                .resource_mut::<DispatchTelemetry>()
                .negotiation_timeouts += 1
        }
        Err(_) => world.resource_mut::<DispatchTelemetry>().stale_timeout_jobs += 1,
    }
}
