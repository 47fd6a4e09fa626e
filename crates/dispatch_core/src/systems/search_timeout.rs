//! Search timeout: nobody claimed the session within the search window.

use bevy_ecs::prelude::World;

use crate::clock::{CurrentJob, JobKind};
use crate::engine::{cancel_session, Actor};
use crate::session::{CancelReason, SessionStatus};
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

pub fn search_timeout_system(world: &mut World) {
    let Some(job) = world.get_resource::<CurrentJob>().map(|j| j.0) else {
        return;
    };
    if job.kind != JobKind::SearchTimeout {
        return;
    }

    // A user already resolved the session: silent no-op.
    if world
        .resource::<SessionStore>()
        .find_by_status(job.session, SessionStatus::Searching)
        .is_none()
    {
        world.resource_mut::<DispatchTelemetry>().stale_timeout_jobs += 1;
        return;
    }

    match cancel_session(world, job.session, Actor::System, CancelReason::NoDriverFound) {
        Ok(()) => world.resource_mut::<DispatchTelemetry>().search_timeouts += 1,
        // Lost the race to a concurrent transition; redelivery-safe.
        Err(_) => world.resource_mut::<DispatchTelemetry>().stale_timeout_jobs += 1,
    }
}
