//! Driver claim: Searching -> Negotiating.
//!
//! The claim is the mutual-exclusion point between competing drivers: the
//! conditional write on `Searching` lets exactly one through; everyone else
//! gets a definitive "already taken".

use bevy_ecs::prelude::{Entity, World};

use crate::clock::{JobKind, JobScheduler};
use crate::ecs::{Driver, DriverState};
use crate::engine::authority::{authorize, Action, Actor};
use crate::engine::{clock_now, dispatch_config};
use crate::error::DispatchError;
use crate::notify::{NotifyEvent, Outbox};
use crate::session::{SessionId, SessionStatus};
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

pub fn claim_session(
    world: &mut World,
    id: SessionId,
    driver: Entity,
) -> Result<(), DispatchError> {
    authorize(world, Actor::Driver(driver), Action::Claim, None)?;

    {
        let record = world
            .get::<Driver>(driver)
            .ok_or(DispatchError::NotAuthorized)?;
        if !record.is_eligible() {
            return Err(DispatchError::DriverUnavailable);
        }
    }

    let now = clock_now(world);
    let claim = world.resource_mut::<SessionStore>().conditional_update(
        id,
        SessionStatus::Searching,
        |s| {
            if s.rejected_drivers.contains(&driver) {
                return Err(DispatchError::DriverExcluded);
            }
            s.driver = Some(driver);
            s.status = SessionStatus::Negotiating;
            s.negotiation_started_at = Some(now);
            Ok(())
        },
    );
    if let Err(err) = claim {
        if matches!(err, DispatchError::StatusConflict { .. }) {
            world.resource_mut::<DispatchTelemetry>().claims_conflicted += 1;
        }
        return Err(err);
    }

    if let Some(mut record) = world.get_mut::<Driver>(driver) {
        record.hold(id, DriverState::Negotiating);
    }

    // The recovery job is enqueued in the same success path as the claim, so
    // a claimed session can never be left without its negotiation timeout.
    let config = dispatch_config(world);
    world.resource_mut::<JobScheduler>().schedule_in_secs(
        config.negotiation_timeout_secs,
        JobKind::NegotiationTimeout,
        id,
    );

    let rider = world
        .resource::<SessionStore>()
        .expect(id)
        .map(|s| s.rider)?;
    world
        .resource_mut::<Outbox>()
        .notify(rider, NotifyEvent::DriverMatched { session: id });
    world.resource_mut::<DispatchTelemetry>().claims_accepted += 1;
    Ok(())
}
