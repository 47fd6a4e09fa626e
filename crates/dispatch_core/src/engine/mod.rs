//! The dispatch engine: one file per lifecycle operation.
//!
//! Every operation takes `&mut World`, scopes its resource borrows, and
//! routes each status change through the session store's conditional update.
//! The timeout supervisor reuses the same paths (cancellation, the
//! return-to-search rejection helper), so a job and a live user action racing
//! on one session resolve to exactly one effect.

pub mod accept_fare;
pub mod authority;
pub mod cancel_session;
pub mod claim_session;
pub mod complete_trip;
pub mod propose_fare;
pub mod reject_fare;
pub mod request_ride;
pub mod start_trip;

pub use accept_fare::accept_fare;
pub use authority::{Action, Actor};
pub use cancel_session::cancel_session;
pub use claim_session::claim_session;
pub use complete_trip::complete_trip;
pub use propose_fare::propose_fare;
pub use reject_fare::reject_fare;
pub use request_ride::{request_ride, PlaceSpec, RideRequest};
pub use start_trip::start_trip;

use bevy_ecs::prelude::{Entity, World};

use crate::clock::JobScheduler;
use crate::config::DispatchConfig;
use crate::ecs::Driver;
use crate::error::DispatchError;
use crate::locator::find_available_drivers;
use crate::notify::{NotifyEvent, Outbox};
use crate::pricing::TariffConfig;
use crate::session::{SessionId, SessionStatus};
use crate::store::SessionStore;

pub(crate) fn dispatch_config(world: &World) -> DispatchConfig {
    world
        .get_resource::<DispatchConfig>()
        .copied()
        .unwrap_or_default()
}

pub(crate) fn tariff_config(world: &World) -> TariffConfig {
    world
        .get_resource::<TariffConfig>()
        .copied()
        .unwrap_or_default()
}

pub(crate) fn clock_now(world: &World) -> u64 {
    world.resource::<JobScheduler>().now()
}

/// The one release path: rejected, cancelled, and completed all end here.
pub(crate) fn release_driver(world: &mut World, driver: Entity) {
    if let Some(mut record) = world.get_mut::<Driver>(driver) {
        record.release();
    }
}

/// Offers a Searching session to fresh candidates around its origin, against
/// the live driver snapshot and outside the rejection set. Returns how many
/// drivers were notified.
pub(crate) fn broadcast_to_candidates(world: &mut World, id: SessionId) -> usize {
    let Some((origin, exclude)) = world
        .resource::<SessionStore>()
        .get(id)
        .map(|s| (s.origin.cell, s.rejected_drivers.clone()))
    else {
        return 0;
    };
    let radius_m = dispatch_config(world).search_radius_m;
    let candidates = find_available_drivers(world, origin, radius_m, &exclude);
    if candidates.is_empty() {
        return 0;
    }

    let recorded = world.resource_mut::<SessionStore>().conditional_update(
        id,
        SessionStatus::Searching,
        |s| {
            s.notified_drivers
                .extend(candidates.iter().map(|(driver, _)| *driver));
            Ok(())
        },
    );
    if recorded.is_err() {
        // The session moved on while we were matching; nothing to offer.
        return 0;
    }

    let mut outbox = world.resource_mut::<Outbox>();
    for (driver, _) in &candidates {
        outbox.notify(*driver, NotifyEvent::RideAvailable { session: id });
    }
    candidates.len()
}

/// Shared rejection path: requester rejection and the stuck-negotiation
/// timeout both run this. Releases the driver into the exclusion set, puts
/// the session back to Searching, and re-matches immediately.
pub(crate) fn return_to_search(world: &mut World, id: SessionId) -> Result<(), DispatchError> {
    let mut released: Option<Entity> = None;
    world.resource_mut::<SessionStore>().conditional_update(
        id,
        SessionStatus::Negotiating,
        |s| {
            let driver = s.driver.take().ok_or(DispatchError::DriverUnavailable)?;
            s.rejected_drivers.insert(driver);
            s.proposed_fare = None;
            s.status = SessionStatus::Searching;
            released = Some(driver);
            Ok(())
        },
    )?;

    if let Some(driver) = released {
        release_driver(world, driver);
        world
            .resource_mut::<Outbox>()
            .notify(driver, NotifyEvent::FareRejected { session: id });
    }
    broadcast_to_candidates(world, id);
    Ok(())
}
