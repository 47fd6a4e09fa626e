//! Shared test setup: a ready-made dispatch world, a fixed test geography,
//! and fixtures that walk a session into each lifecycle status.

use bevy_ecs::prelude::{Entity, World};
use h3o::{CellIndex, LatLng};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::JobScheduler;
use crate::config::DispatchConfig;
use crate::ecs::{Driver, DriverStats, Position, Rider};
use crate::engine::{self, PlaceSpec, RideRequest};
use crate::locks::RequestLocks;
use crate::notify::Outbox;
use crate::pricing::TariffConfig;
use crate::routing::{GridRouteEstimator, RouteEstimatorResource};
use crate::session::{ServiceTier, SessionId};
use crate::store::SessionStore;
use crate::telemetry::DispatchTelemetry;

/// A valid H3 cell at resolution 9, reused across tests for consistency.
pub const TEST_CELL: u64 = 0x8a1fb46622dffff;

pub fn test_cell() -> CellIndex {
    CellIndex::try_from(TEST_CELL).expect("TEST_CELL should be a valid H3 cell")
}

pub fn test_neighbor_cell() -> CellIndex {
    test_cell()
        .grid_disk::<Vec<_>>(1)
        .into_iter()
        .find(|c| *c != test_cell())
        .expect("test cell should have neighbors")
}

pub fn test_distant_cell() -> CellIndex {
    test_cell()
        .grid_disk::<Vec<_>>(2)
        .into_iter()
        .rev()
        .find(|c| *c != test_cell() && *c != test_neighbor_cell())
        .expect("test cell should have distant neighbors")
}

/// A cell several kilometres from [`test_cell`], far enough that a trip
/// between them clears the minimum-distance threshold.
pub fn test_faraway_cell() -> CellIndex {
    *test_cell()
        .grid_disk::<Vec<_>>(20)
        .last()
        .expect("test cell should have a wide disk")
}

/// A world with every dispatch resource installed.
pub fn create_dispatch_world() -> World {
    let mut world = World::new();
    world.insert_resource(JobScheduler::default());
    world.insert_resource(SessionStore::default());
    world.insert_resource(RequestLocks::default());
    world.insert_resource(Outbox::default());
    world.insert_resource(DispatchTelemetry::default());
    world.insert_resource(DispatchConfig::default());
    world.insert_resource(TariffConfig::default());
    world.insert_resource(RouteEstimatorResource(Box::new(GridRouteEstimator)));
    world
}

pub fn spawn_rider(world: &mut World) -> Entity {
    world
        .spawn(Rider {
            contact: "+374 55 123456".into(),
        })
        .id()
}

pub fn spawn_driver(world: &mut World, cell: CellIndex) -> Entity {
    world
        .spawn((Driver::available(), DriverStats::default(), Position(cell)))
        .id()
}

/// Spawns `count` available drivers scattered around the test geography.
pub fn scatter_drivers(world: &mut World, count: usize, seed: u64) -> Vec<Entity> {
    let disk = test_cell().grid_disk::<Vec<_>>(8);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let cell = disk[rng.gen_range(0..disk.len())];
            spawn_driver(world, cell)
        })
        .collect()
}

fn place_spec(label: &str, cell: CellIndex) -> PlaceSpec {
    let coords: LatLng = cell.into();
    PlaceSpec::new(label, coords.lat(), coords.lng())
}

/// A standard-tier request spanning a few kilometres of the test geography.
pub fn standard_request() -> RideRequest {
    RideRequest {
        origin: place_spec("pickup", test_cell()),
        destination: place_spec("dropoff", test_faraway_cell()),
        tier: ServiceTier::Standard,
    }
}

/// Rider with a freshly created Searching session.
pub fn requested_session(world: &mut World) -> (Entity, SessionId) {
    let rider = spawn_rider(world);
    let id = engine::request_ride(world, rider, standard_request()).expect("request_ride");
    (rider, id)
}

/// Session claimed by a nearby driver: Negotiating, no proposal yet.
pub fn claimed_session(world: &mut World) -> (Entity, Entity, SessionId) {
    let (rider, id) = requested_session(world);
    let driver = spawn_driver(world, test_cell());
    engine::claim_session(world, id, driver).expect("claim_session");
    (rider, driver, id)
}

/// Negotiating session with the middle candidate fare on the table.
pub fn negotiated_session(world: &mut World) -> (Entity, Entity, SessionId, crate::session::Fare) {
    let (rider, driver, id) = claimed_session(world);
    let amount = world
        .resource::<SessionStore>()
        .get(id)
        .expect("session")
        .fare_candidates[1];
    engine::propose_fare(world, id, driver, amount).expect("propose_fare");
    (rider, driver, id, amount)
}

/// Active session, fare accepted, pickup not yet marked.
pub fn accepted_session(world: &mut World) -> (Entity, Entity, SessionId) {
    let (rider, driver, id, _amount) = negotiated_session(world);
    engine::accept_fare(world, id, rider).expect("accept_fare");
    (rider, driver, id)
}

/// Active session with the trip underway.
pub fn started_session(world: &mut World) -> (Entity, Entity, SessionId, crate::session::Fare) {
    let (rider, driver, id) = accepted_session(world);
    engine::start_trip(world, id, driver).expect("start_trip");
    let fare = world
        .resource::<SessionStore>()
        .get(id)
        .expect("session")
        .final_fare
        .expect("final fare");
    (rider, driver, id, fare)
}
