#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use dispatch_core::ecs::{Driver, DriverState, DriverStats, Position, Rider};
use dispatch_core::session::SessionId;
use dispatch_core::test_helpers::{test_cell, test_neighbor_cell};
use h3o::CellIndex;

/// Seeded helper cells so every test reuses the same geography.
pub fn seeded_cell() -> CellIndex {
    test_cell()
}

/// A nearby cell from the seeded geography.
pub fn seeded_neighbor_cell() -> CellIndex {
    test_neighbor_cell()
}

/// Builder for driver fixtures.
#[derive(Clone, Debug)]
pub struct DriverBuilder {
    position: CellIndex,
    state: DriverState,
    session: Option<SessionId>,
    banned: bool,
    subscription_active: bool,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self {
            position: test_cell(),
            state: DriverState::Available,
            session: None,
            banned: false,
            subscription_active: true,
        }
    }
}

impl DriverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: CellIndex) -> Self {
        self.position = position;
        self
    }

    pub fn banned(mut self) -> Self {
        self.banned = true;
        self
    }

    pub fn without_subscription(mut self) -> Self {
        self.subscription_active = false;
        self
    }

    pub fn in_state(mut self, state: DriverState, session: Option<SessionId>) -> Self {
        self.state = state;
        self.session = session;
        self
    }

    pub fn spawn(self, world: &mut World) -> Entity {
        world
            .spawn((
                Driver {
                    state: self.state,
                    session: self.session,
                    banned: self.banned,
                    subscription_active: self.subscription_active,
                },
                DriverStats::default(),
                Position(self.position),
            ))
            .id()
    }
}

/// Builder for rider fixtures.
#[derive(Clone, Debug)]
pub struct RiderBuilder {
    contact: String,
}

impl Default for RiderBuilder {
    fn default() -> Self {
        Self {
            contact: "+374 55 123456".into(),
        }
    }
}

impl RiderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn spawn(self, world: &mut World) -> Entity {
        world
            .spawn(Rider {
                contact: self.contact,
            })
            .id()
    }
}
