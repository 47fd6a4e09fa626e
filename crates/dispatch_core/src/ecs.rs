//! Party components: drivers and riders live as ECS entities.
//!
//! Driver availability is authoritative here but only the engine flips it,
//! and only as a side effect of a session transition. Every mutation path
//! (claim, reject-release, cancel-release, complete-release) goes through
//! [`Driver::hold`] / [`Driver::release`].

use bevy_ecs::prelude::Component;
use h3o::CellIndex;

use crate::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Available,
    Negotiating,
    OnTrip,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Driver {
    pub state: DriverState,
    /// The session this driver is committed to while Negotiating/OnTrip.
    pub session: Option<SessionId>,
    pub banned: bool,
    pub subscription_active: bool,
}

impl Driver {
    pub fn available() -> Self {
        Self {
            state: DriverState::Available,
            session: None,
            banned: false,
            subscription_active: true,
        }
    }

    /// Matching eligibility: available, in good standing, subscribed.
    pub fn is_eligible(&self) -> bool {
        self.state == DriverState::Available && !self.banned && self.subscription_active
    }

    /// Commit the driver to a session (claimed -> unavailable).
    pub fn hold(&mut self, session: SessionId, state: DriverState) {
        debug_assert!(matches!(
            state,
            DriverState::Negotiating | DriverState::OnTrip
        ));
        self.state = state;
        self.session = Some(session);
    }

    /// Release the driver back to the pool (rejected / cancelled / completed).
    pub fn release(&mut self) {
        self.state = DriverState::Available;
        self.session = None;
    }
}

/// Lifetime stats, bumped exactly once per completed trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Component)]
pub struct DriverStats {
    pub trips_completed: u32,
    pub total_earnings: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub CellIndex);

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Rider {
    /// Shared with the driver once a fare is accepted.
    pub contact: String,
}
