//! The ride session: one ride's lifecycle record, from request to terminal
//! outcome. The persisted session is the single source of truth shared by the
//! engine and the timeout supervisor; everything else hangs off it.

use std::collections::HashSet;
use std::str::FromStr;

use bevy_ecs::prelude::Entity;
use h3o::{CellIndex, LatLng};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::spatial::DISPATCH_RESOLUTION;

/// Fare amounts are whole currency units so candidate membership is an exact
/// comparison, never a float tolerance.
pub type Fare = u32;

/// Opaque session identifier, stable for the session's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Searching,
    Negotiating,
    Active,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceTier {
    Standard,
    Comfort,
    Premium,
}

impl FromStr for ServiceTier {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ServiceTier::Standard),
            "comfort" => Ok(ServiceTier::Comfort),
            "premium" => Ok(ServiceTier::Premium),
            _ => Err(DispatchError::UnknownTier(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    Requester,
    Driver,
    /// System-generated: nobody claimed the session within the search window.
    NoDriverFound,
}

/// A labelled pickup or dropoff point, snapped to the dispatch resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub label: String,
    pub cell: CellIndex,
}

impl Place {
    /// Validates the coordinate pair and snaps it to a resolution-9 cell.
    pub fn new(label: impl Into<String>, lat: f64, lng: f64) -> Result<Self, DispatchError> {
        let coords = LatLng::new(lat, lng)
            .map_err(|_| DispatchError::InvalidCoordinates { lat, lng })?;
        Ok(Self {
            label: label.into(),
            cell: coords.to_cell(DISPATCH_RESOLUTION),
        })
    }
}

/// The central entity: one ride request and everything negotiated on it.
///
/// Status-changing writes go through [`crate::store::SessionStore`]'s
/// conditional update; nothing mutates a session outside that path.
#[derive(Debug, Clone)]
pub struct RideSession {
    pub id: SessionId,
    pub rider: Entity,
    /// Assigned driver. Non-`None` exactly while Negotiating or Active.
    pub driver: Option<Entity>,
    pub origin: Place,
    pub destination: Place,
    pub tier: ServiceTier,
    pub distance_km: f64,
    /// Candidate fares generated at creation, ascending. A proposal must be
    /// drawn from this list.
    pub fare_candidates: Vec<Fare>,
    /// The single fare on the table while Negotiating.
    pub proposed_fare: Option<Fare>,
    /// Fixed from the proposal at acceptance, never recomputed.
    pub final_fare: Option<Fare>,
    pub status: SessionStatus,
    /// Drivers who rejected or were rejected; never re-offered this session.
    pub rejected_drivers: HashSet<Entity>,
    /// Drivers who were offered this session, so a search timeout can tell
    /// them it is off the table.
    pub notified_drivers: HashSet<Entity>,
    pub cancel_reason: Option<CancelReason>,
    /// Who completed the trip. Kept after `driver` is cleared at completion
    /// so a retried `complete_trip` from the same driver stays idempotent.
    pub completed_by: Option<Entity>,
    pub created_at: u64,
    pub negotiation_started_at: Option<u64>,
    pub accepted_at: Option<u64>,
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
}

impl RideSession {
    /// Whether `driver` is the currently assigned driver.
    pub fn is_assigned_driver(&self, driver: Entity) -> bool {
        self.driver == Some(driver)
    }

    /// True while the driver has marked pickup but not dropoff.
    pub fn trip_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Driver is set exactly while the session is Negotiating or Active.
    pub fn assignment_invariant_holds(&self) -> bool {
        let should_have_driver = matches!(
            self.status,
            SessionStatus::Negotiating | SessionStatus::Active
        );
        self.driver.is_some() == should_have_driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parses_case_insensitively() {
        assert_eq!("STANDARD".parse::<ServiceTier>(), Ok(ServiceTier::Standard));
        assert_eq!("comfort".parse::<ServiceTier>(), Ok(ServiceTier::Comfort));
        assert_eq!("Premium".parse::<ServiceTier>(), Ok(ServiceTier::Premium));
    }

    #[test]
    fn unknown_tier_is_rejected() {
        match "luxe".parse::<ServiceTier>() {
            Err(DispatchError::UnknownTier(s)) => assert_eq!(s, "luxe"),
            other => panic!("expected UnknownTier, got {other:?}"),
        }
    }

    #[test]
    fn place_rejects_out_of_range_coordinates() {
        assert!(Place::new("north pole-ish", 91.0, 0.0).is_err());
        assert!(Place::new("far east", 0.0, 181.0).is_err());
        assert!(Place::new("downtown", 40.19, 44.51).is_ok());
    }

    #[test]
    fn terminal_statuses() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Searching.is_terminal());
        assert!(!SessionStatus::Negotiating.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }
}
