//! Errors surfaced by dispatch operations.

use crate::session::{Fare, SessionId, SessionStatus};

/// Coarse classification for callers that route on failure class rather than
/// the exact variant: conflicts are definitive (never auto-retried),
/// validation failures happen before any write, transient failures are safe
/// to retry shortly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    Validation,
    Transient,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    SessionNotFound(SessionId),
    /// The conditional write lost: the session was no longer in the expected
    /// status. "Already taken" / "already resolved".
    StatusConflict {
        expected: SessionStatus,
        actual: SessionStatus,
    },
    /// The session already reached a terminal status; no further writes.
    AlreadyResolved(SessionStatus),
    /// The requester already has a non-terminal session.
    RequesterBusy(SessionId),
    /// The request lock is held; try again shortly.
    LockBusy,
    InvalidCoordinates {
        lat: f64,
        lng: f64,
    },
    UnknownTier(String),
    TripTooShort {
        distance_km: f64,
        minimum_km: f64,
    },
    /// Proposed amount is not one of the session's candidate fares.
    FareNotOffered(Fare),
    /// Acceptance with no fare on the table.
    NoProposedFare,
    /// The driver already rejected (or was rejected for) this session.
    DriverExcluded,
    /// Driver is banned, inactive, or already committed elsewhere.
    DriverUnavailable,
    /// The acting party may not trigger this transition.
    NotAuthorized,
    /// Completion before the driver marked pickup.
    TripNotStarted,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::SessionNotFound(_) => ErrorKind::NotFound,
            DispatchError::StatusConflict { .. }
            | DispatchError::AlreadyResolved(_)
            | DispatchError::RequesterBusy(_)
            | DispatchError::DriverExcluded
            | DispatchError::DriverUnavailable
            | DispatchError::NotAuthorized
            | DispatchError::TripNotStarted => ErrorKind::Conflict,
            DispatchError::LockBusy => ErrorKind::Transient,
            DispatchError::InvalidCoordinates { .. }
            | DispatchError::UnknownTier(_)
            | DispatchError::TripTooShort { .. }
            | DispatchError::FareNotOffered(_)
            | DispatchError::NoProposedFare => ErrorKind::Validation,
        }
    }
}
