//! Session persistence: conditional transitions over the session records.
//!
//! Every status change in the engine and the timeout supervisor routes
//! through [`SessionStore::conditional_update`], a compare-and-swap on the
//! session's status. Two actors racing on the same session cannot both
//! succeed; the loser gets a definitive [`DispatchError::StatusConflict`].

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::error::DispatchError;
use crate::session::{RideSession, SessionId, SessionStatus};

#[derive(Debug, Default, Resource)]
pub struct SessionStore {
    sessions: HashMap<SessionId, RideSession>,
    next_id: u64,
}

impl SessionStore {
    /// Persists a new session and hands out its id.
    pub fn create<F>(&mut self, build: F) -> SessionId
    where
        F: FnOnce(SessionId) -> RideSession,
    {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        let session = build(id);
        debug_assert_eq!(session.id, id);
        debug_assert_eq!(session.status, SessionStatus::Searching);
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&RideSession> {
        self.sessions.get(&id)
    }

    pub fn expect(&self, id: SessionId) -> Result<&RideSession, DispatchError> {
        self.get(id).ok_or(DispatchError::SessionNotFound(id))
    }

    /// Fetch only when the session is still in the exact expected status.
    /// Timeout jobs use this to turn stale work into a silent no-op.
    pub fn find_by_status(
        &self,
        id: SessionId,
        expected: SessionStatus,
    ) -> Option<&RideSession> {
        self.sessions.get(&id).filter(|s| s.status == expected)
    }

    /// The requester's non-terminal session, if any. One open session per
    /// requester is an engine precondition.
    pub fn open_session_for(&self, rider: Entity) -> Option<SessionId> {
        self.sessions
            .values()
            .find(|s| s.rider == rider && !s.status.is_terminal())
            .map(|s| s.id)
    }

    /// Atomic conditional transition: applies `apply` only when the stored
    /// status equals `expected`, and commits all-or-nothing. An `Err` from
    /// `apply` rolls the whole write back; no partial state is ever
    /// observable by a subsequent read.
    pub fn conditional_update<F>(
        &mut self,
        id: SessionId,
        expected: SessionStatus,
        apply: F,
    ) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut RideSession) -> Result<(), DispatchError>,
    {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(DispatchError::SessionNotFound(id))?;
        if session.status != expected {
            return Err(DispatchError::StatusConflict {
                expected,
                actual: session.status,
            });
        }
        let mut draft = session.clone();
        apply(&mut draft)?;
        debug_assert!(
            draft.assignment_invariant_holds(),
            "transition broke the driver/status invariant: {draft:?}"
        );
        *session = draft;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RideSession> {
        self.sessions.values()
    }
}
