//! Per-requester request lock: duplicate concurrent "start ride" submissions
//! (double-taps, retry storms) must not create two sessions.
//!
//! Set-if-absent with a short TTL. Acquisition failure fails fast with
//! [`crate::error::DispatchError::LockBusy`] rather than queueing; release is
//! unconditional on every exit path of the locked operation.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Debug, Default, Resource)]
pub struct RequestLocks {
    held: HashMap<Entity, u64>,
}

impl RequestLocks {
    /// Set-if-absent: succeeds when no live lock exists for `key`. An expired
    /// entry counts as absent.
    pub fn try_acquire(&mut self, key: Entity, now_ms: u64, ttl_ms: u64) -> bool {
        match self.held.get(&key) {
            Some(&expires_at) if expires_at > now_ms => false,
            _ => {
                self.held.insert(key, now_ms + ttl_ms);
                true
            }
        }
    }

    pub fn release(&mut self, key: Entity) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Entity, now_ms: u64) -> bool {
        self.held
            .get(&key)
            .is_some_and(|&expires_at| expires_at > now_ms)
    }
}
