//! Outbound notifications: the engine decides what to send and to whom; a
//! transport drains the outbox and delivers. Fire-and-forget: delivery can
//! never fail or block a dispatch operation.

use bevy_ecs::prelude::{Entity, Resource};
use serde::Serialize;

use crate::session::{CancelReason, Fare, SessionId};

/// Payloads carry ids and amounts only; the transport resolves targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NotifyEvent {
    /// Offered to a candidate driver during a search pass.
    RideAvailable { session: SessionId },
    /// A driver claimed the requester's session.
    DriverMatched { session: SessionId },
    FareProposed { session: SessionId, amount: Fare },
    FareRejected { session: SessionId },
    RideAccepted {
        session: SessionId,
        amount: Fare,
        rider_contact: String,
    },
    TripStarted { session: SessionId },
    TripCompleted { session: SessionId, amount: Fare },
    SessionCancelled {
        session: SessionId,
        reason: CancelReason,
    },
    /// Sent to previously offered drivers once the session is gone.
    SessionOffTheTable { session: SessionId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub target: Entity,
    pub event: NotifyEvent,
}

/// Ordered queue of pending notifications.
#[derive(Debug, Default, Resource)]
pub struct Outbox {
    pending: Vec<Notification>,
}

impl Outbox {
    pub fn notify(&mut self, target: Entity, event: NotifyEvent) {
        self.pending.push(Notification { target, event });
    }

    /// Hands the queued notifications to the transport.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn pending_for(&self, target: Entity) -> Vec<&Notification> {
        self.pending.iter().filter(|n| n.target == target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;

    #[test]
    fn outbox_preserves_emission_order() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        let mut outbox = Outbox::default();
        outbox.notify(a, NotifyEvent::RideAvailable { session: SessionId(1) });
        outbox.notify(b, NotifyEvent::RideAvailable { session: SessionId(1) });
        outbox.notify(a, NotifyEvent::DriverMatched { session: SessionId(1) });

        let drained = outbox.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].target, a);
        assert_eq!(drained[1].target, b);
        assert_eq!(
            drained[2].event,
            NotifyEvent::DriverMatched { session: SessionId(1) }
        );
        assert!(outbox.pending().is_empty());
    }
}
