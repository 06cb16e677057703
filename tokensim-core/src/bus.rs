//! # Change Bus
//!
//! The one place cross-context concurrency appears. Every execution context
//! ("tab") of the same origin shares a clone of this bus; a write committed in
//! one context is announced to subscribed listeners in every other context.
//!
//! The payload is deliberately small (which table changed, and how) so a
//! multi-process rewrite can swap this for a real pub/sub bus without
//! touching callers.

use crate::repository::Table;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Updated,
    Removed,
}

/// What changed in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

/// A wrapper around a tokio broadcast channel.
///
/// Wrapped in a struct to enforce the typed payload and to keep the swap
/// surface small if the transport ever changes.
#[derive(Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        // Capacity of 100 events. A slow receiver skips old events (lagging),
        // which is acceptable: listeners re-read current state on wake.
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        // No active subscribers is not an error (e.g. during startup).
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber. Only events published after this call are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
