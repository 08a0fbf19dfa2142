// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, non-blocking coordination event stream.
//!
//! Producers (coordinator, watcher, pipeline executor) must never stall on
//! a slow consumer, so `emit` uses `try_send` and drops on a full channel.

use muster_core::CoordEvent;
use tokio::sync::mpsc;

/// Default channel capacity for the coordination stream.
pub const DEFAULT_CAPACITY: usize = 256;

/// Sending half of the coordination event stream.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<CoordEvent>,
}

impl EventSender {
    /// Create a bounded stream, returning both halves.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<CoordEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Emit without blocking; a full channel drops the event.
    pub fn emit(&self, event: CoordEvent) {
        if let Err(mpsc::error::TrySendError::Full(dropped)) = self.tx.try_send(event) {
            tracing::debug!(?dropped, "coordination channel full, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::CoordEvent;

    fn renewed(count: usize) -> CoordEvent {
        CoordEvent::ReservationRenewed {
            agent: "GreenCastle".to_string(),
            count,
        }
    }

    #[tokio::test]
    async fn emits_are_received_in_order() {
        let (sender, mut rx) = EventSender::channel(4);
        sender.emit(renewed(1));
        sender.emit(renewed(2));
        assert_eq!(rx.recv().await, Some(renewed(1)));
        assert_eq!(rx.recv().await, Some(renewed(2)));
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let (sender, mut rx) = EventSender::channel(1);
        sender.emit(renewed(1));
        sender.emit(renewed(2)); // dropped
        assert_eq!(rx.recv().await, Some(renewed(1)));
        assert!(rx.try_recv().is_err());
    }
}
