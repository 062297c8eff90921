//! Lifecycle notifications
//!
//! Events are delivered over unbounded channels. Scheduling an event never
//! runs listener code; a subscriber only observes it when it next polls its
//! receiver. Subscribers that join late still see every event already
//! scheduled.

use std::sync::Arc;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Notification emitted by a stream
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// The stream was destroyed with an error
    Error(Arc<anyhow::Error>),
    /// The stream was destroyed; always the last event
    Close,
}

impl StreamEvent {
    pub fn is_close(&self) -> bool {
        matches!(self, StreamEvent::Close)
    }
}

/// Fan-out of scheduled events to every subscriber
#[derive(Debug, Default)]
pub struct EventBus {
    sinks: Vec<UnboundedSender<StreamEvent>>,
    scheduled: Vec<StreamEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, replaying events scheduled so far
    pub fn subscribe(&mut self) -> UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded();
        for event in &self.scheduled {
            // The receiver is alive; it was created just above.
            let _ = tx.unbounded_send(event.clone());
        }
        if !self.is_closed() {
            self.sinks.push(tx);
        }
        rx
    }

    /// Queue an event for every listener
    pub fn schedule(&mut self, event: StreamEvent) {
        let closing = event.is_close();
        self.sinks
            .retain(|sink| sink.unbounded_send(event.clone()).is_ok());
        self.scheduled.push(event);
        if closing {
            // Dropping the senders ends every subscriber's stream after Close.
            self.sinks.clear();
        }
    }

    /// Whether a `Close` event has been scheduled
    pub fn is_closed(&self) -> bool {
        self.scheduled.iter().any(StreamEvent::is_close)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }
}
