//! Lifecycle notifications as an async stream.
//!
//! A flow construct can be built with a notification channel attached: every
//! completed or failed phase transition is published to the channel, and
//! consumers observe the construct's life as an async stream. Publishing
//! never blocks the synchronous lifecycle path: sends are best-effort and
//! notifications are dropped when the buffer is full.

use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::lifecycle::LifecyclePhase;

/// A lifecycle event published by a flow construct.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A phase transition ran to completion; `phase` is the state entered.
    PhaseCompleted {
        /// Name of the flow construct
        flow: String,
        /// The phase the construct settled in
        phase: LifecyclePhase,
    },
    /// A phase body failed and the transition was rolled back.
    PhaseFailed {
        /// Name of the flow construct
        flow: String,
        /// The phase that was being fired
        phase: &'static str,
        /// Rendered failure
        reason: String,
    },
}

/// Type alias for the stream of lifecycle notifications.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

/// Publishes lifecycle notifications into a bounded channel.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::Sender<Notification>,
}

impl NotificationSender {
    /// Wrap an mpsc sender.
    pub fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self { tx }
    }

    /// Publish a notification without blocking.
    ///
    /// The notification is dropped if the buffer is full or every stream
    /// consumer is gone; lifecycle progress never waits on observers.
    pub fn publish(&self, notification: Notification) {
        let _ = self.tx.try_send(notification);
    }

    /// Check if every consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a notification channel with the given buffer capacity.
///
/// Returns the sender to hand to a flow builder and the stream to consume.
///
/// # Example
///
/// ```rust
/// use flowcore::notify::{notification_channel, Notification};
/// use flowcore::LifecyclePhase;
///
/// # async fn example() {
/// use futures::StreamExt;
///
/// let (sender, mut stream) = notification_channel(16);
/// sender.publish(Notification::PhaseCompleted {
///     flow: "orders".to_string(),
///     phase: LifecyclePhase::Started,
/// });
/// drop(sender);
///
/// assert!(stream.next().await.is_some());
/// # }
/// ```
pub fn notification_channel(buffer: usize) -> (NotificationSender, NotificationStream) {
    let (tx, rx) = mpsc::channel(buffer);
    let stream: NotificationStream = Box::pin(ReceiverStream::new(rx));
    (NotificationSender::new(tx), stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_publish_and_consume() {
        let (sender, stream) = notification_channel(8);

        sender.publish(Notification::PhaseCompleted {
            flow: "f".to_string(),
            phase: LifecyclePhase::Initialised,
        });
        sender.publish(Notification::PhaseFailed {
            flow: "f".to_string(),
            phase: "start",
            reason: "boom".to_string(),
        });
        drop(sender);

        let notifications: Vec<_> = stream.collect().await;
        assert_eq!(notifications.len(), 2);
        assert_eq!(
            notifications[0],
            Notification::PhaseCompleted {
                flow: "f".to_string(),
                phase: LifecyclePhase::Initialised,
            }
        );
    }

    #[tokio::test]
    async fn test_publish_drops_when_full() {
        let (sender, stream) = notification_channel(1);

        for _ in 0..5 {
            sender.publish(Notification::PhaseCompleted {
                flow: "f".to_string(),
                phase: LifecyclePhase::Started,
            });
        }
        drop(sender);

        let notifications: Vec<_> = stream.collect().await;
        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_when_stream_dropped() {
        let (sender, stream) = notification_channel(1);
        drop(stream);
        // Publishing into a closed channel is silently discarded.
        sender.publish(Notification::PhaseCompleted {
            flow: "f".to_string(),
            phase: LifecyclePhase::Stopped,
        });
        assert!(sender.is_closed());
    }
}
