//! Click event model and the non-blocking sender used by the redirect path.

use tokio::sync::mpsc;

/// A click to be counted for a short link.
///
/// Carries the link id for the update and the code for log context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub code: String,
}

impl ClickEvent {
    pub fn new(link_id: i64, code: impl Into<String>) -> Self {
        Self {
            link_id,
            code: code.into(),
        }
    }
}

/// Fire-and-forget handle for queueing click events.
///
/// [`ClickTracker::track`] never waits: when the queue is full or the worker
/// has stopped, the click is dropped and a warning is logged. Lost increments
/// are acceptable; a delayed redirect is not.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickTracker {
    pub fn new(sender: mpsc::Sender<ClickEvent>) -> Self {
        Self { sender }
    }

    /// Queues a click. Returns `true` if the event was accepted.
    pub fn track(&self, event: ClickEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(ev)) => {
                tracing::warn!(code = %ev.code, link_id = ev.link_id, "Click queue full, dropping click");
                metrics::counter!("shortlink_clicks_dropped_total", "reason" => "queue_full").increment(1);
                false
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                tracing::warn!(code = %ev.code, link_id = ev.link_id, "Click queue closed, dropping click");
                metrics::counter!("shortlink_clicks_dropped_total", "reason" => "queue_closed").increment(1);
                false
            }
        }
    }

    /// Returns true if the worker side of the queue has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation() {
        let event = ClickEvent::new(42, "abc123");
        assert_eq!(event.link_id, 42);
        assert_eq!(event.code, "abc123");
    }

    #[tokio::test]
    async fn test_track_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let tracker = ClickTracker::new(tx);

        assert!(tracker.track(ClickEvent::new(1, "aaaaaa")));
        assert_eq!(rx.recv().await, Some(ClickEvent::new(1, "aaaaaa")));
    }

    #[tokio::test]
    async fn test_track_drops_when_full() {
        let (tx, _rx) = mpsc::channel(1);
        let tracker = ClickTracker::new(tx);

        assert!(tracker.track(ClickEvent::new(1, "first1")));
        assert!(!tracker.track(ClickEvent::new(2, "second")));
        assert_eq!(tracker.capacity(), 0);
    }

    #[tokio::test]
    async fn test_track_drops_when_closed() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let tracker = ClickTracker::new(tx);

        assert!(tracker.is_closed());
        assert!(!tracker.track(ClickEvent::new(1, "abc123")));
    }
}
