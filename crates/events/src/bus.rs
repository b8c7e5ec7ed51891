//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Each pipeline stage subscribes to the bus and reacts to one event type:
//! a created scan is fetched, a stored result is classified, a raised alert
//! is notified. Shared across the application as `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use veille_core::types::DbId;

/// Event type names published on the bus.
pub mod event_types {
    /// A pending scan exists and should be fetched.
    pub const SCAN_CREATED: &str = "scan.created";
    pub const SCAN_COMPLETED: &str = "scan.completed";
    pub const SCAN_FAILED: &str = "scan.failed";
    /// A scan result was stored and awaits classification.
    pub const RESULT_CREATED: &str = "result.created";
    /// An alert row was inserted for the first time.
    pub const ALERT_CREATED: &str = "alert.created";
    pub const REPORT_CREATED: &str = "report.created";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Something that happened in the pipeline.
///
/// Built with [`PlatformEvent::new`] and the [`with_source`](Self::with_source)
/// and [`with_payload`](Self::with_payload) builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, one of [`event_types`].
    pub event_type: String,

    /// Kind of entity the event is about (`"scan"`, `"scan_result"`, `"alert"`).
    pub source_entity_type: Option<String>,

    pub source_entity_id: Option<DbId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// `scan.created` for the given scan.
    pub fn scan_created(scan_id: DbId) -> Self {
        Self::new(event_types::SCAN_CREATED).with_source("scan", scan_id)
    }

    /// `result.created` for the given scan result.
    pub fn result_created(result_id: DbId, scan_id: DbId) -> Self {
        Self::new(event_types::RESULT_CREATED)
            .with_source("scan_result", result_id)
            .with_payload(serde_json::json!({ "scan_id": scan_id }))
    }

    /// `alert.created` for a newly inserted alert.
    pub fn alert_created(alert_id: DbId, severity: &str) -> Self {
        Self::new(event_types::ALERT_CREATED)
            .with_source("alert", alert_id)
            .with_payload(serde_json::json!({ "severity": severity }))
    }

    /// True when this event is of the given type and names an entity.
    pub fn entity_for(&self, event_type: &str) -> Option<DbId> {
        if self.event_type == event_type {
            self.source_entity_id
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Every subscriber receives every event. When the buffer is full the
/// oldest events are dropped and slow receivers observe
/// `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        tracing::debug!(
            event_type = %event.event_type,
            entity_id = ?event.source_entity_id,
            "Publishing event",
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(PlatformEvent::result_created(42, 7));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, event_types::RESULT_CREATED);
        assert_eq!(received.source_entity_type.as_deref(), Some("scan_result"));
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.payload["scan_id"], 7);
    }

    #[tokio::test]
    async fn every_stage_sees_every_event() {
        let bus = EventBus::default();
        let mut ingestor = bus.subscribe();
        let mut evaluator = bus.subscribe();

        bus.publish(PlatformEvent::scan_created(1));

        let a = ingestor.recv().await.unwrap();
        let b = evaluator.recv().await.unwrap();
        assert_eq!(a.entity_for(event_types::SCAN_CREATED), Some(1));
        assert_eq!(b.entity_for(event_types::RESULT_CREATED), None);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new("orphan.event"));
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 0..5 {
            bus.publish(PlatformEvent::scan_created(id));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
    }

    #[test]
    fn alert_created_carries_severity() {
        let event = PlatformEvent::alert_created(9, "high");
        assert_eq!(event.entity_for(event_types::ALERT_CREATED), Some(9));
        assert_eq!(event.payload["severity"], "high");
    }
}
