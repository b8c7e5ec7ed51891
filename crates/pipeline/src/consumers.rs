//! Event-consumer loops chaining the pipeline stages over the bus.
//!
//! Each stage subscribes before anything is published and handles every
//! matching event on its own task, so a slow fetch does not hold back the
//! classification of another scan's results.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use veille_core::types::DbId;
use veille_events::{event_types, EventBus, PlatformEvent};

use crate::evaluator::AlertEvaluator;
use crate::ingestor::ResultIngestor;
use crate::notifier::Notifier;

/// The three event-driven stages.
pub struct PipelineStages {
    pub ingestor: Arc<ResultIngestor>,
    pub evaluator: Arc<AlertEvaluator>,
    pub notifier: Arc<Notifier>,
}

/// Subscribe every stage to the bus and spawn its loop.
///
/// The loops end when `cancel` fires or the bus is dropped.
pub fn spawn_pipeline(
    bus: &EventBus,
    stages: PipelineStages,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let PipelineStages {
        ingestor,
        evaluator,
        notifier,
    } = stages;

    vec![
        tokio::spawn(consume(
            "ingestor",
            event_types::SCAN_CREATED,
            bus.subscribe(),
            cancel.clone(),
            move |scan_id| {
                let ingestor = Arc::clone(&ingestor);
                async move { ingestor.handle(scan_id).await }
            },
        )),
        tokio::spawn(consume(
            "evaluator",
            event_types::RESULT_CREATED,
            bus.subscribe(),
            cancel.clone(),
            move |result_id| {
                let evaluator = Arc::clone(&evaluator);
                async move { evaluator.handle(result_id).await }
            },
        )),
        tokio::spawn(consume(
            "notifier",
            event_types::ALERT_CREATED,
            bus.subscribe(),
            cancel,
            move |alert_id| {
                let notifier = Arc::clone(&notifier);
                async move { notifier.handle(alert_id).await }
            },
        )),
    ]
}

/// Receive events until cancelled or closed, spawning `handle` for each
/// event of `event_type` that names an entity.
pub async fn consume<F, Fut>(
    stage: &'static str,
    event_type: &'static str,
    mut rx: broadcast::Receiver<PlatformEvent>,
    cancel: CancellationToken,
    handle: F,
) where
    F: Fn(DbId) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tracing::info!(stage, event_type, "Pipeline consumer started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = rx.recv() => match received {
                Ok(event) => {
                    if let Some(id) = event.entity_for(event_type) {
                        tokio::spawn(handle(id));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(stage, skipped, "Pipeline consumer lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    tracing::info!(stage, "Pipeline consumer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn spawn_probe(
        bus: &EventBus,
        event_type: &'static str,
        cancel: CancellationToken,
    ) -> (JoinHandle<()>, mpsc::UnboundedReceiver<DbId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(consume(
            "probe",
            event_type,
            bus.subscribe(),
            cancel,
            move |id| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(id);
                }
            },
        ));
        (handle, rx)
    }

    #[tokio::test]
    async fn only_matching_events_are_handled() {
        let bus = EventBus::default();
        let cancel = CancellationToken::new();
        let (task, mut seen) = spawn_probe(&bus, event_types::RESULT_CREATED, cancel.clone());

        bus.publish(PlatformEvent::scan_created(1));
        bus.publish(PlatformEvent::result_created(10, 1));
        bus.publish(PlatformEvent::alert_created(5, "high"));
        bus.publish(PlatformEvent::result_created(11, 1));

        let mut ids = vec![
            tokio::time::timeout(Duration::from_secs(1), seen.recv()).await.unwrap().unwrap(),
            tokio::time::timeout(Duration::from_secs(1), seen.recv()).await.unwrap().unwrap(),
        ];
        ids.sort();
        assert_eq!(ids, vec![10, 11]);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn loop_ends_when_bus_is_dropped() {
        let bus = EventBus::default();
        let (task, _seen) = spawn_probe(&bus, event_types::SCAN_CREATED, CancellationToken::new());
        drop(bus);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("consumer should stop")
            .unwrap();
    }
}
