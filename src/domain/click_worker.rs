//! Background worker applying click increments.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Retries after the first failed increment.
const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// Each event is processed on its own task; at most `concurrency` increments
/// are in flight at once. Before returning, the worker waits for in-flight
/// increments to finish.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        tokio::spawn(async move {
            record_click(repository.as_ref(), &event).await;
            drop(permit);
        });
    }

    let _ = permits.acquire_many(concurrency as u32).await;
    tracing::info!("Click queue closed, worker stopped");
}

/// Applies one increment with exponential backoff.
///
/// Failures are logged and swallowed.
async fn record_click(repository: &dyn LinkRepository, event: &ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(25)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let link_id = event.link_id;
    let result = Retry::spawn(strategy, move || repository.increment_clicks(link_id)).await;

    match result {
        Ok(true) => {
            tracing::debug!(code = %event.code, link_id = event.link_id, "Click recorded");
            metrics::counter!("shortlink_clicks_recorded_total").increment(1);
        }
        Ok(false) => {
            tracing::warn!(code = %event.code, link_id = event.link_id, "Click for unknown link ignored");
        }
        Err(e) => {
            tracing::warn!(
                code = %event.code,
                link_id = event.link_id,
                error = %e,
                "Failed to record click after retries"
            );
            metrics::counter!("shortlink_clicks_dropped_total", "reason" => "storage_error").increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_worker_increments_each_event() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks()
            .withf(|id| *id == 7)
            .times(3)
            .returning(|_| Ok(true));

        let (tx, rx) = mpsc::channel(10);
        for _ in 0..3 {
            tx.send(ClickEvent::new(7, "abc123")).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 2).await;
    }

    #[tokio::test]
    async fn test_worker_retries_failed_increment() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(true)
            }
        });

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new(1, "retry1")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 1).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_retries() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new(1, "broken")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 1).await;
    }

    #[tokio::test]
    async fn test_worker_stops_when_queue_closed() {
        let repo = MockLinkRepository::new();
        let (tx, rx) = mpsc::channel::<ClickEvent>(1);
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 4).await;
    }
}
