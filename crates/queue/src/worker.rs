//! Worker pool: pulls jobs from one queue and executes them with bounded
//! concurrency.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::queue::Queue;
use crate::types::{JobData, JobError, JobOutcome};

/// Job execution seam. Implementations route on `data.kind`.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, data: &JobData) -> Result<JobOutcome, JobError>;
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum jobs executing simultaneously (per queue, not global).
    pub concurrency: usize,
    /// Pull-loop poll interval; also bounds how late a backoff retry fires.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Handle to a running worker pool for one queue.
#[derive(Debug)]
pub struct Worker {
    shutdown: watch::Sender<bool>,
    join: tokio::task::JoinHandle<()>,
    queue_name: String,
}

impl Worker {
    /// Spawn the pull loop for `queue`. At most `config.concurrency` jobs run
    /// at once; completion and failure are recorded on the queue and logged,
    /// never propagated out of the pool.
    pub fn spawn(queue: Queue, processor: Arc<dyn JobProcessor>, config: WorkerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let queue_name = queue.name().to_string();
        let join = tokio::spawn(worker_loop(queue, processor, config, shutdown_rx));

        Self {
            shutdown: shutdown_tx,
            join,
            queue_name,
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Graceful shutdown: stop claiming, wait for in-flight jobs to finish.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}

async fn worker_loop(
    queue: Queue,
    processor: Arc<dyn JobProcessor>,
    config: WorkerConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let mut running: JoinSet<()> = JoinSet::new();

    info!(
        queue = %queue.name(),
        concurrency = config.concurrency,
        "worker started"
    );

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // Claim as many ready jobs as free permits allow.
        loop {
            let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                break;
            };
            let Some(claimed) = queue.claim_next() else {
                drop(permit);
                break;
            };

            let queue = queue.clone();
            let processor = Arc::clone(&processor);
            running.spawn(async move {
                let _permit = permit;
                debug!(
                    queue = %queue.name(),
                    job_id = %claimed.id,
                    kind = %claimed.data.kind,
                    "job started"
                );
                match processor.process(&claimed.data).await {
                    Ok(outcome) => queue.record_success(claimed.id, outcome),
                    Err(e) => queue.record_failure(claimed.id, &e.to_string()),
                }
            });
        }

        tokio::select! {
            _ = shutdown_rx.changed() => {}
            _ = queue.work_available() => {}
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = running.join_next(), if !running.is_empty() => {}
        }
    }

    // Drain in-flight jobs before reporting the pool stopped.
    while running.join_next().await.is_some() {}

    info!(queue = %queue.name(), "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobState, QueueConfig, RetentionPolicy, RetryPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OkProcessor;

    #[async_trait]
    impl JobProcessor for OkProcessor {
        async fn process(&self, _data: &JobData) -> Result<JobOutcome, JobError> {
            Ok(JobOutcome::now())
        }
    }

    struct FailingProcessor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JobProcessor for FailingProcessor {
        async fn process(&self, _data: &JobData) -> Result<JobOutcome, JobError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(JobError::new("simulated handler failure"))
        }
    }

    struct ConcurrencyTracker {
        current: AtomicUsize,
        max_seen: AtomicUsize,
    }

    #[async_trait]
    impl JobProcessor for ConcurrencyTracker {
        async fn process(&self, _data: &JobData) -> Result<JobOutcome, JobError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1000)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(JobOutcome::now())
        }
    }

    fn data(kind: &str) -> JobData {
        JobData::new("tenant-1", "Empresa Teste", kind, serde_json::json!({}))
    }

    async fn wait_until(queue: &Queue, pred: impl Fn(crate::types::QueueCounts) -> bool) {
        for _ in 0..2000 {
            if pred(queue.counts()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("queue did not reach the expected state: {:?}", queue.counts());
    }

    #[tokio::test(start_paused = true)]
    async fn executes_jobs_to_completion() {
        let queue = Queue::new(QueueConfig::new("q"));
        let worker = Worker::spawn(queue.clone(), Arc::new(OkProcessor), WorkerConfig::default());

        for i in 0..3 {
            queue.add(data(&format!("job-{i}"))).unwrap();
        }

        wait_until(&queue, |c| c.completed == 3).await;
        let listed = queue.jobs_in_state(JobState::Completed);
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|j| j.attempts_made == 1));

        worker.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failing_job_is_attempted_three_times_with_backoff() {
        let queue = Queue::new(QueueConfig::new("q").with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
        }));
        let processor = Arc::new(FailingProcessor {
            calls: AtomicUsize::new(0),
        });
        let worker = Worker::spawn(queue.clone(), processor.clone(), WorkerConfig::default());

        let started = tokio::time::Instant::now();
        queue.add(data("enviar-email")).unwrap();

        wait_until(&queue, |c| c.failed == 1).await;

        // 1 initial + 2 retries, with ~2s and ~4s backoff in between.
        assert_eq!(processor.calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(6000));

        let listed = queue.jobs_in_state(JobState::Failed);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].attempts_made, 3);
        assert_eq!(
            listed[0].failure_reason.as_deref(),
            Some("simulated handler failure")
        );

        worker.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_cap_is_never_exceeded() {
        let queue = Queue::new(QueueConfig::new("q"));
        let processor = Arc::new(ConcurrencyTracker {
            current: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let worker = Worker::spawn(queue.clone(), processor.clone(), WorkerConfig::default());

        for i in 0..20 {
            queue.add(data(&format!("job-{i}"))).unwrap();
        }

        wait_until(&queue, |c| c.completed == 20).await;
        assert!(processor.max_seen.load(Ordering::SeqCst) <= 5);

        worker.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn retention_keeps_only_the_newest_completed_records() {
        let queue = Queue::new(QueueConfig::new("q").with_retention(RetentionPolicy {
            keep_completed: 100,
            keep_failed: 50,
        }));
        let worker = Worker::spawn(queue.clone(), Arc::new(OkProcessor), WorkerConfig::default());

        let mut ids = Vec::new();
        for i in 0..150 {
            ids.push(queue.add(data(&format!("job-{i}"))).unwrap());
        }

        wait_until(&queue, |c| c.waiting == 0 && c.active == 0).await;

        let listed = queue.jobs_in_state(JobState::Completed);
        assert_eq!(listed.len(), 100);
        let retained: Vec<_> = listed.iter().map(|j| j.id).collect();
        assert_eq!(retained, ids[50..].to_vec());

        worker.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn close_waits_for_in_flight_jobs() {
        let queue = Queue::new(QueueConfig::new("q"));
        let processor = Arc::new(ConcurrencyTracker {
            current: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let worker = Worker::spawn(queue.clone(), processor.clone(), WorkerConfig::default());

        for i in 0..3 {
            queue.add(data(&format!("job-{i}"))).unwrap();
        }
        wait_until(&queue, |c| c.active > 0).await;

        worker.close().await;

        // Whatever was claimed finished; nothing is left half-running.
        let counts = queue.counts();
        assert_eq!(counts.active, 0);
        assert_eq!(processor.current.load(Ordering::SeqCst), 0);
        assert_eq!(counts.completed + counts.waiting, 3);
    }
}
