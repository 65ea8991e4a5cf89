//! Queue handle and state bookkeeping for one logical queue.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::types::{
    JobData, JobId, JobOutcome, JobState, JobSummary, QueueConfig, QueueCounts,
};

/// Queue-level error.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The queue no longer accepts work (process shutdown).
    #[error("queue {0} is closed")]
    Closed(String),
}

/// Internal job status. `Waiting` covers both fresh jobs and jobs sitting out
/// a retry backoff (`not_before` gates claiming); `Failed` is terminal.
#[derive(Debug, Clone)]
enum Status {
    Waiting { not_before: Option<Instant> },
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
struct Job {
    id: JobId,
    name: String,
    data: JobData,
    status: Status,
    attempts_made: u32,
    seq: u64,
    processed_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
}

impl Job {
    fn state(&self) -> JobState {
        match self.status {
            Status::Waiting { .. } => JobState::Waiting,
            Status::Active => JobState::Active,
            Status::Completed => JobState::Completed,
            Status::Failed => JobState::Failed,
        }
    }

    fn ready(&self, now: Instant) -> bool {
        match self.status {
            Status::Waiting { not_before } => not_before.map_or(true, |t| t <= now),
            _ => false,
        }
    }

    fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            name: self.name.clone(),
            payload: self.data.clone(),
            progress: 0,
            attempts_made: self.attempts_made,
            processed_at: self.processed_at,
            finished_at: self.finished_at,
            failure_reason: self.failure_reason.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: HashMap<JobId, Job>,
    next_seq: u64,
    /// Terminal records in completion order, for retention eviction.
    completed_order: VecDeque<JobId>,
    failed_order: VecDeque<JobId>,
}

#[derive(Debug)]
struct Inner {
    config: QueueConfig,
    state: Mutex<QueueState>,
    notify: Notify,
    closed: AtomicBool,
}

/// A job claimed for execution.
#[derive(Debug, Clone)]
pub(crate) struct ClaimedJob {
    pub id: JobId,
    pub data: JobData,
}

/// Handle to one logical queue. Cheap to clone; all clones share state.
#[derive(Debug, Clone)]
pub struct Queue {
    inner: Arc<Inner>,
}

impl Queue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(QueueState::default()),
                notify: Notify::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Identity check: two handles referring to the same queue.
    pub fn ptr_eq(a: &Queue, b: &Queue) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Enqueue a job. Returns immediately; execution happens on the queue's
    /// worker, decoupled from the caller.
    pub fn add(&self, data: JobData) -> Result<JobId, QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed(self.name().to_string()));
        }

        let id = JobId::new();
        let name = format!("{}-{}", data.kind, Utc::now().timestamp_millis());
        let mut state = self.inner.state.lock().unwrap();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.jobs.insert(
            id,
            Job {
                id,
                name,
                data,
                status: Status::Waiting { not_before: None },
                attempts_made: 0,
                seq,
                processed_at: None,
                finished_at: None,
                failure_reason: None,
            },
        );
        drop(state);

        self.inner.notify.notify_one();
        Ok(id)
    }

    /// Point-in-time counts by state.
    pub fn counts(&self) -> QueueCounts {
        let state = self.inner.state.lock().unwrap();
        let mut counts = QueueCounts::default();
        for job in state.jobs.values() {
            match job.state() {
                JobState::Waiting => counts.waiting += 1,
                JobState::Active => counts.active += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Read one job's summary, if it is still retained.
    pub fn job(&self, id: JobId) -> Option<JobSummary> {
        let state = self.inner.state.lock().unwrap();
        state.jobs.get(&id).map(Job::summary)
    }

    /// Jobs currently in `wanted`, insertion-ordered (terminal states are
    /// ordered by when they finished).
    pub fn jobs_in_state(&self, wanted: JobState) -> Vec<JobSummary> {
        let state = self.inner.state.lock().unwrap();
        match wanted {
            JobState::Completed => state
                .completed_order
                .iter()
                .filter_map(|id| state.jobs.get(id))
                .map(Job::summary)
                .collect(),
            JobState::Failed => state
                .failed_order
                .iter()
                .filter_map(|id| state.jobs.get(id))
                .map(Job::summary)
                .collect(),
            _ => {
                let mut jobs: Vec<&Job> = state
                    .jobs
                    .values()
                    .filter(|j| j.state() == wanted)
                    .collect();
                jobs.sort_by_key(|j| j.seq);
                jobs.into_iter().map(Job::summary).collect()
            }
        }
    }

    /// Stop accepting new work. Idempotent; existing records stay readable.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Resolved when new work may be available. Used by the worker loop.
    pub(crate) async fn work_available(&self) {
        self.inner.notify.notified().await;
    }

    /// Claim the oldest ready waiting job, marking it active.
    pub(crate) fn claim_next(&self) -> Option<ClaimedJob> {
        let now = Instant::now();
        let mut state = self.inner.state.lock().unwrap();

        let id = state
            .jobs
            .values()
            .filter(|j| j.ready(now))
            .min_by_key(|j| j.seq)
            .map(|j| j.id)?;

        let job = state.jobs.get_mut(&id)?;
        job.status = Status::Active;
        job.attempts_made += 1;
        job.processed_at = Some(Utc::now());
        Some(ClaimedJob {
            id: job.id,
            data: job.data.clone(),
        })
    }

    /// Record a successful execution, evicting the oldest completed records
    /// beyond the retention cap.
    pub(crate) fn record_success(&self, id: JobId, outcome: JobOutcome) {
        let keep = self.inner.config.retention.keep_completed;
        let mut state = self.inner.state.lock().unwrap();
        let Some(job) = state.jobs.get_mut(&id) else {
            return;
        };
        job.status = Status::Completed;
        job.finished_at = Some(outcome.processed_at);
        info!(queue = %self.name(), job_id = %id, "job completed");

        state.completed_order.push_back(id);
        while state.completed_order.len() > keep {
            if let Some(evicted) = state.completed_order.pop_front() {
                state.jobs.remove(&evicted);
            }
        }
    }

    /// Record a failed attempt: reschedule with backoff while attempts
    /// remain, otherwise mark terminally failed and apply retention.
    pub(crate) fn record_failure(&self, id: JobId, reason: &str) {
        let retry = self.inner.config.retry;
        let keep = self.inner.config.retention.keep_failed;
        let mut state = self.inner.state.lock().unwrap();
        let Some(job) = state.jobs.get_mut(&id) else {
            return;
        };

        if retry.should_retry(job.attempts_made) {
            let delay = retry.delay_after(job.attempts_made);
            warn!(
                queue = %self.name(),
                job_id = %id,
                attempt = job.attempts_made,
                delay_ms = delay.as_millis() as u64,
                error = reason,
                "job failed; will retry"
            );
            job.status = Status::Waiting {
                not_before: Some(Instant::now() + delay),
            };
            return;
        }

        error!(
            queue = %self.name(),
            job_id = %id,
            attempts = job.attempts_made,
            error = reason,
            "job failed after exhausting attempts"
        );
        job.status = Status::Failed;
        job.finished_at = Some(Utc::now());
        job.failure_reason = Some(reason.to_string());

        state.failed_order.push_back(id);
        while state.failed_order.len() > keep {
            if let Some(evicted) = state.failed_order.pop_front() {
                state.jobs.remove(&evicted);
            }
        }
    }
}
