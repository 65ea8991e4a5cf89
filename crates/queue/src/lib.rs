//! `empresas-queue` — in-process job queue engine.
//!
//! A reusable tokio-based work queue: one [`Queue`] holds the job records and
//! state bookkeeping for a single logical queue, one [`Worker`] pulls and
//! executes its jobs with bounded concurrency, per-job retries with
//! exponential backoff, and bounded retention of terminal records.
//!
//! The engine is tenant-agnostic: callers decide how queues map to tenants.

pub mod queue;
pub mod types;
pub mod worker;

pub use queue::{Queue, QueueError};
pub use types::{
    JobData, JobError, JobId, JobOutcome, JobState, JobSummary, QueueConfig, QueueCounts,
    RetentionPolicy, RetryPolicy, UnknownJobState,
};
pub use worker::{JobProcessor, Worker, WorkerConfig};
