//! Adapters: in-memory storage, the job handler dispatch table, and the
//! per-company queue manager.

pub mod manager;
pub mod processor;
pub mod store;

pub use manager::{EnqueuedJob, QueueManager, QueueStatus};
pub use processor::{EmpresaJobProcessor, JobKind};
pub use store::InMemoryEmpresaStore;
