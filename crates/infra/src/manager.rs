//! Per-company queue registry.
//!
//! Each company owns one queue named `empresa-{id}-queue` and one worker pool
//! attached to it. Queues are created lazily and live until shutdown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use empresas_cadastro::formato::nome_fila;
use empresas_core::EmpresaId;
use empresas_queue::{
    JobData, JobProcessor, JobState, JobSummary, Queue, QueueConfig, QueueCounts, QueueError,
    Worker, WorkerConfig,
};

/// Receipt for an accepted job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedJob {
    pub job_id: String,
    pub job_name: String,
}

/// Point-in-time view of one company's queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_name: String,
    #[serde(flatten)]
    pub counts: QueueCounts,
}

#[derive(Default)]
struct Registry {
    queues: HashMap<String, Queue>,
    workers: HashMap<String, Worker>,
}

/// Owns every company queue and its worker. One instance per process.
pub struct QueueManager {
    processor: Arc<dyn JobProcessor>,
    registry: Mutex<Registry>,
}

impl QueueManager {
    pub fn new(processor: Arc<dyn JobProcessor>) -> Self {
        Self {
            processor,
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Queue for a company, created with its worker on first use. Calling
    /// again for the same company returns the existing queue untouched.
    pub fn get_or_create_queue(&self, empresa_id: EmpresaId) -> Queue {
        let name = nome_fila(empresa_id);
        let mut registry = self.registry.lock().unwrap();
        if let Some(queue) = registry.queues.get(&name) {
            return queue.clone();
        }

        let queue = Queue::new(QueueConfig::new(name.clone()));
        info!(queue = %name, "fila criada");
        registry.queues.insert(name.clone(), queue.clone());
        Self::spawn_worker(&mut registry, &queue, &self.processor);
        queue
    }

    fn spawn_worker(registry: &mut Registry, queue: &Queue, processor: &Arc<dyn JobProcessor>) {
        if registry.workers.contains_key(queue.name()) {
            return;
        }
        let worker = Worker::spawn(queue.clone(), Arc::clone(processor), WorkerConfig::default());
        registry.workers.insert(queue.name().to_string(), worker);
    }

    /// Enqueue a job on a company's queue. Creates the queue if needed, and
    /// attaches a worker if the queue exists without one (a queue recreated
    /// by a status query has no worker until work is enqueued).
    pub fn add_job(
        &self,
        empresa_id: EmpresaId,
        empresa_nome: &str,
        tipo: &str,
        payload: serde_json::Value,
    ) -> Result<EnqueuedJob, QueueError> {
        let name = nome_fila(empresa_id);
        let queue = {
            let mut registry = self.registry.lock().unwrap();
            let queue = match registry.queues.get(&name) {
                Some(queue) => queue.clone(),
                None => {
                    let queue = Queue::new(QueueConfig::new(name.clone()));
                    info!(queue = %name, "fila criada");
                    registry.queues.insert(name.clone(), queue.clone());
                    queue
                }
            };
            Self::spawn_worker(&mut registry, &queue, &self.processor);
            queue
        };

        let data = JobData::new(empresa_id.to_string(), empresa_nome, tipo, payload);
        let id = queue.add(data)?;
        let job_name = queue
            .job(id)
            .map(|j| j.name)
            .unwrap_or_else(|| tipo.to_string());

        info!(queue = %name, job_id = %id, tipo, "job adicionado");
        Ok(EnqueuedJob {
            job_id: id.to_string(),
            job_name,
        })
    }

    /// Counts for a company's queue. A missing queue (process restarted since
    /// the company was registered) is recreated bare, without a worker, so
    /// status stays queryable; its counts start at zero.
    pub fn queue_status(&self, empresa_id: EmpresaId) -> QueueStatus {
        let name = nome_fila(empresa_id);
        let mut registry = self.registry.lock().unwrap();
        let queue = match registry.queues.get(&name) {
            Some(queue) => queue.clone(),
            None => {
                warn!(queue = %name, "fila ausente; recriando sem worker");
                let queue = Queue::new(QueueConfig::new(name.clone()));
                registry.queues.insert(name.clone(), queue.clone());
                queue
            }
        };

        QueueStatus {
            queue_name: name,
            counts: queue.counts(),
        }
    }

    /// Jobs in `state` on a company's queue; empty when the queue was never
    /// created.
    pub fn list_jobs(&self, empresa_id: EmpresaId, state: JobState) -> Vec<JobSummary> {
        let name = nome_fila(empresa_id);
        let queue = {
            let registry = self.registry.lock().unwrap();
            registry.queues.get(&name).cloned()
        };
        queue.map_or_else(Vec::new, |q| q.jobs_in_state(state))
    }

    /// Whether a worker is attached to the company's queue.
    pub fn has_worker(&self, empresa_id: EmpresaId) -> bool {
        let name = nome_fila(empresa_id);
        self.registry.lock().unwrap().workers.contains_key(&name)
    }

    /// Graceful shutdown: close every queue to new work, then wait for each
    /// worker to drain its in-flight jobs. Idempotent.
    pub async fn close_all(&self) {
        let (queues, workers) = {
            let mut registry = self.registry.lock().unwrap();
            let queues: Vec<Queue> = registry.queues.drain().map(|(_, q)| q).collect();
            let workers: Vec<Worker> = registry.workers.drain().map(|(_, w)| w).collect();
            (queues, workers)
        };

        for queue in &queues {
            queue.close();
        }
        for worker in workers {
            worker.close().await;
        }
        if !queues.is_empty() {
            info!(queues = queues.len(), "filas encerradas");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::EmpresaJobProcessor;
    use std::time::Duration;

    fn manager() -> QueueManager {
        QueueManager::new(Arc::new(EmpresaJobProcessor))
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let manager = manager();
        let id = EmpresaId::new();

        let first = manager.get_or_create_queue(id);
        let second = manager.get_or_create_queue(id);
        assert!(Queue::ptr_eq(&first, &second));
        assert!(manager.has_worker(id));
        assert_eq!(first.name(), nome_fila(id));

        manager.close_all().await;
    }

    #[tokio::test]
    async fn distinct_companies_get_distinct_queues() {
        let manager = manager();
        let a = manager.get_or_create_queue(EmpresaId::new());
        let b = manager.get_or_create_queue(EmpresaId::new());
        assert!(!Queue::ptr_eq(&a, &b));
        assert_ne!(a.name(), b.name());

        manager.close_all().await;
    }

    #[tokio::test]
    async fn status_query_recreates_queue_without_worker() {
        let manager = manager();
        let id = EmpresaId::new();

        let status = manager.queue_status(id);
        assert_eq!(status.queue_name, nome_fila(id));
        assert_eq!(status.counts, QueueCounts::default());
        assert!(!manager.has_worker(id));

        // The bare queue accepts and holds work, unprocessed.
        manager
            .add_job(id, "Empresa Teste", "backup", serde_json::json!({}))
            .unwrap();
        assert!(manager.has_worker(id));

        manager.close_all().await;
    }

    #[tokio::test]
    async fn list_jobs_for_unknown_queue_is_empty() {
        let manager = manager();
        let jobs = manager.list_jobs(EmpresaId::new(), JobState::Waiting);
        assert!(jobs.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn enqueued_job_runs_to_completion() {
        let manager = manager();
        let id = EmpresaId::new();
        manager.get_or_create_queue(id);

        let receipt = manager
            .add_job(
                id,
                "Empresa Teste",
                "enviar-email",
                serde_json::json!({"to": "x@y.z"}),
            )
            .unwrap();
        assert!(receipt.job_name.starts_with("enviar-email-"));

        for _ in 0..2000 {
            if manager.queue_status(id).counts.completed == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(manager.queue_status(id).counts.completed, 1);

        let completed = manager.list_jobs(id, JobState::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].payload.kind, "enviar-email");
        assert_eq!(completed[0].payload.tenant_id, id.to_string());

        manager.close_all().await;
    }

    #[tokio::test]
    async fn close_all_rejects_further_work_and_is_idempotent() {
        let manager = manager();
        let id = EmpresaId::new();
        let queue = manager.get_or_create_queue(id);

        manager.close_all().await;
        manager.close_all().await;

        assert!(queue.is_closed());
        assert!(!manager.has_worker(id));
    }
}
