//! Shared application state handed to every handler.

use std::sync::Arc;

use empresas_cadastro::EmpresaService;
use empresas_infra::{EmpresaJobProcessor, InMemoryEmpresaStore, QueueManager};

/// Wiring for one process: the company registry and the queue manager.
pub struct AppState {
    pub empresas: EmpresaService<InMemoryEmpresaStore>,
    pub queues: QueueManager,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            empresas: EmpresaService::new(InMemoryEmpresaStore::new()),
            queues: QueueManager::new(Arc::new(EmpresaJobProcessor)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
