//! Storage port for the company registry.

use async_trait::async_trait;
use thiserror::Error;

use empresas_core::EmpresaId;

use crate::empresa::Empresa;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Empresa não encontrada.")]
    NotFound,
    #[error("{0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Document-store port for `Empresa` records. Listing preserves insertion
/// order; `update` replaces the whole record.
#[async_trait]
pub trait EmpresaStore: Send + Sync {
    async fn insert(&self, empresa: Empresa) -> Result<(), StoreError>;

    async fn get(&self, id: EmpresaId) -> Result<Option<Empresa>, StoreError>;

    async fn list(&self) -> Result<Vec<Empresa>, StoreError>;

    async fn update(&self, empresa: Empresa) -> Result<(), StoreError>;

    async fn delete(&self, id: EmpresaId) -> Result<(), StoreError>;

    /// Lookup by cleaned CNPJ (14 digits).
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Empresa>, StoreError>;
}
