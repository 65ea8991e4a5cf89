//! Company registry domain: the `Empresa` record, its validation rules, and
//! the CRUD service over an abstract document store.
//!
//! Pure domain logic plus the storage port; adapters live in `empresas-infra`.

pub mod empresa;
pub mod formato;
pub mod service;
pub mod store;
pub mod validacao;

pub use empresa::{AtualizarEmpresa, CriarEmpresa, Empresa};
pub use service::{EmpresaService, ServiceError};
pub use store::{EmpresaStore, StoreError};
