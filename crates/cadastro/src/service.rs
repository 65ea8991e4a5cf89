//! CRUD service for the company registry.
//!
//! Validation happens here, against raw input DTOs, so every adapter (HTTP or
//! otherwise) gets the same rules and the same Portuguese messages.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use empresas_core::{DomainError, EmpresaId};

use crate::empresa::{AtualizarEmpresa, CriarEmpresa, Empresa};
use crate::formato::limpar_cnpj;
use crate::store::{EmpresaStore, StoreError};
use crate::validacao::{parse_data_iso, validar_cnpj, validar_periodo, validar_razao_social};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registry operations over an abstract store.
pub struct EmpresaService<S> {
    store: S,
}

impl<S: EmpresaStore> EmpresaService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate and register a company. CNPJ is stored cleaned; the CNPJ must
    /// not collide with an existing record.
    pub async fn criar(&self, input: CriarEmpresa) -> Result<Empresa, ServiceError> {
        if !validar_razao_social(&input.razao_social) {
            return Err(DomainError::validation(
                "Razão social inválida. Deve ter no mínimo 3 caracteres.",
            )
            .into());
        }
        if !validar_cnpj(&input.cnpj) {
            return Err(DomainError::validation("CNPJ inválido.").into());
        }
        let data_inicio = parse_data_iso(&input.data_inicio).ok_or_else(|| {
            DomainError::validation("Data de início inválida. Use formato ISO 8601.")
        })?;
        let data_fim = parse_data_iso(&input.data_fim)
            .ok_or_else(|| DomainError::validation("Data de fim inválida. Use formato ISO 8601."))?;
        if !validar_periodo(data_inicio, data_fim) {
            return Err(
                DomainError::validation("Data de fim deve ser posterior à data de início.").into(),
            );
        }

        let cnpj = limpar_cnpj(&input.cnpj);
        if self.store.find_by_cnpj(&cnpj).await?.is_some() {
            return Err(
                DomainError::conflict("Já existe uma empresa cadastrada com este CNPJ.").into(),
            );
        }

        let now = Utc::now();
        let empresa = Empresa {
            id: EmpresaId::new(),
            razao_social: input.razao_social.trim().to_string(),
            cnpj,
            data_inicio,
            data_fim,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(empresa.clone()).await?;
        info!(empresa_id = %empresa.id, cnpj = %empresa.cnpj, "empresa cadastrada");
        Ok(empresa)
    }

    /// All registered companies, in insertion order.
    pub async fn listar(&self) -> Result<Vec<Empresa>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn buscar_por_id(&self, id: EmpresaId) -> Result<Option<Empresa>, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Partial update. Absent fields keep their stored values; present fields
    /// go through the same validation as `criar`, and the resulting period
    /// must still be consistent.
    pub async fn atualizar(
        &self,
        id: EmpresaId,
        input: AtualizarEmpresa,
    ) -> Result<Empresa, ServiceError> {
        let mut empresa = self
            .store
            .get(id)
            .await?
            .ok_or(DomainError::NotFound)?;

        if let Some(razao_social) = input.razao_social {
            if !validar_razao_social(&razao_social) {
                return Err(DomainError::validation(
                    "Razão social inválida. Deve ter no mínimo 3 caracteres.",
                )
                .into());
            }
            empresa.razao_social = razao_social.trim().to_string();
        }

        if let Some(cnpj) = input.cnpj {
            if !validar_cnpj(&cnpj) {
                return Err(DomainError::validation("CNPJ inválido.").into());
            }
            let cnpj = limpar_cnpj(&cnpj);
            if let Some(existente) = self.store.find_by_cnpj(&cnpj).await? {
                if existente.id != id {
                    return Err(DomainError::conflict(
                        "Já existe outra empresa cadastrada com este CNPJ.",
                    )
                    .into());
                }
            }
            empresa.cnpj = cnpj;
        }

        if let Some(data_inicio) = input.data_inicio {
            empresa.data_inicio = parse_data_iso(&data_inicio).ok_or_else(|| {
                DomainError::validation("Data de início inválida. Use formato ISO 8601.")
            })?;
        }
        if let Some(data_fim) = input.data_fim {
            empresa.data_fim = parse_data_iso(&data_fim).ok_or_else(|| {
                DomainError::validation("Data de fim inválida. Use formato ISO 8601.")
            })?;
        }
        if !validar_periodo(empresa.data_inicio, empresa.data_fim) {
            return Err(
                DomainError::validation("Data de fim deve ser posterior à data de início.").into(),
            );
        }

        empresa.updated_at = Utc::now();
        self.store.update(empresa.clone()).await?;
        info!(empresa_id = %empresa.id, "empresa atualizada");
        Ok(empresa)
    }

    /// Remove a company. Errors with `NotFound` when the id is unknown.
    pub async fn deletar(&self, id: EmpresaId) -> Result<Empresa, ServiceError> {
        let empresa = self
            .store
            .get(id)
            .await?
            .ok_or(DomainError::NotFound)?;
        self.store.delete(id).await?;
        info!(empresa_id = %empresa.id, "empresa removida");
        Ok(empresa)
    }
}
