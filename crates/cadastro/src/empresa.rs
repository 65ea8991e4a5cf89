//! The `Empresa` record and its create/update DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use empresas_core::EmpresaId;

/// A registered company. CNPJ is stored cleaned (14 digits, no punctuation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: EmpresaId,
    pub razao_social: String,
    pub cnpj: String,
    pub data_inicio: DateTime<Utc>,
    pub data_fim: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a company. Dates arrive as ISO-8601 strings and are
/// validated/parsed by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriarEmpresa {
    pub razao_social: String,
    pub cnpj: String,
    pub data_inicio: String,
    pub data_fim: String,
}

/// Partial update input; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarEmpresa {
    pub razao_social: Option<String>,
    pub cnpj: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}
