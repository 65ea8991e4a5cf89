use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/empresas/{id}/jobs`. `tipo` is required (validated in
/// the handler so the error envelope matches the rest of the API); `dados`
/// is free-form and defaults to `{}`.
#[derive(Debug, Deserialize)]
pub struct AdicionarJobRequest {
    pub tipo: Option<String>,
    pub dados: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ListarJobsQuery {
    pub status: Option<String>,
}
