use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use empresas_cadastro::Empresa;
use empresas_core::EmpresaId;
use empresas_queue::JobState;

use crate::app::{dto, errors};
use crate::state::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/:id/jobs", post(adicionar_job).get(listar_jobs))
        .route("/:id/queue-status", get(status_fila))
}

fn parse_id(id: &str) -> Result<EmpresaId, axum::response::Response> {
    EmpresaId::from_str(id)
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "Parâmetro \"id\" inválido."))
}

async fn buscar_empresa(
    state: &AppState,
    id: EmpresaId,
) -> Result<Empresa, axum::response::Response> {
    match state.empresas.buscar_por_id(id).await {
        Ok(Some(empresa)) => Ok(empresa),
        Ok(None) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "Empresa não encontrada.",
        )),
        Err(e) => Err(errors::service_error_to_response(e)),
    }
}

pub async fn adicionar_job(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdicionarJobRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let tipo = match body.tipo.as_deref() {
        Some(tipo) if !tipo.trim().is_empty() => tipo.to_string(),
        _ => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "O campo \"tipo\" é obrigatório.",
            )
        }
    };

    let empresa = match buscar_empresa(&state, id).await {
        Ok(empresa) => empresa,
        Err(resp) => return resp,
    };

    let dados = body.dados.unwrap_or_else(|| serde_json::json!({}));
    let job = match state
        .queues
        .add_job(empresa.id, &empresa.razao_social, &tipo, dados)
    {
        Ok(job) => job,
        Err(e) => return errors::queue_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "data": {
                "jobId": job.job_id,
                "jobName": job.job_name,
                "empresaId": empresa.id,
                "empresaNome": empresa.razao_social,
                "tipo": tipo,
            },
            "message": "Job adicionado na fila com sucesso!",
        })),
    )
        .into_response()
}

pub async fn listar_jobs(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<dto::ListarJobsQuery>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let status = query.status.unwrap_or_else(|| "waiting".to_string());
    let Ok(state_filter) = JobState::from_str(&status) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "Status inválido. Use: waiting, active, completed ou failed.",
        );
    };

    if let Err(resp) = buscar_empresa(&state, id).await {
        return resp;
    }

    let jobs = state.queues.list_jobs(id, state_filter);

    let total = jobs.len();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": jobs,
            "total": total,
            "status": status,
        })),
    )
        .into_response()
}

pub async fn status_fila(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let empresa = match buscar_empresa(&state, id).await {
        Ok(empresa) => empresa,
        Err(resp) => return resp,
    };

    let status = state.queues.queue_status(id);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": {
                "empresaId": empresa.id,
                "empresaNome": empresa.razao_social,
                "queueName": status.queue_name,
                "waiting": status.counts.waiting,
                "active": status.counts.active,
                "completed": status.counts.completed,
                "failed": status.counts.failed,
            },
        })),
    )
        .into_response()
}
