use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use empresas_cadastro::{AtualizarEmpresa, CriarEmpresa};
use empresas_core::EmpresaId;

use crate::app::errors;
use crate::state::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/", post(criar).get(listar))
        .route("/:id", get(buscar_por_id).put(atualizar).delete(deletar))
}

fn parse_id(id: &str) -> Result<EmpresaId, axum::response::Response> {
    EmpresaId::from_str(id)
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "ID inválido."))
}

pub async fn criar(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<CriarEmpresa>,
) -> axum::response::Response {
    let empresa = match state.empresas.criar(body).await {
        Ok(empresa) => empresa,
        Err(e) => return errors::service_error_to_response(e),
    };

    // The company's queue (and worker) starts with the registration.
    state.queues.get_or_create_queue(empresa.id);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "data": empresa,
            "message": "Empresa criada com sucesso!",
        })),
    )
        .into_response()
}

pub async fn listar(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    let empresas = match state.empresas.listar().await {
        Ok(empresas) => empresas,
        Err(e) => return errors::service_error_to_response(e),
    };

    let total = empresas.len();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": empresas,
            "total": total,
        })),
    )
        .into_response()
}

pub async fn buscar_por_id(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.empresas.buscar_por_id(id).await {
        Ok(Some(empresa)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": empresa,
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "Empresa não encontrada."),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn atualizar(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AtualizarEmpresa>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.empresas.atualizar(id, body).await {
        Ok(empresa) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": empresa,
                "message": "Empresa atualizada com sucesso!",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn deletar(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.empresas.deletar(id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Empresa deletada com sucesso!",
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
