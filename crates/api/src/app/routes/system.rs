use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::app::errors;

pub async fn health() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "OK",
            "timestamp": Utc::now().to_rfc3339(),
            "service": "Desafio Empresas API",
        })),
    )
        .into_response()
}

pub async fn api_info() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "API Desafio Empresas",
            "version": "1.0.0",
            "endpoints": {
                "health": "/health",
                "empresas": "/api/empresas",
                "jobs": "/api/empresas/:id/jobs",
                "queueStatus": "/api/empresas/:id/queue-status",
            },
        })),
    )
        .into_response()
}

pub async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Rota não encontrada")
}
