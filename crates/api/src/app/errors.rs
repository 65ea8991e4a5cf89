use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use empresas_cadastro::ServiceError;
use empresas_core::DomainError;
use empresas_queue::QueueError;

/// `{ success: false, error: message }` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let status = match &err {
        ServiceError::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Domain(DomainError::InvalidId(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Domain(DomainError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(status, err.to_string())
}

pub fn queue_error_to_response(err: QueueError) -> axum::response::Response {
    match err {
        QueueError::Closed(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
