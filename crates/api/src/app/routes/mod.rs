use axum::{routing::get, Router};

pub mod empresas;
pub mod jobs;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::api_info))
        .nest("/empresas", empresas::router().merge(jobs::router()))
}
