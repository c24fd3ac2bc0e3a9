use super::posts::PostsState;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

/// Storage liveness: 200 when the backend answers, 503 otherwise
pub async fn health_check(state: web::Data<PostsState>) -> impl Responder {
    let backend = state.repository.backend().as_str();
    let start = std::time::Instant::now();

    match state.repository.health_check().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            backend,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }),
        Err(e) => {
            warn!(backend, error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unavailable",
                version: env!("CARGO_PKG_VERSION"),
                backend,
                latency_ms: None,
            })
        }
    }
}
