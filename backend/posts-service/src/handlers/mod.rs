/// HTTP handlers for posts-service
///
/// - Posts: the HTML controller for list, create, read, update, delete
/// - Health: storage backend liveness probe
/// - Metrics: Prometheus exposition (`crate::metrics`)
pub mod health;
pub mod posts;

pub use health::health_check;
pub use posts::PostsState;

use crate::config::DEFAULT_MAX_FORM_BYTES;
use actix_web::{http::header, web, HttpResponse};

/// Form extractor settings; post bodies are unbounded up to `limit` bytes
pub fn form_config(limit: usize) -> web::FormConfig {
    web::FormConfig::default().limit(limit)
}

/// Register every route. `/posts/create` must precede `/posts/{id}`.
///
/// Forms are limited to `DEFAULT_MAX_FORM_BYTES`; register another
/// `form_config` on the app afterwards to change it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(form_config(DEFAULT_MAX_FORM_BYTES))
        .route("/", web::get().to(root))
        .route("/health", web::get().to(health_check))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .service(
            web::resource("/posts")
                .route(web::get().to(posts::index))
                .route(web::post().to(posts::store)),
        )
        .route("/posts/create", web::get().to(posts::create_form))
        .route("/posts/{id}/edit", web::get().to(posts::edit_form))
        .service(
            web::resource("/posts/{id}")
                .route(web::get().to(posts::show))
                .route(web::put().to(posts::update))
                .route(web::patch().to(posts::update))
                .route(web::delete().to(posts::destroy))
                .route(web::post().to(posts::spoofed)),
        );
}

async fn root() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/posts"))
        .finish()
}
