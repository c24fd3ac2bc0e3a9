use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use posts_service::handlers::{self, PostsState};
use posts_service::{repository, Config};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Posts Service
///
/// Serves the posts CRUD pages over HTTP against the storage backend
/// selected by `POSTS_STORAGE_BACKEND`.
#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,posts_service=debug,actix_web=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // Load configuration
    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    info!(
        env = %config.app.env,
        backend = %config.storage.backend,
        page_size = config.storage.page_size,
        max_form_bytes = config.app.max_form_bytes,
        "Starting posts-service"
    );

    let repository = repository::connect(&config.storage)
        .await
        .with_context(|| format!("Failed to initialize {} storage", config.storage.backend))?;
    let state = web::Data::new(PostsState::new(repository, config.storage.page_size));

    let max_form_bytes = config.app.max_form_bytes;
    let bind_address = (config.app.host.clone(), config.app.port);
    info!("Listening on http://{}:{}", bind_address.0, bind_address.1);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
            // After `configure` so it replaces the default form limit
            .app_data(handlers::form_config(max_form_bytes))
    })
    .bind(bind_address)
    .context("Failed to bind HTTP listener")?
    .run();

    let server_handle = server.handle();

    tokio::select! {
        result = server => {
            result.context("HTTP server terminated with error")?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, draining connections");
            server_handle.stop(true).await;
        }
    }

    info!("posts-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    }
}
