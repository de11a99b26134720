//! Application startup and lifecycle management.

use crate::config::{CorsConfig, SentimentConfig};
use crate::handlers;
use crate::services::providers::{self, SentimentModel};
use crate::services::{init_metrics, Database};
use axum::body::Body;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{make_http_span, request_id_middleware},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub model: Arc<dyn SentimentModel>,
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/result", post(handlers::reviews::score_review))
        .route("/history", get(handlers::reviews::list_history))
        .route("/delete/:id", delete(handlers::reviews::delete_review))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_http_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the listed ones.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, AppError> {
    if config.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: Database,
}

impl Application {
    /// Build the application with the model named in `config`.
    pub async fn build(config: SentimentConfig) -> Result<Self, AppError> {
        let model = providers::from_config(&config.model).map_err(|e| {
            tracing::error!("Failed to initialize sentiment model: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;

        Self::build_with_model(config, model).await
    }

    /// Build the application around an already constructed model.
    pub async fn build_with_model(
        config: SentimentConfig,
        model: Arc<dyn SentimentModel>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(&config.database).await.map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;

        // The model may come up after us; scoring reports 503 until it does.
        match model.health_check().await {
            Ok(()) => tracing::info!(model = model.name(), "Sentiment model ready"),
            Err(e) => tracing::warn!(model = model.name(), "Sentiment model not reachable: {}", e),
        }

        let state = AppState {
            db: db.clone(),
            model,
        };
        let router = router(state, cors_layer(&config.cors)?);

        // port 0 = random port for testing
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Sentiment service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_origin_list_is_permissive() {
        assert!(cors_layer(&CorsConfig::default()).is_ok());
    }

    #[test]
    fn invalid_origin_is_a_config_error() {
        let config = CorsConfig {
            allowed_origins: vec!["http://bad\norigin".to_string()],
        };
        assert!(matches!(
            cors_layer(&config),
            Err(AppError::ConfigError(_))
        ));
    }
}
