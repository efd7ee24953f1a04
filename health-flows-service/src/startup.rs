//! Application startup and lifecycle management.

use crate::config::{FlowsConfig, HttpConfig, ProviderKind};
use crate::flows::prompt::PromptRenderer;
use crate::flows::FlowRunner;
use crate::handlers::{flows, health, metrics};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::TextProvider;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub runner: FlowRunner,
}

impl AppState {
    pub fn new(provider: Arc<dyn TextProvider>, temperature: Option<f32>) -> Result<Self, AppError> {
        let renderer = PromptRenderer::new().map_err(|e| {
            tracing::error!(error = %e, "Failed to compile prompt templates");
            AppError::InternalError(anyhow::Error::new(e))
        })?;

        Ok(Self {
            runner: FlowRunner::new(provider, Arc::new(renderer)).with_temperature(temperature),
        })
    }
}

/// Instantiate the configured model provider.
pub fn build_provider(config: &FlowsConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.models.provider {
        ProviderKind::Gemini => {
            let gemini_config = GeminiConfig {
                api_key: config.google.api_key.clone(),
                model: config.models.text_model.clone(),
                api_base: config.google.api_base.clone(),
                timeout: Duration::from_secs(config.google.timeout_secs),
            };
            let provider = GeminiTextProvider::new(gemini_config)
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

            tracing::info!(
                model = %config.models.text_model,
                "Initialized Gemini text provider"
            );
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using the mock text provider; replies are canned");
            Ok(Arc::new(MockTextProvider::new(true)))
        }
    }
}

pub fn build_router(state: AppState, http: &HttpConfig) -> Router {
    let api = Router::new()
        .route("/symptom-analysis", post(flows::symptom_analysis))
        .route("/extract-health-data", post(flows::extract_health_data))
        .route("/analyze-health-data", post(flows::analyze_health_data))
        .route("/analyze-report", post(flows::analyze_report_handler))
        .route("/xray-analysis", post(flows::xray_analysis))
        .route("/find-doctors", post(flows::find_doctors))
        .route("/app-guide-chat", post(flows::app_guide_chat));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(metrics::metrics))
        .nest("/api/v1/flows", api)
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(http.allowed_origin.as_deref()))
        .with_state(state)
}

/// CORS for the front end. Without a configured origin any origin may call.
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    match allowed_origin.map(|o| o.parse::<HeaderValue>()) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::error!(error = %e, "Invalid FLOWS_ALLOWED_ORIGIN; allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FlowsConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build with an explicit provider (port 0 = random port for testing).
    pub async fn build_with_provider(
        config: FlowsConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(provider, config.models.temperature)?;
        let router = build_router(state, &config.http);

        let addr: SocketAddr = config.common.bind_address().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid bind address {}: {}",
                config.common.bind_address(),
                e
            ))
        })?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Health flows service listening");

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
