#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use health_flows_service::config::{
    FlowsConfig, GoogleConfig, HttpConfig, ModelConfig, ObservabilityConfig, ProviderKind,
};
use health_flows_service::services::providers::gemini::GEMINI_API_BASE;
use health_flows_service::services::providers::mock::{MockReply, MockTextProvider};
use health_flows_service::services::providers::{ModelRequest, TextProvider};
use health_flows_service::startup::{build_router, AppState, Application};
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_BODY_LIMIT: usize = 64 * 1024;

pub fn test_config() -> FlowsConfig {
    FlowsConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        models: ModelConfig {
            provider: ProviderKind::Mock,
            text_model: "mock-model".to_string(),
            temperature: None,
        },
        google: GoogleConfig {
            api_key: String::new(),
            api_base: GEMINI_API_BASE.to_string(),
            timeout_secs: 5,
        },
        http: HttpConfig {
            max_body_bytes: TEST_BODY_LIMIT,
            allowed_origin: None,
        },
        observability: ObservabilityConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Router wired to a scripted provider, driven with `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockTextProvider>,
}

impl TestApp {
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self::with_provider(MockTextProvider::with_replies(replies))
    }

    pub fn with_provider(provider: MockTextProvider) -> Self {
        let provider = Arc::new(provider);
        let dyn_provider: Arc<dyn TextProvider> = provider.clone();
        let state = AppState::new(dyn_provider, None).expect("Failed to build state");
        let router = build_router(state, &test_config().http);
        Self { router, provider }
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: String) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.provider.requests()
    }
}

/// A real server on a random port, for tests that go over the network.
pub struct SpawnedApp {
    pub address: String,
}

impl SpawnedApp {
    pub async fn spawn(provider: MockTextProvider) -> Self {
        let application = Application::build_with_provider(test_config(), Arc::new(provider))
            .await
            .expect("Failed to build application");
        let address = format!("http://127.0.0.1:{}", application.port());
        tokio::spawn(application.run_until_stopped());
        Self { address }
    }
}

pub const PDF_DATA_URI: &str = "data:application/pdf;base64,JVBERi0xLjQKJcfs";
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";
