//! Common test utilities for sentiment-service integration tests.

#![allow(dead_code)]

use sentiment_service::config::{
    CorsConfig, DatabaseConfig, ModelConfig, ModelProvider, SentimentConfig,
};
use sentiment_service::models::Rating;
use sentiment_service::services::providers::{MockSentimentModel, SentimentModel};
use sentiment_service::services::Database;
use sentiment_service::startup::Application;
use service_core::config::Config as CommonConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,sentiment_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_config(model_endpoint: &str) -> SentimentConfig {
    SentimentConfig {
        common: CommonConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0, // Random port
        },
        service_name: "sentiment-service-test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        model: ModelConfig {
            provider: ModelProvider::Http,
            endpoint: model_endpoint.to_string(),
            api_token: None,
            timeout_secs: 5,
        },
        cors: CorsConfig::default(),
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Database,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn with a mock model that always answers `rating`.
    pub async fn spawn(rating: u8) -> Self {
        let rating = Rating::new(rating).expect("Test rating must be 1..=5");
        Self::spawn_with_model(Arc::new(MockSentimentModel::fixed(rating))).await
    }

    pub async fn spawn_with_model(model: Arc<dyn SentimentModel>) -> Self {
        init_tracing();

        let app = Application::build_with_model(test_config("http://127.0.0.1:9"), model)
            .await
            .expect("Failed to build test application");

        Self::start(app).await
    }

    /// Spawn with the real HTTP model pointed at `model_endpoint`.
    pub async fn spawn_with_endpoint(model_endpoint: &str) -> Self {
        init_tracing();

        let app = Application::build(test_config(model_endpoint))
            .await
            .expect("Failed to build test application");

        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            client,
        }
    }

    pub async fn post_result(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/result", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Score `text` and return the label, asserting success.
    pub async fn score(&self, text: &str) -> String {
        let response = self.post_result(serde_json::json!({ "text": text })).await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Label is not a JSON string")
    }

    pub async fn history(&self) -> Vec<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/history", self.address))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("History is not a JSON array")
    }

    pub async fn delete(&self, id: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/delete/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
