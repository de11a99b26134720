//! Remote text-classification endpoint.
//!
//! Speaks the request shape shared by the Hugging Face Inference API and
//! Text Embeddings Inference `/predict`.

use super::{ModelError, Prediction, SentimentModel};
use crate::config::ModelConfig;
use crate::models::Rating;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use service_core::observability::inject_trace_context;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    /// Cut input to the model's max sequence length (512 tokens for BERT).
    truncate: bool,
}

pub struct HttpSentimentModel {
    endpoint: String,
    api_token: Option<Secret<String>>,
    client: Client,
}

impl HttpSentimentModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        if config.endpoint.trim().is_empty() {
            return Err(ModelError::NotConfigured(
                "model endpoint is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl SentimentModel for HttpSentimentModel {
    fn name(&self) -> &str {
        "http"
    }

    async fn classify(&self, text: &str) -> Result<Rating, ModelError> {
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);

        let mut request = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&PredictRequest {
                inputs: text,
                truncate: true,
            });

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            text_len = text.len(),
            "Sending text to sentiment model"
        );

        let response = request
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = format!("model endpoint returned {}: {}", status, error_text);

            return Err(if is_transient(status) {
                ModelError::Unavailable(message)
            } else {
                ModelError::InvalidResponse(message)
            });
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        prediction.into_rating()
    }

    /// Reachability only. The hosted API answers `GET` on a model URL with its
    /// metadata, so anything but a 5xx or 429 counts as healthy.
    async fn health_check(&self) -> Result<(), ModelError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        let status = response.status();
        if is_transient(status) {
            return Err(ModelError::Unavailable(format!(
                "model endpoint returned {}",
                status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelProvider;

    fn config(endpoint: &str) -> ModelConfig {
        ModelConfig {
            provider: ModelProvider::Http,
            endpoint: endpoint.to_string(),
            api_token: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn empty_endpoint_is_not_configured() {
        let err = HttpSentimentModel::new(&config("  ")).err().unwrap();
        assert!(matches!(err, ModelError::NotConfigured(_)));
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(PredictRequest {
            inputs: "nice",
            truncate: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "inputs": "nice", "truncate": true }));
    }
}
