//! Sentiment model abstraction and implementations.
//!
//! The model itself is an external service; implementations only turn review
//! text into a [`Rating`].

pub mod http;
pub mod mock;

use crate::config::{ModelConfig, ModelProvider};
use crate::models::Rating;
use async_trait::async_trait;
use serde::Deserialize;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpSentimentModel;
pub use mock::MockSentimentModel;

/// Error type for model calls.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::NotConfigured(_) => "not_configured",
            ModelError::Unavailable(_) => "unavailable",
            ModelError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// A text classifier producing a 1..=5 star rating.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<Rating, ModelError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ModelError>;
}

/// Build the configured model.
pub fn from_config(config: &ModelConfig) -> Result<Arc<dyn SentimentModel>, ModelError> {
    match config.provider {
        ModelProvider::Http => {
            let model = HttpSentimentModel::new(config)?;
            tracing::info!(endpoint = %model.endpoint(), "Using remote sentiment model");
            Ok(Arc::new(model))
        }
        ModelProvider::Mock => {
            tracing::warn!("Using keyword mock sentiment model");
            Ok(Arc::new(MockSentimentModel::keyword()))
        }
    }
}

/// One class and its score, as returned by text-classification endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Hosted inference returns `[[{label, score}, ..]]`; self-hosted servers
/// return the inner list directly.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

impl Prediction {
    /// Pick the highest scoring class and map it to a rating.
    pub fn into_rating(self) -> Result<Rating, ModelError> {
        let candidates = match self {
            Prediction::Flat(candidates) => candidates,
            Prediction::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
        };

        let best = candidates
            .into_iter()
            .filter(|c| c.score.is_finite())
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| ModelError::InvalidResponse("no scored labels".to_string()))?;

        parse_label(&best.label)
    }
}

/// Map a class label to a rating.
///
/// Accepts `"4 stars"` / `"1 star"`, zero-based `"LABEL_3"`, and bare `"4"`.
pub fn parse_label(label: &str) -> Result<Rating, ModelError> {
    let normalized = label.trim().to_ascii_lowercase();
    let invalid = || ModelError::InvalidResponse(format!("unrecognized label '{}'", label));

    if let Some(index) = normalized.strip_prefix("label_") {
        let index: usize = index.parse().map_err(|_| invalid())?;
        return Rating::from_class_index(index).ok_or_else(invalid);
    }

    let digits = normalized
        .strip_suffix("stars")
        .or_else(|| normalized.strip_suffix("star"))
        .unwrap_or(&normalized)
        .trim();

    let value: i64 = digits.parse().map_err(|_| invalid())?;
    Rating::try_from(value).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> Vec<LabelScore> {
        pairs
            .iter()
            .map(|(label, score)| LabelScore {
                label: label.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn parses_star_labels() {
        assert_eq!(parse_label("1 star").unwrap().value(), 1);
        assert_eq!(parse_label("5 stars").unwrap().value(), 5);
        assert_eq!(parse_label(" 3 Stars ").unwrap().value(), 3);
    }

    #[test]
    fn parses_zero_based_class_labels() {
        assert_eq!(parse_label("LABEL_0").unwrap().value(), 1);
        assert_eq!(parse_label("label_4").unwrap().value(), 5);
        assert!(parse_label("LABEL_5").is_err());
    }

    #[test]
    fn parses_bare_digits() {
        assert_eq!(parse_label("2").unwrap().value(), 2);
        assert!(parse_label("0").is_err());
        assert!(parse_label("6 stars").is_err());
    }

    #[test]
    fn rejects_sentiment_words() {
        let err = parse_label("POSITIVE").unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[test]
    fn picks_highest_score() {
        let prediction = Prediction::Flat(scores(&[
            ("1 star", 0.05),
            ("4 stars", 0.61),
            ("5 stars", 0.30),
        ]));
        assert_eq!(prediction.into_rating().unwrap().value(), 4);
    }

    #[test]
    fn nested_prediction_uses_first_batch() {
        let json = r#"[[{"label":"2 stars","score":0.9},{"label":"3 stars","score":0.1}]]"#;
        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(prediction.into_rating().unwrap().value(), 2);
    }

    #[test]
    fn flat_prediction_deserializes() {
        let json = r#"[{"label":"LABEL_2","score":0.7},{"label":"LABEL_1","score":0.3}]"#;
        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(prediction.into_rating().unwrap().value(), 3);
    }

    #[test]
    fn empty_prediction_is_invalid() {
        assert!(Prediction::Flat(Vec::new()).into_rating().is_err());
        assert!(Prediction::Nested(Vec::new()).into_rating().is_err());
    }

    #[test]
    fn unavailable_maps_to_service_unavailable() {
        let err: AppError = ModelError::Unavailable("timeout".to_string()).into();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));

        let err: AppError = ModelError::InvalidResponse("garbage".to_string()).into();
        assert!(matches!(err, AppError::BadGateway(_)));
    }
}
