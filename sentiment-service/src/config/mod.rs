use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// Hosted inference endpoint for the 5-class review sentiment model.
const DEFAULT_MODEL_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/nlptown/bert-base-multilingual-uncased-sentiment";

const DEFAULT_DATABASE_URL: &str = "sqlite://rating.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct SentimentConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Http,
    Mock,
}

impl FromStr for ModelProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ModelProvider::Http),
            "mock" => Ok(ModelProvider::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown model provider '{}', expected 'http' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub endpoint: String,
    pub api_token: Option<Secret<String>>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl SentimentConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(SentimentConfig {
            common: common_config,
            service_name: "sentiment-service".to_string(),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: get_env("SENTIMENT_DATABASE_URL", Some(DEFAULT_DATABASE_URL), is_prod)?,
                max_connections: parse_env(
                    "SENTIMENT_DB_MAX_CONNECTIONS",
                    &get_env("SENTIMENT_DB_MAX_CONNECTIONS", Some("5"), false)?,
                )?,
            },
            model: ModelConfig {
                provider: get_env("SENTIMENT_MODEL_PROVIDER", Some("http"), false)?.parse()?,
                endpoint: get_env(
                    "SENTIMENT_MODEL_ENDPOINT",
                    Some(DEFAULT_MODEL_ENDPOINT),
                    is_prod,
                )?,
                api_token: env::var("SENTIMENT_MODEL_API_TOKEN")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(Secret::new),
                timeout_secs: parse_env(
                    "SENTIMENT_MODEL_TIMEOUT_SECS",
                    &get_env("SENTIMENT_MODEL_TIMEOUT_SECS", Some("30"), false)?,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: split_list(
                    &env::var("SENTIMENT_CORS_ORIGINS").unwrap_or_default(),
                ),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: '{}'", key, raw))
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
