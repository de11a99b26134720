use sentiment_service::config::SentimentConfig;
use sentiment_service::services::init_metrics;
use sentiment_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let config = SentimentConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start sentiment-service: {}", e);
        e
    })?;
    application.run_until_stopped().await?;

    Ok(())
}
