use health_flows_service::config::FlowsConfig;
use health_flows_service::services::metrics;
use health_flows_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = FlowsConfig::load()?;

    init_tracing(
        "health-flows-service",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    );

    metrics::init_metrics()?;

    tracing::info!(
        provider = ?config.models.provider,
        model = %config.models.text_model,
        "Starting health flows service"
    );

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        e
    })?;

    application.run_until_stopped().await?;
    Ok(())
}
