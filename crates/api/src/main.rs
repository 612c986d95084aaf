use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use sweetshop_api::{app, bootstrap, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    sweetshop_observability::init(config.log_format);
    config.log_warnings();

    let services = app::build_services(&config).await?;

    if let Some(admin) = &config.admin {
        bootstrap::ensure_admin(&services.auth, admin, Utc::now())
            .await
            .context("admin bootstrap failed")?;
    }
    if config.seed_demo_data {
        bootstrap::seed_demo_sweets(&services.catalog, Utc::now())
            .await
            .context("demo seeding failed")?;
    }

    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, app_name = %config.app_name, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
