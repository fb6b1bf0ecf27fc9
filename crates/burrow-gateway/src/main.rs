use anyhow::Context;
use burrow_gateway::{AppContext, Cli};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = burrow_telemetry::init(&cli.telemetry_config())
        .context("failed to initialize telemetry")?;

    let context = AppContext::init(&cli).await?;

    let listener = TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "starting gateway server");

    let served = axum::serve(listener, context.router())
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(err) = &served {
        error!(error = %err, "server stopped unexpectedly");
    }

    context.shutdown().await;
    info!("gateway stopped");
    telemetry.shutdown();

    served.context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
