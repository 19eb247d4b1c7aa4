//! PEP HTTP Server binary

use pep_core::PepConfig;
use pep_server::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let enable_otel = std::env::var("OTEL_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if enable_otel {
        pep_server::tracing::init_tracing_stack("pep-server")?;
        info!("OpenTelemetry tracing enabled");
    } else {
        pep_server::tracing::init_console()?;
        info!("Console logging enabled (set OTEL_ENABLED=true for OpenTelemetry)");
    }

    info!("Starting PEP server v{}", env!("CARGO_PKG_VERSION"));

    pep_server::metrics::init_prometheus()?;
    pep_server::metrics::init_metrics();

    let config = PepConfig::from_env()?;
    let addr = config.bind_addr();
    let state = AppState::from_config(config)?;

    info!(
        pdp = %state.pdp.endpoint(),
        failure_mode = ?state.config.failure_mode,
        "Authorization delegated to PDP"
    );

    let app = pep_server::app(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, shutting down gracefully...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    if enable_otel {
        info!("Flushing OpenTelemetry traces...");
        pep_server::tracing::shutdown_telemetry();
    }

    info!("Server shutdown complete");
    Ok(())
}
