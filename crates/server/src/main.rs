use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcriber_core::{
    load_config, validate_config, CommandRunner, JsonSettingsStore, LogFormat, ProcessRunner,
    SettingsProvider, Transcriber, TranscriberOptions,
};

use transcriber_server::api::create_router;
use transcriber_server::metrics;
use transcriber_server::state::AppState;

/// How long shutdown waits for a cancelled job to wind down
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("TRANSCRIBER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration before logging so the format can be chosen
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            return Err(e).with_context(|| format!("Failed to load config from {:?}", config_path));
        }
    };

    init_tracing(config.logging.format);
    info!("Loaded configuration from {:?}", config_path);

    validate_config(&config).context("Configuration validation failed")?;

    info!(
        ffmpeg = %config.tools.ffmpeg_path,
        whisper = %config.tools.whisper_path,
        "External tools configured"
    );

    let settings_path = config.settings.resolved_path();
    info!("Settings file: {:?}", settings_path);
    let settings: Arc<dyn SettingsProvider> = Arc::new(JsonSettingsStore::new(settings_path));
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());

    let transcriber = Transcriber::new(TranscriberOptions::from(&config), runner, settings);

    // Force registry initialization so startup fails loudly on duplicates
    once_cell::sync::Lazy::force(&metrics::REGISTRY);

    let state = Arc::new(AppState::new(config.clone(), transcriber.clone()));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    transcriber.shutdown(SHUTDOWN_GRACE).await;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
