// # upsertd - caller-address DNS upsert daemon
//
// This is a thin integration layer only. All workflow logic lives in
// upsert-core; the daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and building the configured one
// 4. Serving HTTP until SIGINT/SIGTERM
//
// ## Configuration
//
// ### Target
// - `DDNS_ZONE_ID`: Hosted zone id (required)
// - `DDNS_HOSTNAME`: FQDN whose A record is kept current (required)
//
// ### DNS Provider
// - `DDNS_PROVIDER_TYPE`: Provider type (route53)
// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: Credentials (required)
// - `AWS_SESSION_TOKEN`: Session token for temporary credentials
// - `DDNS_ROUTE53_ENDPOINT`: API endpoint override
// - `DDNS_MODE=dry-run`: Sign and log changes without sending them
//
// ### Front end
// - `DDNS_ADDRESS_POLICY`: trust (default) or require-ipv4
// - `DDNS_TRUST_FORWARDED`: Use X-Forwarded-For / X-Real-IP (default true)
// - `DDNS_LISTEN_ADDR`: Listen address (default 0.0.0.0:8080)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export DDNS_ZONE_ID=Z1N0R6CQ9D3SXO
// export DDNS_HOSTNAME=home.example.org
// export AWS_ACCESS_KEY_ID=...
// export AWS_SECRET_ACCESS_KEY=...
//
// upsertd
// curl http://localhost:8080/
// ```

mod config;
mod server;

use anyhow::{Context, Result};
use config::Config;
use server::AppState;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;
use upsert_core::{ProviderRegistry, UpdateWorkflow};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting upsertd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    })
    .into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "route53")]
    {
        info!("Registering Route 53 provider");
        upsert_provider_route53::register(&registry);
    }

    let updater = config.updater_config()?;
    let provider = registry
        .create_provider(&updater.provider)
        .context("failed to create DNS provider")?;

    info!(
        "Keeping {} current in zone {} via {}",
        updater.target.hostname,
        updater.target.zone_id,
        provider.provider_name()
    );

    let (workflow, mut events) = UpdateWorkflow::new(provider, updater.target, updater.workflow)?;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Workflow event: {:?}", event);
        }
    });

    let state = Arc::new(AppState {
        workflow,
        trust_forwarded: config.trust_forwarded()?,
    });
    let app = server::build_router(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown signal error: {}", e),
        }
    })
    .await
    .context("HTTP server failed")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(received)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
