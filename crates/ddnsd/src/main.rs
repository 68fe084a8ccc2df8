// # ddnsd - DDNS Daemon
//
// Thin integration layer over ddns-core. All reconciliation logic lives in
// the engine; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Builds the Cloudflare provider, the HTTP IP source and the file state store
// 4. Runs the engine until SIGINT/SIGTERM
//
// ## Configuration
//
// - `CLOUDFLARE_API_TOKEN`: API token with Zone:Read and DNS:Edit (required)
// - `DOMAIN`: Base domain, e.g. `home.net` (required)
// - `SUBDOMAIN`: Label to manage, `@` for the base domain (default: `ddns`)
// - `CHECK_INTERVAL`: Minutes between checks (default: 5)
// - `DDNS_STATE_PATH`: Last-confirmed IP file (default: `/data/current_ip.txt`)
// - `DDNS_IP_ECHO_URL`: Address-echo service (default: `https://api.ip.sb/ip`)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// export DOMAIN=home.net
// export SUBDOMAIN=ddns
// export CHECK_INTERVAL=5
//
// ddnsd
// ```

mod config;

use anyhow::{Context, Result};
use config::EnvConfig;
use ddns_core::{DdnsEngine, FileStateStore};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (including a zone that cannot be resolved)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match EnvConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    for warning in &config.warnings {
        warn!("{}", warning);
    }

    info!("Starting ddnsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the engine and drive it until a shutdown signal
async fn run_daemon(config: EnvConfig) -> DdnsExitCode {
    let engine = match build_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("Failed to install signal handlers: {:#}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    match engine.run_until(shutdown).await {
        Ok(()) => {
            info!("Shutting down daemon");
            DdnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

fn build_engine(config: EnvConfig) -> Result<DdnsEngine> {
    let ddns = config.ddns;

    info!("Managing record: {}", ddns.hostname());
    info!("IP echo service: {}", ddns.ip_echo_url);
    info!("State file: {}", ddns.state_path.display());

    let provider =
        CloudflareProvider::new(ddns.api_token.as_str()).context("Cloudflare provider")?;
    let ip_source = HttpIpSource::new(ddns.ip_echo_url.as_str()).context("IP source")?;
    let state_store = FileStateStore::new(&ddns.state_path);

    // Events are only consumed by tests and embedders; the receiver is dropped here
    let (engine, _events) = DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
        ddns,
    )?;

    Ok(engine)
}

/// Future that completes on SIGTERM or SIGINT
///
/// Handlers are installed on call; the returned future only waits.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Future that completes on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: Ctrl-C"),
            Err(e) => {
                error!("Failed to wait for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}
