// # ddns-bridged - DDNS Bridge Daemon
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add validation or registrar protocol logic here
// - Request handling lives in ddns-bridge-core, protocols in the registrar crates
//
// The ddns-bridged daemon is responsible for:
// 1. Loading and validating configuration
// 2. Initializing logging and the runtime
// 3. Building the registrar registry from the compiled-in registrars
// 4. Serving the update and status endpoints until SIGINT/SIGTERM
//
// ## Configuration
//
// Configuration is read from the first of:
// - `--config PATH` or `DDNS_BRIDGE_CONFIG`
// - `/data/options.json`
// - `./config.toml`
//
// Credentials can be supplied through the environment instead of the file:
// - `DDNS_BRIDGE_CLOUDFLARE_API_KEY`, `DDNS_BRIDGE_CLOUDFLARE_ZONE_ID`
// - `DDNS_BRIDGE_GANDI_API_KEY`
// - `DDNS_BRIDGE_PORKBUN_API_KEY`, `DDNS_BRIDGE_PORKBUN_API_SECRET_KEY`
//
// ## Example
//
// ```bash
// export DDNS_BRIDGE_CLOUDFLARE_API_KEY=your_token
// ddns-bridged --config /etc/ddns-bridge/config.toml --port 9595
//
// curl 'http://localhost:9595/api/update?domain=example.com&subdomain=home,@&ip=203.0.113.7&registrar=cloudflare'
// ```

mod config;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use ddns_bridge_core::{
    BridgeConfig, HttpTransport, RegistrarFactory, RegistrarRegistry, ReqwestTransport,
    UpdateHandler,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum BridgeExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<BridgeExitCode> for ExitCode {
    fn from(code: BridgeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Dynamic DNS update bridge
#[derive(Debug, Parser)]
#[command(name = "ddns-bridged", version, about)]
struct Args {
    /// Path to the configuration file (.toml or .json)
    #[arg(short, long, env = "DDNS_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port, overrides `api.port`
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match config::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return BridgeExitCode::ConfigError.into();
        }
    };

    if let Some(port) = args.port {
        config.api.port = port;
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BridgeExitCode::ConfigError.into();
    }

    info!("Starting ddns-bridged");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BridgeExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let handler = match build_handler(&config) {
            Ok(handler) => handler,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return BridgeExitCode::ConfigError;
            }
        };

        if let Err(e) = run_server(&config, handler).await {
            error!("Daemon error: {:#}", e);
            BridgeExitCode::RuntimeError
        } else {
            BridgeExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Install the global tracing subscriber
fn init_tracing(config: &BridgeConfig) -> Result<()> {
    let log_level = config
        .api
        .log_level
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    let builder = FmtSubscriber::builder().with_max_level(log_level);

    if config.api.pretty_log {
        tracing::subscriber::set_global_default(builder.pretty().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}

/// Registrar factories compiled into this build
#[allow(unused_mut)]
fn factories() -> Vec<Box<dyn RegistrarFactory>> {
    let mut factories: Vec<Box<dyn RegistrarFactory>> = Vec::new();

    #[cfg(feature = "cloudflare")]
    factories.push(Box::new(ddns_registrar_cloudflare::CloudflareFactory));

    #[cfg(feature = "gandi")]
    factories.push(Box::new(ddns_registrar_gandi::GandiFactory));

    #[cfg(feature = "porkbun")]
    factories.push(Box::new(ddns_registrar_porkbun::PorkbunFactory));

    factories
}

/// Build the transport, the registry and the update handler
fn build_handler(config: &BridgeConfig) -> Result<Arc<UpdateHandler>> {
    let transport = match config.api.upstream_timeout_secs {
        Some(secs) => ReqwestTransport::with_timeout(Duration::from_secs(secs))
            .context("Failed to build HTTP client")?,
        None => ReqwestTransport::new(),
    };
    let transport: Arc<dyn HttpTransport> = Arc::new(transport);

    let registry = RegistrarRegistry::from_config(config, &factories(), transport)
        .context("Failed to set up registrars")?;

    info!("Active registrars: {}", registry.list_active().join(", "));

    Ok(Arc::new(UpdateHandler::new(Arc::new(registry))))
}

/// Serve the API until a shutdown signal arrives
async fn run_server(config: &BridgeConfig, handler: Arc<UpdateHandler>) -> Result<()> {
    let shutdown = shutdown_signal()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting server on {}", addr);

    axum::serve(
        listener,
        server::router(handler, config.api.enable_status_log),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("Server error")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Resolve once SIGTERM or SIGINT is received
///
/// Signal handlers are installed before the future is returned.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", received);
    })
}

/// Resolve once CTRL-C is received
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["ddns-bridged", "--config", "/tmp/a.toml", "-p", "8080"])
            .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/a.toml")));
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Args::try_parse_from(["ddns-bridged", "--port", "0"]).is_err());
    }

    #[test]
    #[cfg(all(feature = "cloudflare", feature = "gandi", feature = "porkbun"))]
    fn test_all_registrars_compiled_by_default() {
        let names: Vec<&str> = factories().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["cloudflare", "gandi", "porkbun"]);
    }

    #[test]
    fn test_no_enabled_registrar_is_startup_error() {
        let err = build_handler(&BridgeConfig::default()).err().unwrap();
        assert!(format!("{:#}", err).contains("No registrars enabled"));
    }

    #[test]
    #[cfg(feature = "gandi")]
    fn test_enabled_registrar_without_credentials_is_startup_error() {
        let mut config = BridgeConfig::default();
        config.gandi.enabled = true;

        let err = build_handler(&config).err().unwrap();
        assert!(format!("{:#}", err).contains("missing config param"));
    }
}
