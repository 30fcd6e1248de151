//! MCP Server Entry Point
//!
//! Initializes logging, loads and validates configuration, and serves the
//! tool catalogue over the configured transport. Any startup or transport
//! error is logged and ends the process with status 1.

use anyhow::{Context, Result};
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use toolhub_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_logging(&config.logging.level, config.logging.with_timestamps);
    install_panic_hook();

    if let Err(e) = run(config).await {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    config.validate().context("invalid configuration")?;

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = McpServer::new(config.clone());
    info!(
        "Server initialized with {} tool(s)",
        server.bootstrap_report().registered.len()
    );

    let transport = TransportService::new(config.transport);
    let result = transport.run(server.clone()).await;

    info!("Server shutting down");
    server.shutdown();

    result.context("transport failed")
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence over `MCP_LOG_LEVEL`. Output goes to stderr so
/// the STDIO transport keeps stdout for protocol messages.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}

/// Route panics through `tracing`, then hand over to the default hook.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        error!(panic.location = %location, "Panic: {}", info);
        default_hook(info);
    }));
}
