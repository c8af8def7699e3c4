//! Thin entry point for the naming node: CLI parsing and config loading are
//! out of scope for the protocol core (`spec.md` §1) but a complete repo
//! still ships them.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use filestack::config::NamingConfig;
use filestack::naming::NamingService;

/// Runs the naming node: the authoritative directory tree and storage
/// registry.
#[derive(Parser, Debug)]
#[command(name = "naming_node")]
struct Cli {
    /// Path to a TOML config file. Missing fields fall back to loopback
    /// defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the client-interface bind address (`host:port`).
    #[arg(long)]
    service_addr: Option<std::net::SocketAddr>,

    /// Overrides the registration-interface bind address (`host:port`).
    #[arg(long)]
    registration_addr: Option<std::net::SocketAddr>,
}

fn load_config(cli: &Cli) -> Result<NamingConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            toml::from_str(&text)?
        }
        None => NamingConfig::default(),
    };
    if let Some(addr) = cli.service_addr {
        config.bind_addr = addr.ip();
        config.service_port = addr.port();
    }
    if let Some(addr) = cli.registration_addr {
        config.registration_port = addr.port();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let service = NamingService::start(config.service_addr(), config.registration_addr()).await?;
    tracing::info!(
        client_addr = %service.client_addr(),
        registration_addr = %service.registration_addr(),
        "naming node listening"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    service.stop().await;
    Ok(())
}
