//! Thin entry point for a storage node: CLI parsing and config loading are
//! out of scope for the protocol core (`spec.md` §1) but a complete repo
//! still ships them.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use filestack::config::StorageConfig;
use filestack::storage::StorageService;

/// Runs a storage node: a local root directory, registered with a naming
/// node on startup.
#[derive(Parser, Debug)]
#[command(name = "storage_node")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the config file's `root`.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Overrides the naming node's registration address (`host:port`).
    #[arg(long)]
    naming_registration_addr: Option<std::net::SocketAddr>,
}

fn load_config(cli: &Cli) -> Result<StorageConfig, Box<dyn Error>> {
    let mut config: StorageConfig = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            toml::from_str(&text)?
        }
        None => {
            let root = cli.root.clone().ok_or("--root or --config with `root` is required")?;
            let naming_registration_addr = cli
                .naming_registration_addr
                .ok_or("--naming-registration-addr or --config with `naming_registration_addr` is required")?;
            StorageConfig { root, bind_addr: [127, 0, 0, 1].into(), data_port: 0, control_port: 0, naming_registration_addr }
        }
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(addr) = cli.naming_registration_addr {
        config.naming_registration_addr = addr;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let service = StorageService::start(
        config.root.clone(),
        config.data_bind_addr(),
        config.control_bind_addr(),
        config.naming_registration_addr,
    )
    .await?;
    tracing::info!(
        root = %config.root.display(),
        data_addr = %service.data_addr(),
        control_addr = %service.control_addr(),
        "storage node registered and listening"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    service.stop().await;
    Ok(())
}
