//! Console gateway.
//!
//! ```text
//!     Client Request
//!     ──────────▶ http server ──▶ dispatcher ──┬──▶ monitor  (long-poll on the state source)
//!                                              ├──▶ files    (static assets, weak ETags)
//!                                              └──▶ proxy    (backend services)
//! ```

use clap::Parser;
use std::path::PathBuf;

use console_gateway::config::{load_config, validation::route_warnings};
use console_gateway::lifecycle::startup;
use console_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "console-gateway", version)]
#[command(about = "HTTP ingress for the cluster management console", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    if cli.check {
        for warning in route_warnings(&config) {
            println!("warning: {warning}");
        }
        println!("{}: OK ({} routes)", cli.config.display(), config.routes.len());
        return Ok(());
    }

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        routes = config.routes.len(),
        "console-gateway starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
