//! Guest Auth Gateway - Main Server

use anyhow::Result;
use clap::{Parser, Subcommand};
use guest_auth::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "guest-auth")]
#[command(about = "Guest session gateway")]
struct Cli {
    /// Path to the YAML config file (defaults to ./config.yaml)
    #[arg(short, long, env = "GUEST_AUTH_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to listen on (overrides config.yaml / SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Development mode: session cookies without the Secure flag
        #[arg(long)]
        dev: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,guest_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, dev } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            if dev {
                config.auth.dev_mode = true;
            }
            guest_auth::start_server(config).await
        }
    }
}
