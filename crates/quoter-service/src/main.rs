use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quoter_config::{Config, ConfigLoader};
use quoter_service::{builder, server};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sor-quoter")]
#[command(about = "Smart order router quote service", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "QUOTER_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the quote server
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level);

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn load_config(cli: &Cli) -> Result<Config> {
	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("Starting SOR quoter");

	let config = load_config(&cli).await?;
	info!("Quoter name: {}", config.quoter.name);
	info!("Chain provider: {}", config.chain.provider);
	info!("Router provider: {}", config.router.provider);

	let port = config.quoter.http_port;
	let engine = builder(config)
		.build()
		.context("Failed to build quote engine")?;

	server::start_server(Arc::new(engine), port, shutdown_signal())
		.await
		.context("HTTP server failed")?;

	info!("SOR quoter stopped");
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	let config = load_config(&cli).await?;
	let name = config.quoter.name.clone();

	// Constructing the engine runs every implementation's schema validation
	// without touching the network.
	builder(config)
		.build()
		.context("Invalid implementation configuration")?;

	info!("Configuration for {} is valid", name);
	Ok(())
}

fn setup_tracing(log_level: &str) {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to install Ctrl+C handler: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
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

	info!("Shutdown signal received, stopping server");
}
