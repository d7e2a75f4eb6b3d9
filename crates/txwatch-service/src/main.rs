use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use txwatch_config::ConfigLoader;
use txwatch_core::TransactionTracker;
use txwatch_notify::{create_notifier, ChannelNotifier, CompositeNotifier, NotifierInterface};
use txwatch_types::{NotificationKind, TxwatchConfig};

#[derive(Parser)]
#[command(name = "txwatch")]
#[command(about = "Tracks submitted Flow transactions until they are sealed", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/txwatch.toml")]
	config: PathBuf,

	#[arg(long, env = "TXWATCH_LOG_LEVEL", default_value = "info")]
	log_level: String,

	#[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
	log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
	Pretty,
	Json,
}

#[derive(Subcommand)]
enum Commands {
	/// Resume persisted transactions and keep polling until interrupted
	Start,
	/// Track one transaction and exit once it is resolved
	Watch {
		/// Transaction id returned by the ledger on submission
		transaction_id: String,
		#[arg(long, default_value = "Transaction submitted")]
		start_text: String,
		#[arg(long, default_value = "Transaction sealed")]
		success_text: String,
		#[arg(long, default_value = "Transaction failed")]
		error_text: String,
	},
	/// List transactions persisted as in flight
	Pending,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level, cli.log_format)?;

	let config = load_config(&cli).await?;

	match cli.command {
		Some(Commands::Start) | None => start_service(config).await,
		Some(Commands::Watch {
			transaction_id,
			start_text,
			success_text,
			error_text,
		}) => watch(config, &transaction_id, &start_text, &success_text, &error_text).await,
		Some(Commands::Pending) => list_pending(config).await,
		Some(Commands::Validate) => {
			info!("Configuration is valid");
			info!("Access node: {:?}", config.ledger.access_node_url());
			info!("Storage: {:?} at {:?}", config.storage.backend, config.storage.path);
			info!("Poll interval: {}ms", config.tracker.poll_interval_ms);
			Ok(())
		}
	}
}

async fn load_config(cli: &Cli) -> Result<TxwatchConfig> {
	info!("Loading configuration from: {:?}", cli.config);
	ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")
}

fn build_tracker(
	config: &TxwatchConfig,
	notifier: Arc<dyn NotifierInterface>,
) -> Result<TransactionTracker> {
	let storage = Arc::new(txwatch_storage::create_storage(&config.storage));
	let ledger =
		txwatch_ledger::create_ledger(&config.ledger).context("Failed to create ledger client")?;

	TransactionTracker::builder()
		.with_storage(storage)
		.with_ledger(ledger)
		.with_notifier(notifier)
		.with_config(config.tracker.clone())
		.build()
		.context("Failed to build transaction tracker")
}

async fn start_service(config: TxwatchConfig) -> Result<()> {
	info!("Starting txwatch");

	let tracker = build_tracker(&config, create_notifier(&config.notifications))?;
	tracker.resume_all().await;

	info!("txwatch started");
	setup_shutdown_signal().await;

	info!("Shutdown signal received, stopping poll tasks...");
	tracker.shutdown();
	info!("txwatch stopped");
	Ok(())
}

async fn watch(
	config: TxwatchConfig,
	transaction_id: &str,
	start_text: &str,
	success_text: &str,
	error_text: &str,
) -> Result<()> {
	let (channel, mut notifications) = ChannelNotifier::new();
	let notifier = CompositeNotifier::new()
		.with_sink(create_notifier(&config.notifications))
		.with_sink(Arc::new(channel));

	let tracker = build_tracker(&config, Arc::new(notifier))?;
	tracker.resume_all().await;
	tracker
		.register(transaction_id, start_text, success_text, error_text, true)
		.await?;

	let outcome = tokio::select! {
		outcome = async {
			while let Some(notification) = notifications.recv().await {
				if notification.transaction_id == transaction_id.trim() && notification.is_terminal() {
					return Some(notification.kind);
				}
			}
			None
		} => outcome,
		_ = setup_shutdown_signal() => None,
	};

	tracker.shutdown();

	match outcome {
		Some(NotificationKind::Success) => Ok(()),
		Some(_) => bail!("Transaction {} failed", transaction_id),
		None => bail!("Stopped before transaction {} resolved", transaction_id),
	}
}

async fn list_pending(config: TxwatchConfig) -> Result<()> {
	let tracker = build_tracker(&config, create_notifier(&config.notifications))?;
	let pending = tracker
		.pending_ids()
		.await
		.context("Failed to read persisted transactions")?;

	if pending.is_empty() {
		println!("No pending transactions");
	}
	for id in pending {
		println!("{}", id);
	}
	Ok(())
}

fn setup_tracing(log_level: &str, format: LogFormat) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	let registry = tracing_subscriber::registry().with(env_filter);
	let result = match format {
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init(),
	};
	result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
				tracing::error!("Failed to install SIGTERM handler: {}", e);
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
