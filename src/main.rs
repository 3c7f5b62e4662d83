//! Maintenance CLI for a popstore database
//!
//! Subcommands:
//! - `inspect`: print how many records of each kind are stored
//! - `sweep`: drop expired inflight messages once, or repeatedly with `--watch`
//!   (configured interval) or `--every <secs>`

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use popstore::config::{DEFAULT_CONFIG_FILE, Settings, load_config_from};
use popstore::persistence::{RecordKind, SledStore, Store, StoreOptions, Sweeper};
use popstore::utils::logging;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "popstore")]
struct Cli {
    /// Config file to read (extension optional)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print record counts per kind and the stored server version
    Inspect,
    /// Delete inflight messages older than the configured TTL
    Sweep {
        /// Keep sweeping on `broker.sweep_interval_secs` until Ctrl-C
        #[arg(long)]
        watch: bool,
        /// Keep sweeping on this interval (seconds) instead of the configured one
        #[arg(long)]
        every: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match load_config_from(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = logging::init(&settings.log.level) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(cli.command, settings).await {
        error!("popstore failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(SledStore::new(StoreOptions::from(&settings.store)));
    store.open().inspect_err(|e| {
        if e.is_open_error() {
            error!(path = %store.path().display(), "cannot get exclusive access to the store");
        }
    })?;
    let sweeper = Sweeper::new(settings.broker.inflight_ttl_secs);

    let outcome = match command {
        Command::Inspect => inspect(store.as_ref()),
        Command::Sweep { watch: false, every: None } => {
            let removed = sweeper.run_now(store.as_ref())?;
            info!(removed, "sweep finished");
            Ok(())
        }
        Command::Sweep { every, .. } => {
            let interval = settings.broker.sweep_interval(every);
            sweep_loop(store.clone(), sweeper, interval).await
        }
    };

    store.close()?;
    outcome
}

fn inspect(store: &dyn Store) -> Result<(), Box<dyn std::error::Error>> {
    let info = store.read_server_info()?;
    let version = if info.info.version.is_empty() {
        "-"
    } else {
        info.info.version.as_str()
    };
    println!("server version: {version}");

    for kind in RecordKind::ALL {
        let count = store.find_by_kind(kind)?.len();
        println!("{kind:<14}{count}");
    }
    Ok(())
}

async fn sweep_loop(
    store: Arc<SledStore>,
    sweeper: Sweeper,
    every: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(ttl = sweeper.inflight_ttl(), every = ?every, "sweeping inflight messages");
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let store = store.clone();
                match tokio::task::spawn_blocking(move || sweeper.run_now(store.as_ref())).await? {
                    Ok(removed) => info!(removed, "sweep finished"),
                    // deletes are idempotent; the next tick retries what was left
                    Err(e) => warn!("sweep failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                return Ok(());
            }
        }
    }
}
