//! QuadBot GW - teleoperation gateway binary
//!
//! Wires the router, drivers, telemetry, and config hot-reload together
//! behind an interactive REPL.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quadbot_gw::cli;
use quadbot_gw::config::{watcher::ConfigWatcher, AppConfig};
use quadbot_gw::drivers::ConsoleDriver;
use quadbot_gw::haptics::{LogHaptics, NoopHaptics, SharedHaptics};
use quadbot_gw::router::Router;
use quadbot_gw::telemetry::TelemetrySimulator;

/// QuadBot Gateway - drive the QUADBOT-X1 from pointer/touch surfaces
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "QUADBOT_CONFIG", default_value = "gateway.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Validate the configuration file and exit
    #[arg(long)]
    check: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting QuadBot gateway...");
    info!("Configuration file: {}", args.config);

    if args.check {
        let config = AppConfig::load(&args.config).await?;
        println!("config OK: {} (vehicle: {})", args.config, config.vehicle.name);
        return Ok(());
    }

    if args.dump_config {
        let config = load_or_default(&args.config).await?;
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    // Load configuration, with hot reload when the file exists
    let (config_watcher, config) = if Path::new(&args.config).exists() {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        info!("Configuration loaded with hot-reload enabled");
        (Some(watcher), config)
    } else {
        warn!(
            "config file {} not found, running with defaults",
            args.config
        );
        (None, AppConfig::default())
    };

    let haptics: SharedHaptics = if config.haptics.enabled {
        Arc::new(LogHaptics)
    } else {
        Arc::new(NoopHaptics)
    };

    let router = Router::new(config.clone(), haptics);
    info!("Router initialized");

    router
        .register_driver("console".to_string(), Arc::new(ConsoleDriver::new("console")))
        .await?;
    router
        .register_driver("vehicle".to_string(), router.link())
        .await?;
    info!("All drivers registered and initialized");

    let telemetry = TelemetrySimulator::new(router.store(), config.telemetry.seed);
    let telemetry_task = telemetry.spawn(config.telemetry.interval());

    // Apply config file changes while the REPL runs
    let reload_task = config_watcher.map(|mut watcher| {
        let router = router.clone();
        tokio::spawn(async move {
            while let Some(new_config) = watcher.next_config().await {
                match router.update_config(new_config).await {
                    Ok(()) => info!("Configuration reloaded"),
                    Err(e) => warn!("Failed to apply reloaded config: {e:#}"),
                }
            }
        })
    });

    cli::run_repl(router.clone()).await?;

    info!("Shutting down...");
    telemetry_task.abort();
    if let Some(task) = reload_task {
        task.abort();
    }
    router.shutdown_all_drivers().await?;
    info!("QuadBot gateway shutdown complete");
    Ok(())
}

async fn load_or_default(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        AppConfig::load(path).await
    } else {
        Ok(AppConfig::default())
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}
