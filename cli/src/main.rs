//! JustDreams booking service, headless server
//!
//! ```sh
//! # Default config (~/.config/justdreams-booking/config.toml)
//! booking-service
//!
//! # Custom config path
//! booking-service --config /etc/justdreams/config.toml
//!
//! # Override the port
//! booking-service --api-port 9090
//!
//! # Validate config without starting
//! booking-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use justdreams_booking::config::{AppConfig, CONFIG_ENV};
use justdreams_booking::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "booking-service",
    version,
    about = "JustDreams hotel booking service",
    long_about = "REST API for hotel availability, reservations and payment confirmation.\n\n\
                  Default config: ~/.config/justdreams-booking/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(justdreams_booking::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        if let Err(e) = &loaded {
            eprintln!("❌ {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    }
    let (mut config, load_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(port) = cli.api_port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    if cli.check {
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.host, config.server.port);
        println!("   Database    : {}", config.database.url);
        println!(
            "   Payments    : {}",
            if config.payment.is_offline() {
                "offline"
            } else {
                "stripe"
            }
        );
        println!(
            "   Reaper      : every {}s, pending timeout {}h",
            config.reaper.interval_secs, config.reaper.pending_timeout_hours
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
