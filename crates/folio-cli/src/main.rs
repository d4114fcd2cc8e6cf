use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Scroll-aware section navigation for one-page portfolio sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/folio/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview a page in the terminal
    Run {
        /// Page layout (TOML)
        page: PathBuf,
    },
    /// Replay a scenario headlessly and print every section change
    Simulate {
        /// Page layout (TOML)
        page: PathBuf,
        /// Scenario steps (TOML)
        scenario: PathBuf,
        /// Drive frames from a timer in real time instead of a virtual clock
        #[arg(long)]
        realtime: bool,
        /// Frame length for virtual-clock replay
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
    },
    /// Print the section geometry and nav links of a page
    Sections {
        /// Page layout (TOML)
        page: PathBuf,
        /// Scroll to this position before measuring
        #[arg(long)]
        at: Option<f64>,
    },
    /// Print the effective configuration
    Config {
        /// Write the defaults to the configuration file if it does not exist
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // The terminal preview owns the screen, so it logs to a file
    let log_file = match cli.command {
        Commands::Run { .. } => Some(config.log_path()),
        _ => None,
    };
    init_logging(&config, log_file.as_deref())?;

    match cli.command {
        Commands::Run { page } => commands::run::run(config, &page),
        Commands::Simulate {
            page,
            scenario,
            realtime,
            frame_ms,
        } => commands::simulate::run(&config, &page, &scenario, realtime, frame_ms).await,
        Commands::Sections { page, at } => commands::sections::run(&config, &page, at),
        Commands::Config { init } => commands::config::run(&config, init),
    }
}

/// Install the global subscriber; `RUST_LOG` overrides `general.log_level`
fn init_logging(config: &AppConfig, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}
