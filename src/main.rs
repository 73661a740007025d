mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    database::Database,
    http_server::app::HttpServerConfig,
    logging::setup_logging,
    services::sample_data::{clear_all, seed},
};

const DEFAULT_PORT: u16 = 5000;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "FYYUR_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level (default: off)
    #[arg(long, default_value = "off", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "FYYUR_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP server
    Serve {
        /// The port to run the server on (default: config file, then 5000)
        #[arg(short, long, env = "FYYUR_HTTP_PORT")]
        port: Option<u16>,
    },
    /// Insert the sample venues, artists and shows
    Seed,
    /// Delete every row from every table
    Clear,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Fyyur starting");

    // Config commands work without a config file or a database
    if let Commands::Config(config_commands) = &args.command {
        match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                println!("{}", path.display());
                log::info!("Default config created successfully");
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(());
    }

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load fyyur config")?;

    let database = Database::open(&config.database_path()).await?;

    match args.command {
        Commands::Serve { port } => {
            let port = port.or(config.port()).unwrap_or(DEFAULT_PORT);
            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(HttpServerConfig { port, database }).await?;
        }
        Commands::Seed => {
            let summary = seed(Arc::new(database), Utc::now().naive_utc()).await?;
            println!(
                "Seeded {} venues, {} artists and {} shows",
                summary.venues, summary.artists, summary.shows
            );
        }
        Commands::Clear => {
            clear_all(&database).await?;
            println!("Cleared all data");
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
