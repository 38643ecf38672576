//! Boomerang - command-line entry point
//!
//! Handles:
//! - Configuration loading
//! - Application-level logging initialization
//! - Directory creation
//! - Dispatch to subcommands

use std::path::PathBuf;

use anyhow::Context as _;
use boomerang_core::config::ConfigManager;
use boomerang_core::logging::{init_tracing, LogLevel};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;

mod commands;

#[derive(Parser)]
#[command(name = "boomerang")]
#[command(about = "Turn a short clip into a forward-then-backward boomerang")]
#[command(version)]
struct Cli {
    /// Settings file (default: platform config dir, created if missing)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a boomerang from a recorded clip
    Process {
        /// Clip to process
        source: PathBuf,

        /// Copy the result into the album
        #[arg(short, long)]
        save: bool,

        /// Album to save into (overrides the configured album)
        #[arg(short, long)]
        album: Option<String>,
    },

    /// List saved boomerangs, oldest first
    Gallery {
        /// Album to list (overrides the configured album)
        #[arg(short, long)]
        album: Option<String>,
    },

    /// Check that ffmpeg and ffprobe can be run
    Doctor,
}

/// Default config path: `<config dir>/settings.toml`, or
/// `.boomerang/settings.toml` when no home directory is known.
fn default_config_path() -> PathBuf {
    ProjectDirs::from("io.github", "boomerang", "boomerang")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
        .unwrap_or_else(|| PathBuf::from(".boomerang").join("settings.toml"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config_manager = ConfigManager::new(&config_path);
    if let Err(e) = config_manager.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config_manager.settings().logging.level
    };
    init_tracing(level);

    tracing::info!("Boomerang starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::debug!("Core version: {}", boomerang_core::version());

    config_manager
        .ensure_dirs_exist()
        .context("Failed to create configured directories")?;

    let mut settings = config_manager.into_settings();
    if cli.verbose {
        settings.logging.level = LogLevel::Debug;
    }

    match cli.command {
        Commands::Process {
            source,
            save,
            album,
        } => {
            if let Some(album) = album {
                settings.gallery.album = album;
            }
            let save = save || settings.gallery.save_after_processing;
            commands::process(settings, &source, save).await
        }
        Commands::Gallery { album } => {
            if let Some(album) = album {
                settings.gallery.album = album;
            }
            commands::list_gallery(settings).await
        }
        Commands::Doctor => commands::doctor(&settings).await,
    }
}
