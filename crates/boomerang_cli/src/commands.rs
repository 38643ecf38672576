//! Subcommand implementations.

use std::path::Path;

use anyhow::{bail, Context as _};
use boomerang_core::config::Settings;
use boomerang_core::orchestrator::ProgressCallback;
use boomerang_core::toolchain::FfmpegToolchain;
use boomerang_core::Boomerang;

/// Produce a boomerang and optionally save it to the album.
pub async fn process(settings: Settings, source: &Path, save: bool) -> anyhow::Result<()> {
    let service = Boomerang::new(settings);

    let progress: ProgressCallback = Box::new(|stage, percent, message| {
        if stage.is_terminal() {
            return;
        }
        eprintln!("[{:>3}%] {}", percent, message);
    });

    let output = service
        .produce(source, Some(progress))
        .await
        .with_context(|| format!("Could not produce a boomerang from {}", source.display()))?;

    println!("Boomerang: {}", output.output_path.display());
    println!("Audio: {}", if output.has_audio { "yes" } else { "no" });
    if let Some(log_path) = &output.log_path {
        println!("Log: {}", log_path.display());
    }

    if save {
        let asset = service
            .save(&output)
            .await
            .context("Failed to save to album")?;
        println!("Saved to album '{}': {}", asset.album, asset.path.display());
    }

    Ok(())
}

/// Print the assets in the configured album.
pub async fn list_gallery(settings: Settings) -> anyhow::Result<()> {
    let service = Boomerang::new(settings);
    let album = service.settings().gallery.album.clone();
    let assets = service
        .gallery_assets()
        .await
        .with_context(|| format!("Failed to read album '{}'", album))?;

    if assets.is_empty() {
        println!("Album '{}' is empty.", album);
        return Ok(());
    }

    println!("Album '{}':", album);
    println!();
    for asset in &assets {
        println!(
            "  {}  {}",
            asset.created_at.format("%Y-%m-%d %H:%M:%S"),
            asset.path.display()
        );
    }

    Ok(())
}

/// Run `-version` on both tools and report what was found.
pub async fn doctor(settings: &Settings) -> anyhow::Result<()> {
    let toolchain = FfmpegToolchain::from_settings(&settings.tools);

    let mut missing = 0;
    for (tool, result) in toolchain.check_available().await {
        match result {
            Ok(version) => println!("  {:<8} {}", tool.name(), version),
            Err(e) => {
                missing += 1;
                println!(
                    "  {:<8} unavailable ({}): {}",
                    tool.name(),
                    toolchain.program(tool).display(),
                    e
                );
            }
        }
    }

    if missing > 0 {
        bail!("{} tool(s) unavailable; check [tools] in settings", missing);
    }
    println!("All tools available.");
    Ok(())
}
