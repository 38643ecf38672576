//! Boomerang production entry points.
//!
//! [`produce_boomerang`] runs the pipeline once against a given toolchain
//! and workspace. [`Boomerang`] wraps it with settings, a per-run log file,
//! and the gallery.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::gallery::{DirectoryGallery, GalleryAsset, GalleryResult, GalleryWriter};
use crate::logging::{LogConfig, RunLogger};
use crate::orchestrator::{
    create_boomerang_pipeline, Context, PipelineError, PipelineResult, PipelineRunResult,
    ProgressCallback, RunState, StepError,
};
use crate::toolchain::{FfmpegToolchain, MediaToolchain};
use crate::workspace::Workspace;

/// A finished run.
#[derive(Debug, Clone, Serialize)]
pub struct BoomerangOutput {
    /// The boomerang file, inside the workspace until the next run.
    pub output_path: PathBuf,
    pub has_audio: bool,
    pub run: PipelineRunResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

/// Produce a boomerang from `source` and return the output path.
///
/// The output lives in `workspace` and is deleted by the next run against
/// the same workspace.
pub async fn produce_boomerang(
    toolchain: Arc<dyn MediaToolchain>,
    workspace: &Workspace,
    source: &Path,
) -> PipelineResult<PathBuf> {
    let run_name = new_run_name();
    let logger = Arc::new(RunLogger::detached(&run_name, LogConfig::default()));
    let ctx = Context::new(source, workspace.clone(), toolchain, &run_name, logger);

    let (_, state) = run(&ctx).await?;
    output_of(&ctx, &state)
}

/// Long-lived service: settings, toolchain, workspace, and gallery.
pub struct Boomerang {
    settings: Settings,
    toolchain: Arc<dyn MediaToolchain>,
    workspace: Workspace,
    gallery: Arc<dyn GalleryWriter>,
    /// Runs share the workspace, so only one may be in flight.
    run_lock: Mutex<()>,
}

impl Boomerang {
    pub fn new(settings: Settings) -> Self {
        let toolchain = Arc::new(FfmpegToolchain::from_settings(&settings.tools));
        let workspace = Workspace::new(settings.work_dir());
        let gallery = Arc::new(DirectoryGallery::new(settings.gallery_root()));

        Self {
            settings,
            toolchain,
            workspace,
            gallery,
            run_lock: Mutex::new(()),
        }
    }

    /// Replace the toolchain.
    pub fn with_toolchain(mut self, toolchain: Arc<dyn MediaToolchain>) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Replace the gallery.
    pub fn with_gallery(mut self, gallery: Arc<dyn GalleryWriter>) -> Self {
        self.gallery = gallery;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run the pipeline on `source`, logging to a fresh file in the logs
    /// folder. Concurrent calls on one service wait their turn.
    pub async fn produce(
        &self,
        source: &Path,
        progress: Option<ProgressCallback>,
    ) -> PipelineResult<BoomerangOutput> {
        let _guard = self.run_lock.lock().await;

        let run_name = new_run_name();
        let logger = RunLogger::new(
            &run_name,
            self.settings.logs_folder(),
            LogConfig::from(&self.settings.logging),
            None,
        )
        .map_err(|e| {
            PipelineError::setup_failed(&run_name, format!("Failed to create run log: {}", e))
        })?;
        let logger = Arc::new(logger);

        tracing::info!("Starting run '{}' for {}", run_name, source.display());
        logger.info(&format!("Source: {}", source.display()));
        logger.info(&format!("Workspace: {}", self.workspace.root().display()));

        let mut ctx = Context::new(
            source,
            self.workspace.clone(),
            Arc::clone(&self.toolchain),
            &run_name,
            Arc::clone(&logger),
        )
        .with_command_json(self.settings.logging.show_commands_json);
        if let Some(callback) = progress {
            ctx = ctx.with_progress_callback(callback);
        }

        let outcome = run(&ctx).await;
        logger.flush();

        let (run_result, state) = match outcome {
            Ok(done) => done,
            Err(e) => {
                tracing::error!("{}", e);
                return Err(e);
            }
        };

        let output_path = output_of(&ctx, &state)?;
        tracing::info!("Run '{}' produced {}", run_name, output_path.display());

        Ok(BoomerangOutput {
            output_path,
            has_audio: state.audio_presence().unwrap_or(false),
            run: run_result,
            log_path: logger.log_path().map(Path::to_path_buf),
        })
    }

    /// Copy a finished boomerang into the configured album.
    pub async fn save(&self, output: &BoomerangOutput) -> GalleryResult<GalleryAsset> {
        self.gallery
            .save_to_album(&output.output_path, &self.settings.gallery.album)
            .await
    }

    /// Assets in the configured album, oldest first.
    pub async fn gallery_assets(&self) -> GalleryResult<Vec<GalleryAsset>> {
        self.gallery.list_album(&self.settings.gallery.album).await
    }
}

fn new_run_name() -> String {
    format!("boomerang_{}", chrono::Local::now().format("%Y%m%d_%H%M%S_%3f"))
}

async fn run(ctx: &Context) -> PipelineResult<(PipelineRunResult, RunState)> {
    let pipeline = create_boomerang_pipeline();
    let mut state = RunState::new(&ctx.run_name);
    let result = pipeline.run(ctx, &mut state).await?;
    Ok((result, state))
}

fn output_of(ctx: &Context, state: &RunState) -> PipelineResult<PathBuf> {
    state.output_path.clone().ok_or_else(|| {
        PipelineError::stage_failed(
            &ctx.run_name,
            "Validate",
            StepError::output_missing(ctx.workspace.concatenated_output()),
        )
    })
}
