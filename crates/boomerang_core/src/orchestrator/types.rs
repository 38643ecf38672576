//! Core types for the orchestrator pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{StepError, StepResult};
use crate::logging::RunLogger;
use crate::toolchain::{MediaToolchain, ToolRecord};
use crate::workspace::Workspace;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(Stage, u32, &str) + Send + Sync>;

/// Where a run currently is.
///
/// `Idle → Resetting → Staging → Probing → Reversing → Concatenating →
/// Validating → {Succeeded | Failed}`; any failure jumps straight to
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    Resetting,
    Staging,
    Probing,
    Reversing,
    Concatenating,
    Validating,
    Succeeded,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Resetting => "resetting",
            Stage::Staging => "staging",
            Stage::Probing => "probing",
            Stage::Reversing => "reversing",
            Stage::Concatenating => "concatenating",
            Stage::Validating => "validating",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Read-only context passed to pipeline steps.
pub struct Context {
    /// Clip handed over by the capture layer.
    pub source_path: PathBuf,
    /// Scratch directory for this run.
    pub workspace: Workspace,
    pub toolchain: Arc<dyn MediaToolchain>,
    /// Run name/identifier.
    pub run_name: String,
    pub logger: Arc<RunLogger>,
    /// Log every tool argument vector as JSON too.
    pub log_commands_json: bool,
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    pub fn new(
        source_path: impl Into<PathBuf>,
        workspace: Workspace,
        toolchain: Arc<dyn MediaToolchain>,
        run_name: impl Into<String>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            workspace,
            toolchain,
            run_name: run_name.into(),
            logger,
            log_commands_json: false,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_command_json(mut self, enabled: bool) -> Self {
        self.log_commands_json = enabled;
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, stage: Stage, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage, percent, message);
        }
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Each field is written by exactly one step. The audio-presence flag is
/// write-once: the probe sets it and both dependent stages read the same
/// value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub started_at: Option<String>,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged_original: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_audio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reversal: Option<ToolRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concatenation: Option<ToolRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl RunState {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Record the audio-presence flag. Fails if it was already recorded.
    pub fn record_audio_presence(&mut self, has_audio: bool) -> StepResult<()> {
        if self.has_audio.is_some() {
            return Err(StepError::precondition(
                "audio presence already recorded for this run",
            ));
        }
        self.has_audio = Some(has_audio);
        Ok(())
    }

    /// The flag as recorded, `None` before the probe ran.
    pub fn audio_presence(&self) -> Option<bool> {
        self.has_audio
    }

    /// The flag, or a precondition error if the probe has not run.
    pub fn has_audio(&self) -> StepResult<bool> {
        self.has_audio
            .ok_or_else(|| StepError::precondition("audio presence has not been probed"))
    }

    /// The staged original, or a precondition error if staging has not run.
    pub fn staged(&self) -> StepResult<&Path> {
        self.staged_original
            .as_deref()
            .ok_or_else(|| StepError::precondition("source clip has not been staged"))
    }
}
