//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Stage → Operation → Detail

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::toolchain::{Tool, ToolSession};

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed; nothing after it ran.
    #[error("Run '{run_name}' failed at stage '{stage_name}': {source}")]
    StageFailed {
        run_name: String,
        stage_name: String,
        #[source]
        source: StepError,
    },

    /// Cancellation was requested at a stage boundary.
    #[error("Run '{run_name}' was cancelled")]
    Cancelled { run_name: String },

    /// Failed to set up the run (log directory, etc.).
    #[error("Run '{run_name}' setup failed: {message}")]
    SetupFailed { run_name: String, message: String },
}

impl PipelineError {
    pub fn stage_failed(
        run_name: impl Into<String>,
        stage_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StageFailed {
            run_name: run_name.into(),
            stage_name: stage_name.into(),
            source,
        }
    }

    pub fn cancelled(run_name: impl Into<String>) -> Self {
        Self::Cancelled {
            run_name: run_name.into(),
        }
    }

    pub fn setup_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }

    /// The stage error behind this failure, if a stage failed.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::StageFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Name of the stage that failed.
    pub fn stage_name(&self) -> Option<&str> {
        match self {
            Self::StageFailed { stage_name, .. } => Some(stage_name),
            _ => None,
        }
    }

    pub fn is_output_missing(&self) -> bool {
        matches!(self.step_error(), Some(StepError::OutputMissing { .. }))
    }

    pub fn is_toolchain_failure(&self) -> bool {
        matches!(self.step_error(), Some(StepError::ToolchainExecution { .. }))
    }

    pub fn is_stage_io(&self) -> bool {
        matches!(self.step_error(), Some(StepError::StageIo { .. }))
    }
}

/// Error from a single pipeline stage.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// Working directory setup, cleanup, or staging copy failed.
    #[error("I/O error while {operation}: {source}")]
    StageIo {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The toolchain ran and reported failure.
    #[error("{tool} failed with exit code {exit_code}: {trace}")]
    ToolchainExecution {
        tool: Tool,
        command: String,
        exit_code: i32,
        trace: String,
    },

    /// The toolchain could not be started.
    #[error("Could not run {tool}: {source}")]
    ToolchainSpawn {
        tool: Tool,
        #[source]
        source: io::Error,
    },

    /// The toolchain reported success but the output file is absent.
    #[error("Output not found: {}", path.display())]
    OutputMissing { path: PathBuf },

    /// A stage ran without the state an earlier stage should have recorded.
    #[error("Precondition not met: {0}")]
    Precondition(String),
}

impl StepError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn stage_io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::StageIo {
            operation: operation.into(),
            source,
        }
    }

    /// Build an execution error from a failed session.
    pub fn toolchain_failed(session: &ToolSession) -> Self {
        Self::ToolchainExecution {
            tool: session.command.tool,
            command: session.command.display_string(),
            exit_code: session.exit_code_or_default(),
            trace: session.trace.trim().to_string(),
        }
    }

    pub fn toolchain_spawn(tool: Tool, source: io::Error) -> Self {
        Self::ToolchainSpawn { tool, source }
    }

    pub fn output_missing(path: impl Into<PathBuf>) -> Self {
        Self::OutputMissing { path: path.into() }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// The command string involved in this error, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::ToolchainExecution { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
