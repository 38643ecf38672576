//! Probe step - decides whether the staged clip has audio.
//!
//! Any stream listing at all counts as audio. Stream health and duration
//! are not checked, so a broken audio stream still selects the
//! audio-aware commands downstream.

use async_trait::async_trait;

use super::run_tool;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage};
use crate::toolchain::probe_audio_command;

pub struct ProbeStep;

impl ProbeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProbeStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ProbeStep {
    fn name(&self) -> &str {
        "Probe"
    }

    fn stage(&self) -> Stage {
        Stage::Probing
    }

    fn description(&self) -> &str {
        "Check the staged clip for an audio stream"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.staged()?;
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let command = probe_audio_command(state.staged()?);
        let session = run_tool(ctx, &command).await?;

        // The listing decides, not the exit status.
        if !session.is_success() {
            ctx.logger.warn(&format!(
                "ffprobe exited with {}; deciding from its output anyway",
                session.exit_code_or_default()
            ));
        }

        let has_audio = session.has_output();
        ctx.logger.info(&format!("Source clip has audio: {}", has_audio));

        state.record_audio_presence(has_audio)?;
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.audio_presence().is_none() {
            return Err(StepError::invalid_output("Audio presence not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::logging::{LogConfig, RunLogger};
    use crate::toolchain::{MediaToolchain, ToolCommand, ToolSession};
    use crate::workspace::Workspace;

    /// Answers every probe with a fixed exit code and listing.
    struct FixedProbe {
        exit_code: Option<i32>,
        output: &'static str,
    }

    #[async_trait]
    impl MediaToolchain for FixedProbe {
        async fn execute(&self, command: &ToolCommand) -> io::Result<ToolSession> {
            Ok(ToolSession {
                command: command.clone(),
                exit_code: self.exit_code,
                output: self.output.to_string(),
                trace: String::new(),
            })
        }
    }

    struct NoFfprobe;

    #[async_trait]
    impl MediaToolchain for NoFfprobe {
        async fn execute(&self, _command: &ToolCommand) -> io::Result<ToolSession> {
            Err(io::Error::new(io::ErrorKind::NotFound, "ffprobe"))
        }
    }

    async fn probe_with(toolchain: Arc<dyn MediaToolchain>) -> StepResult<RunState> {
        let ctx = Context::new(
            "/src/clip.mp4",
            Workspace::new("/w"),
            toolchain,
            "probe_test",
            Arc::new(RunLogger::detached("probe_test", LogConfig::default())),
        );
        let mut state = RunState::new("probe_test");
        state.staged_original = Some(PathBuf::from("/w/original.mp4"));

        let step = ProbeStep::new();
        step.validate_input(&ctx, &state)?;
        step.execute(&ctx, &mut state).await?;
        step.validate_output(&ctx, &state)?;
        Ok(state)
    }

    #[tokio::test]
    async fn listing_means_audio() {
        let state = probe_with(Arc::new(FixedProbe {
            exit_code: Some(0),
            output: "[STREAM]\ncodec_type=audio\n[/STREAM]\n",
        }))
        .await
        .unwrap();
        assert_eq!(state.audio_presence(), Some(true));
    }

    #[tokio::test]
    async fn empty_or_blank_listing_means_silent() {
        for output in ["", "  \n"] {
            let state = probe_with(Arc::new(FixedProbe {
                exit_code: Some(0),
                output,
            }))
            .await
            .unwrap();
            assert_eq!(state.audio_presence(), Some(false));
        }
    }

    #[tokio::test]
    async fn exit_status_does_not_decide() {
        let state = probe_with(Arc::new(FixedProbe {
            exit_code: Some(1),
            output: "[STREAM]\ncodec_type=audio\n[/STREAM]\n",
        }))
        .await
        .unwrap();
        assert_eq!(state.audio_presence(), Some(true));
    }

    #[tokio::test]
    async fn unspawnable_probe_is_an_error() {
        let err = probe_with(Arc::new(NoFfprobe)).await.unwrap_err();
        assert!(matches!(err, StepError::ToolchainSpawn { .. }));
    }

    #[tokio::test]
    async fn probe_requires_staged_clip() {
        let ctx = Context::new(
            "/src/clip.mp4",
            Workspace::new("/w"),
            Arc::new(NoFfprobe),
            "probe_test",
            Arc::new(RunLogger::detached("probe_test", LogConfig::default())),
        );
        let state = RunState::new("probe_test");
        let err = ProbeStep::new().validate_input(&ctx, &state).unwrap_err();
        assert!(matches!(err, StepError::Precondition(_)));
    }
}
