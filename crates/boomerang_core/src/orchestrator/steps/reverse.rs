//! Reverse step - writes the time-reversed copy of the staged clip.

use async_trait::async_trait;

use super::{ensure_success, run_tool};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage};
use crate::toolchain::{reverse_command, ToolRecord};

pub struct ReverseStep;

impl ReverseStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReverseStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ReverseStep {
    fn name(&self) -> &str {
        "Reverse"
    }

    fn stage(&self) -> Stage {
        Stage::Reversing
    }

    fn description(&self) -> &str {
        "Reverse the staged clip, audio included when present"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.staged()?;
        state.has_audio()?;
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let has_audio = state.has_audio()?;
        let command = reverse_command(state.staged()?, &ctx.workspace.reversed_clip(), has_audio);

        if has_audio {
            ctx.logger.info("Reversing video and audio together");
        } else {
            ctx.logger.info("Reversing video only");
        }

        let session = run_tool(ctx, &command).await?;
        ensure_success(ctx, &session)?;

        state.reversal = Some(ToolRecord::from(&session));
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.reversal.is_none() {
            return Err(StepError::invalid_output("Reversal not recorded"));
        }
        Ok(())
    }
}
