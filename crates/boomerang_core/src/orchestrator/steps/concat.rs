//! Concat step - joins the staged clip and its reverse into the output.

use async_trait::async_trait;

use super::{ensure_success, run_tool};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage};
use crate::toolchain::{concat_command, ToolRecord};

pub struct ConcatStep;

impl ConcatStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConcatStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ConcatStep {
    fn name(&self) -> &str {
        "Concat"
    }

    fn stage(&self) -> Stage {
        Stage::Concatenating
    }

    fn description(&self) -> &str {
        "Join the original and reversed clips"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.staged()?;
        state.has_audio()?;
        if state.reversal.is_none() {
            return Err(StepError::precondition("clip has not been reversed"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let has_audio = state.has_audio()?;
        let command = concat_command(
            state.staged()?,
            &ctx.workspace.reversed_clip(),
            &ctx.workspace.concatenated_output(),
            has_audio,
        );

        let session = run_tool(ctx, &command).await?;
        ensure_success(ctx, &session)?;

        state.concatenation = Some(ToolRecord::from(&session));
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.concatenation.is_none() {
            return Err(StepError::invalid_output("Concatenation not recorded"));
        }
        Ok(())
    }
}
