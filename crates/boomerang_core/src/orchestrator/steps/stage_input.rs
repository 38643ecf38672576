//! Stage step - copies the source clip into the working directory.
//!
//! Every later stage reads the staged copy, so the caller is free to move
//! or delete the source as soon as the run starts.

use async_trait::async_trait;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage};

pub struct StageInputStep;

impl StageInputStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StageInputStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for StageInputStep {
    fn name(&self) -> &str {
        "Stage"
    }

    fn stage(&self) -> Stage {
        Stage::Staging
    }

    fn description(&self) -> &str {
        "Copy the source clip into the working directory"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if !ctx.source_path.is_file() {
            return Err(StepError::invalid_input(format!(
                "Source clip is not a readable file: {}",
                ctx.source_path.display()
            )));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let staged = ctx.workspace.staged_original();

        let bytes = tokio::fs::copy(&ctx.source_path, &staged)
            .await
            .map_err(|e| StepError::stage_io("copying source clip", e))?;

        ctx.logger.info(&format!(
            "Staged {} ({} bytes) -> {}",
            ctx.source_path.display(),
            bytes,
            staged.display()
        ));

        state.staged_original = Some(staged);
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let staged = state.staged()?;
        if !staged.exists() {
            return Err(StepError::output_missing(staged));
        }
        Ok(())
    }
}
