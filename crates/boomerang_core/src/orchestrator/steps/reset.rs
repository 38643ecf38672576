//! Reset step - clears the working directory of the previous run's files.

use async_trait::async_trait;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage};

pub struct ResetStep;

impl ResetStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResetStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ResetStep {
    fn name(&self) -> &str {
        "Reset"
    }

    fn stage(&self) -> Stage {
        Stage::Resetting
    }

    fn description(&self) -> &str {
        "Create the working directory and remove stale artifacts"
    }

    /// Reset deletes the artifacts, so the source must not be one of them.
    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if ctx.workspace.holds(&ctx.source_path) {
            return Err(StepError::invalid_input(format!(
                "Source clip is a working file and would be deleted: {}",
                ctx.source_path.display()
            )));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, _state: &mut RunState) -> StepResult<()> {
        ctx.logger.info(&format!(
            "Working directory: {}",
            ctx.workspace.root().display()
        ));

        ctx.workspace
            .reset()
            .await
            .map_err(|e| StepError::stage_io("resetting working directory", e))?;

        Ok(())
    }

    fn validate_output(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if let Some(stale) = ctx.workspace.artifacts().iter().find(|p| p.exists()) {
            return Err(StepError::invalid_output(format!(
                "Stale artifact survived reset: {}",
                stale.display()
            )));
        }
        Ok(())
    }
}
