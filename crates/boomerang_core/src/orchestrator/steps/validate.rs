//! Validate step - confirms the concatenated output actually exists.
//!
//! A zero exit status from ffmpeg is not taken as proof of a result.

use async_trait::async_trait;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, Stage};

pub struct ValidateStep;

impl ValidateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ValidateStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ValidateStep {
    fn name(&self) -> &str {
        "Validate"
    }

    fn stage(&self) -> Stage {
        Stage::Validating
    }

    fn description(&self) -> &str {
        "Check that the boomerang file was written"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.concatenation.is_none() {
            return Err(StepError::precondition("clips have not been concatenated"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let output = ctx.workspace.concatenated_output();

        let exists = tokio::fs::try_exists(&output)
            .await
            .map_err(|e| StepError::stage_io("checking output file", e))?;

        ctx.logger.info(&format!("Output exists: {}", exists));
        if !exists {
            return Err(StepError::output_missing(output));
        }

        state.output_path = Some(output);
        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.output_path.is_none() {
            return Err(StepError::invalid_output("Output path not recorded"));
        }
        Ok(())
    }
}
