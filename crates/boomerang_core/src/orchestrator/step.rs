//! Pipeline step trait definition.

use async_trait::async_trait;

use super::errors::StepResult;
use super::types::{Context, RunState, Stage};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work, awaiting any external process
/// 3. `validate_output` - Verify the step recorded what later steps need
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// State the run is in while this step executes.
    fn stage(&self) -> Stage;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Execute the step's main work and record results in `state`.
    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()>;

    /// Validate outputs after execution.
    ///
    /// Only called when `execute` succeeded.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
