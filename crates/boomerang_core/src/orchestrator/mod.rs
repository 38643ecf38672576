//! Pipeline orchestrator for producing one boomerang.
//!
//! A run is a fixed sequence of steps, each awaited before the next
//! starts, because every step reads the file its predecessor wrote.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Reset     (Resetting)
//!     ├── Step: Stage     (Staging)
//!     ├── Step: Probe     (Probing)
//!     ├── Step: Reverse   (Reversing)
//!     ├── Step: Concat    (Concatenating)
//!     └── Step: Validate  (Validating)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use boomerang_core::orchestrator::{create_boomerang_pipeline, Context, RunState};
//!
//! let pipeline = create_boomerang_pipeline();
//! let ctx = Context::new(source, workspace, toolchain, "run_1", logger);
//! let mut state = RunState::new("run_1");
//!
//! pipeline.run(&ctx, &mut state).await?;
//! println!("Output: {:?}", state.output_path);
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{ConcatStep, ProbeStep, ResetStep, ReverseStep, StageInputStep, ValidateStep};
pub use types::{Context, ProgressCallback, RunState, Stage};

/// Create the boomerang pipeline with all steps in order.
///
/// 1. Reset - clear the working directory
/// 2. Stage - copy the source clip in
/// 3. Probe - detect an audio stream
/// 4. Reverse - write the reversed clip
/// 5. Concat - write original + reversed
/// 6. Validate - confirm the output file exists
pub fn create_boomerang_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ResetStep::new())
        .with_step(StageInputStep::new())
        .with_step(ProbeStep::new())
        .with_step(ReverseStep::new())
        .with_step(ConcatStep::new())
        .with_step(ValidateStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boomerang_pipeline_order() {
        let pipeline = create_boomerang_pipeline();
        assert_eq!(
            pipeline.step_names(),
            vec!["Reset", "Stage", "Probe", "Reverse", "Concat", "Validate"]
        );
    }
}
