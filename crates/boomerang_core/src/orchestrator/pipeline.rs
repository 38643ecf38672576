//! Sequential step runner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::errors::{PipelineError, PipelineResult, StepResult};
use super::step::PipelineStep;
use super::types::{Context, RunState, Stage};

/// Ordered list of steps, each awaited to completion before the next.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    cancelled: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Get a cancellation handle.
    ///
    /// Cancelling stops the pipeline at the next step boundary. A tool
    /// process already running is left to finish.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run every step in order against `ctx`, recording progress in `state`.
    ///
    /// Per step: cancellation check, `validate_input`, `execute`, then
    /// `validate_output`. The first error leaves `state.stage` at
    /// [`Stage::Failed`].
    pub async fn run(
        &self,
        ctx: &Context,
        state: &mut RunState,
    ) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult::default();
        let total = self.steps.len().max(1) as u32;

        for (index, step) in self.steps.iter().enumerate() {
            let name = step.name();

            if self.is_cancelled() {
                ctx.logger.warn(&format!("Cancelled before '{}'", name));
                state.stage = Stage::Failed;
                return Err(PipelineError::cancelled(&ctx.run_name));
            }

            state.stage = step.stage();
            ctx.logger.stage(name);
            ctx.report_progress(
                state.stage,
                index as u32 * 100 / total,
                step.description(),
            );

            match Self::run_step(step.as_ref(), ctx, state).await {
                Ok(()) => {
                    ctx.logger.success(&format!("{} completed", name));
                    result.steps_completed.push(name.to_string());
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed: {}", name, e));
                    ctx.logger.flush();
                    state.stage = Stage::Failed;
                    return Err(PipelineError::stage_failed(&ctx.run_name, name, e));
                }
            }
        }

        state.stage = Stage::Succeeded;
        ctx.report_progress(Stage::Succeeded, 100, "Boomerang ready");
        ctx.logger.success("Pipeline completed successfully");
        ctx.logger.flush();

        Ok(result)
    }

    async fn run_step(
        step: &dyn PipelineStep,
        ctx: &Context,
        state: &mut RunState,
    ) -> StepResult<()> {
        step.validate_input(ctx, state)?;

        ctx.logger.debug(&format!("Executing '{}'", step.name()));
        step.execute(ctx, state).await?;

        step.validate_output(ctx, state)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for cancelling a running pipeline.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<String>,
}

impl PipelineRunResult {
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogConfig, RunLogger};
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::toolchain::testing::ScriptedToolchain;
    use crate::workspace::Workspace;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    struct CountingStep {
        name: &'static str,
        stage: Stage,
        execute_count: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingStep {
        fn new(name: &'static str, stage: Stage, count: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                stage,
                execute_count: Arc::clone(count),
                fail: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn stage(&self) -> Stage {
            self.stage
        }

        fn validate_input(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }

        async fn execute(&self, _ctx: &Context, _state: &mut RunState) -> StepResult<()> {
            self.execute_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StepError::invalid_output("boom"));
            }
            Ok(())
        }

        fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }
    }

    fn context() -> Context {
        Context::new(
            "/nowhere/clip.mp4",
            Workspace::new("/nowhere/work"),
            Arc::new(ScriptedToolchain::silent()),
            "test_run",
            Arc::new(RunLogger::detached("test_run", LogConfig::default())),
        )
    }

    #[test]
    fn pipeline_builds_correctly() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep::new("Step1", Stage::Resetting, &count))
            .with_step(CountingStep::new("Step2", Stage::Staging, &count));

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[tokio::test]
    async fn runs_all_steps_and_succeeds() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep::new("Step1", Stage::Resetting, &count))
            .with_step(CountingStep::new("Step2", Stage::Staging, &count));

        let ctx = context();
        let mut state = RunState::new("r");
        let result = pipeline.run(&ctx, &mut state).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(result.total_steps(), 2);
        assert_eq!(result.steps_completed, vec!["Step1", "Step2"]);
        assert_eq!(state.stage, Stage::Succeeded);
    }

    #[tokio::test]
    async fn failure_short_circuits_remaining_steps() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep::new("Reverse", Stage::Reversing, &first).failing())
            .with_step(CountingStep::new("Concat", Stage::Concatenating, &second));

        let ctx = context();
        let mut state = RunState::new("r");
        let err = pipeline.run(&ctx, &mut state).await.unwrap_err();

        assert_eq!(err.stage_name(), Some("Reverse"));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(state.stage, Stage::Failed);
    }

    #[tokio::test]
    async fn progress_reports_each_stage_in_order() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep::new("A", Stage::Resetting, &count))
            .with_step(CountingStep::new("B", Stage::Staging, &count));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = context().with_progress_callback(Box::new(move |stage, _, _| {
            sink.lock().push(stage);
        }));

        let mut state = RunState::new("r");
        pipeline.run(&ctx, &mut state).await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![Stage::Resetting, Stage::Staging, Stage::Succeeded]
        );
    }

    #[tokio::test]
    async fn cancelled_pipeline_runs_nothing() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline =
            Pipeline::new().with_step(CountingStep::new("A", Stage::Resetting, &count));
        let handle = pipeline.cancel_handle();
        handle.cancel();
        assert!(pipeline.is_cancelled());

        let ctx = context();
        let mut state = RunState::new("r");
        let err = pipeline.run(&ctx, &mut state).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled { .. }));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
