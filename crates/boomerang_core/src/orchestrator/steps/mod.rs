//! Pipeline step implementations.
//!
//! One step per stage of the boomerang pipeline, in run order.

mod concat;
mod probe;
mod reset;
mod reverse;
mod stage_input;
mod validate;

pub use concat::ConcatStep;
pub use probe::ProbeStep;
pub use reset::ResetStep;
pub use reverse::ReverseStep;
pub use stage_input::StageInputStep;
pub use validate::ValidateStep;

use crate::logging::ToolStream;
use crate::toolchain::{ToolCommand, ToolSession};

use super::errors::{StepError, StepResult};
use super::types::Context;

/// Log, run, and await one toolchain command.
///
/// Tool output lands in the logger's tail buffer. A tool that cannot be
/// started becomes [`StepError::ToolchainSpawn`]; exit status is left
/// to the caller.
pub(crate) async fn run_tool(ctx: &Context, command: &ToolCommand) -> StepResult<ToolSession> {
    ctx.logger.command(&command.display_string());
    if ctx.log_commands_json {
        ctx.logger.command_json(&command.args);
    }

    let session = ctx
        .toolchain
        .execute(command)
        .await
        .map_err(|e| StepError::toolchain_spawn(command.tool, e))?;

    for line in session.output.lines() {
        ctx.logger.output_line(line, ToolStream::Stdout);
    }
    for line in session.trace.lines() {
        ctx.logger.output_line(line, ToolStream::Stderr);
    }

    ctx.logger.debug(&format!(
        "{} exited with {}",
        command.tool,
        session.exit_code_or_default()
    ));

    Ok(session)
}

/// Turn a non-success session into [`StepError::ToolchainExecution`].
pub(crate) fn ensure_success(ctx: &Context, session: &ToolSession) -> StepResult<()> {
    if session.is_success() {
        return Ok(());
    }

    ctx.logger.show_tail(session.command.tool.name());
    Err(StepError::toolchain_failed(session))
}
