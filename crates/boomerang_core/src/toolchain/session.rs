//! Completed toolchain invocations.

use serde::{Deserialize, Serialize};

use super::command::ToolCommand;

/// Outcome of one finished toolchain process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSession {
    pub command: ToolCommand,
    /// Process exit code; `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub output: String,
    /// Captured diagnostics (standard error).
    pub trace: String,
}

impl ToolSession {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Whether the tool printed anything to standard output.
    pub fn has_output(&self) -> bool {
        !self.output.trim().is_empty()
    }

    /// Exit code for reporting, `-1` when the process had none.
    pub fn exit_code_or_default(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }
}

/// Summary of a tool invocation kept in the run state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub command: String,
    pub exit_code: i32,
}

impl From<&ToolSession> for ToolRecord {
    fn from(session: &ToolSession) -> Self {
        Self {
            command: session.command.display_string(),
            exit_code: session.exit_code_or_default(),
        }
    }
}
