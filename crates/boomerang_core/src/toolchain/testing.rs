//! Scripted toolchain for tests.
//!
//! Records every command it receives and fakes the three invocations:
//! the probe prints a configurable listing, reversal writes
//! `rev(<input>)`, and concatenation writes `<first>+<second>`, so the
//! content of an output file shows exactly which inputs produced it.

use std::io;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{MediaToolchain, Tool, ToolCommand, ToolSession};

pub(crate) const AUDIO_LISTING: &str =
    "[STREAM]\nindex=1\ncodec_name=aac\ncodec_type=audio\n[/STREAM]\n";

/// Kind of invocation, inferred from the command's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Invocation {
    Probe,
    Reverse,
    Concat,
    Other,
}

pub(crate) fn classify(command: &ToolCommand) -> Invocation {
    match command.tool {
        Tool::Ffprobe => Invocation::Probe,
        Tool::Ffmpeg if command.has_arg("-filter_complex") => Invocation::Concat,
        Tool::Ffmpeg if command.has_arg("-vf") => Invocation::Reverse,
        Tool::Ffmpeg => Invocation::Other,
    }
}

pub(crate) struct ScriptedToolchain {
    probe_output: Mutex<String>,
    fail_reverse: bool,
    fail_concat: bool,
    write_outputs: bool,
    calls: Mutex<Vec<ToolCommand>>,
}

impl ScriptedToolchain {
    /// A toolchain whose probe finds no audio and whose commands succeed.
    pub fn silent() -> Self {
        Self {
            probe_output: Mutex::new(String::new()),
            fail_reverse: false,
            fail_concat: false,
            write_outputs: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A toolchain whose probe reports one audio stream.
    pub fn with_audio() -> Self {
        let toolchain = Self::silent();
        toolchain.set_probe_output(AUDIO_LISTING);
        toolchain
    }

    pub fn set_probe_output(&self, output: &str) {
        *self.probe_output.lock() = output.to_string();
    }

    pub fn failing_reverse(mut self) -> Self {
        self.fail_reverse = true;
        self
    }

    pub fn failing_concat(mut self) -> Self {
        self.fail_concat = true;
        self
    }

    /// Report success for every command but never create files.
    pub fn without_outputs(mut self) -> Self {
        self.write_outputs = false;
        self
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.lock().clone()
    }

    pub fn calls_of(&self, kind: Invocation) -> Vec<ToolCommand> {
        self.calls()
            .into_iter()
            .filter(|c| classify(c) == kind)
            .collect()
    }

    fn session(command: &ToolCommand, exit_code: i32, output: &str, trace: &str) -> ToolSession {
        ToolSession {
            command: command.clone(),
            exit_code: Some(exit_code),
            output: output.to_string(),
            trace: trace.to_string(),
        }
    }

    async fn read_input(path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

#[async_trait]
impl MediaToolchain for ScriptedToolchain {
    async fn execute(&self, command: &ToolCommand) -> io::Result<ToolSession> {
        self.calls.lock().push(command.clone());

        let output_path = command.last_arg().unwrap_or_default().to_string();
        let inputs: Vec<String> = command.values_of("-i").into_iter().map(String::from).collect();

        match classify(command) {
            Invocation::Probe => {
                let listing = self.probe_output.lock().clone();
                Ok(Self::session(command, 0, &listing, ""))
            }
            Invocation::Reverse => {
                if self.fail_reverse {
                    return Ok(Self::session(command, 1, "", "Error while filtering: reverse"));
                }
                if self.write_outputs {
                    let content = Self::read_input(&inputs[0]).await?;
                    tokio::fs::write(&output_path, format!("rev({})", content)).await?;
                }
                Ok(Self::session(command, 0, "", ""))
            }
            Invocation::Concat => {
                if self.fail_concat {
                    return Ok(Self::session(command, 1, "", "Error initializing complex filters"));
                }
                if self.write_outputs {
                    let first = Self::read_input(&inputs[0]).await?;
                    let second = Self::read_input(&inputs[1]).await?;
                    tokio::fs::write(&output_path, format!("{}+{}", first, second)).await?;
                }
                Ok(Self::session(command, 0, "", ""))
            }
            Invocation::Other => Ok(Self::session(command, 0, "", "")),
        }
    }
}
