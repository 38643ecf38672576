//! Toolchain backed by the ffmpeg/ffprobe executables.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::command::{Tool, ToolCommand};
use super::session::ToolSession;
use super::MediaToolchain;
use crate::config::ToolSettings;

/// Runs commands as child processes and waits for them to exit.
#[derive(Debug, Clone)]
pub struct FfmpegToolchain {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegToolchain {
    /// Use `ffmpeg` and `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from(Tool::Ffmpeg.name()),
            ffprobe: PathBuf::from(Tool::Ffprobe.name()),
        }
    }

    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            ffmpeg: PathBuf::from(&settings.ffmpeg_path),
            ffprobe: PathBuf::from(&settings.ffprobe_path),
        }
    }

    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg = path.into();
        self
    }

    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe = path.into();
        self
    }

    /// Executable used for `tool`.
    pub fn program(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Ffmpeg => &self.ffmpeg,
            Tool::Ffprobe => &self.ffprobe,
        }
    }

    /// Run `-version` on each tool and return the first line of its banner.
    pub async fn check_available(&self) -> Vec<(Tool, io::Result<String>)> {
        let mut report = Vec::new();
        for tool in [Tool::Ffmpeg, Tool::Ffprobe] {
            let command = ToolCommand::new(tool).arg("-version");
            let result = self.execute(&command).await.and_then(|session| {
                if session.is_success() {
                    Ok(session.output.lines().next().unwrap_or_default().to_string())
                } else {
                    Err(io::Error::other(format!(
                        "{} -version exited with {}",
                        tool,
                        session.exit_code_or_default()
                    )))
                }
            });
            report.push((tool, result));
        }
        report
    }
}

impl Default for FfmpegToolchain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaToolchain for FfmpegToolchain {
    async fn execute(&self, command: &ToolCommand) -> io::Result<ToolSession> {
        let program = self.program(command.tool);
        tracing::debug!("Spawning {} {:?}", program.display(), command.args);

        let output = Command::new(program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ToolSession {
            command: command.clone(),
            exit_code: output.status.code(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            trace: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
