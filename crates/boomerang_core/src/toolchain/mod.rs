//! The external media toolchain.
//!
//! The pipeline only ever talks to ffmpeg/ffprobe through
//! [`MediaToolchain`]: it hands over a [`ToolCommand`] and awaits a
//! [`ToolSession`] carrying the exit code, standard output, and the
//! diagnostic trace. [`FfmpegToolchain`] is the process-backed
//! implementation.

mod command;
mod ffmpeg;
mod session;
#[cfg(test)]
pub(crate) mod testing;

use std::io;

use async_trait::async_trait;

pub use command::{
    concat_command, probe_audio_command, reverse_command, Tool, ToolCommand, AUDIO_OUT_LABEL,
    CONCAT_GRAPH_VIDEO_ONLY, CONCAT_GRAPH_WITH_AUDIO, VIDEO_OUT_LABEL,
};
pub use ffmpeg::FfmpegToolchain;
pub use session::{ToolRecord, ToolSession};

/// Something that can run toolchain commands to completion.
///
/// `Err` means the tool could not be run at all; a tool that ran and
/// failed is an `Ok` session with a non-zero exit code.
#[async_trait]
pub trait MediaToolchain: Send + Sync {
    async fn execute(&self, command: &ToolCommand) -> io::Result<ToolSession>;
}
