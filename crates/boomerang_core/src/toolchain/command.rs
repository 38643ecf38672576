//! Command builders for the three toolchain invocations.
//!
//! Each builder is a pure function of its paths and the audio-presence
//! flag, so the exact command issued for a run can be asserted without
//! touching the toolchain.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Filter graph joining two clips when both carry audio.
pub const CONCAT_GRAPH_WITH_AUDIO: &str = "[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1[outv][outa]";

/// Filter graph joining two video-only clips.
pub const CONCAT_GRAPH_VIDEO_ONLY: &str = "[0:v][1:v]concat=n=2:v=1[outv]";

/// Output pad labels in the concat graphs.
pub const VIDEO_OUT_LABEL: &str = "[outv]";
pub const AUDIO_OUT_LABEL: &str = "[outa]";

/// Executable a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single toolchain invocation: which tool, with which arguments.
///
/// Arguments are passed to the process verbatim (no shell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub tool: Tool,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    /// Whether `arg` appears anywhere in the argument list.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Every value following an occurrence of `flag`.
    ///
    /// `values_of("-map")` on a concat command yields its stream mappings.
    pub fn values_of(&self, flag: &str) -> Vec<&str> {
        self.args
            .windows(2)
            .filter(|pair| pair[0] == flag)
            .map(|pair| pair[1].as_str())
            .collect()
    }

    /// The trailing positional argument (the output file for ffmpeg).
    pub fn last_arg(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }

    /// Render as a single shell-like command string for logs.
    pub fn display_string(&self) -> String {
        let mut out = String::from(self.tool.name());
        for arg in &self.args {
            out.push(' ');
            if needs_quoting(arg) {
                out.push('"');
                out.push_str(&arg.replace('"', "\\\""));
                out.push('"');
            } else {
                out.push_str(arg);
            }
        }
        out
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '[' | ']' | ';' | '"' | '\'' | '$'))
}

/// List the audio streams of `input`, printing errors only.
///
/// Any stdout at all means the file has audio.
pub fn probe_audio_command(input: &Path) -> ToolCommand {
    ToolCommand::new(Tool::Ffprobe)
        .arg("-i")
        .path_arg(input)
        .args(["-show_streams", "-select_streams", "a", "-loglevel", "error"])
}

/// Time-reverse `input` into `output`, overwriting it.
///
/// With audio, the waveform is reversed alongside the frames so the two
/// stay in sync; without, only the video filter is requested.
pub fn reverse_command(input: &Path, output: &Path, has_audio: bool) -> ToolCommand {
    let mut cmd = ToolCommand::new(Tool::Ffmpeg)
        .arg("-y")
        .arg("-i")
        .path_arg(input)
        .args(["-vf", "reverse"]);

    if has_audio {
        cmd = cmd.args(["-af", "areverse"]);
    }

    cmd.path_arg(output)
}

/// Join `first` then `second` into `output`.
///
/// Exactly one video stream is mapped; one audio stream is mapped iff
/// `has_audio`.
pub fn concat_command(first: &Path, second: &Path, output: &Path, has_audio: bool) -> ToolCommand {
    let graph = if has_audio {
        CONCAT_GRAPH_WITH_AUDIO
    } else {
        CONCAT_GRAPH_VIDEO_ONLY
    };

    let mut cmd = ToolCommand::new(Tool::Ffmpeg)
        .arg("-y")
        .arg("-i")
        .path_arg(first)
        .arg("-i")
        .path_arg(second)
        .args(["-filter_complex", graph])
        .args(["-map", VIDEO_OUT_LABEL]);

    if has_audio {
        cmd = cmd.args(["-map", AUDIO_OUT_LABEL]);
    }

    cmd.path_arg(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn probe_selects_audio_at_error_verbosity() {
        let cmd = probe_audio_command(&p("/w/original.mp4"));
        assert_eq!(cmd.tool, Tool::Ffprobe);
        assert_eq!(cmd.values_of("-select_streams"), vec!["a"]);
        assert_eq!(cmd.values_of("-loglevel"), vec!["error"]);
        assert!(cmd.has_arg("-show_streams"));
        assert_eq!(cmd.values_of("-i"), vec!["/w/original.mp4"]);
    }

    #[test]
    fn reverse_with_audio_reverses_both_streams() {
        let cmd = reverse_command(&p("/w/original.mp4"), &p("/w/reversed.mp4"), true);
        assert_eq!(
            cmd.display_string(),
            "ffmpeg -y -i /w/original.mp4 -vf reverse -af areverse /w/reversed.mp4"
        );
    }

    #[test]
    fn reverse_without_audio_omits_audio_filter() {
        let cmd = reverse_command(&p("/w/original.mp4"), &p("/w/reversed.mp4"), false);
        assert_eq!(cmd.values_of("-vf"), vec!["reverse"]);
        assert!(!cmd.has_arg("-af"));
        assert!(!cmd.has_arg("areverse"));
        assert_eq!(cmd.last_arg(), Some("/w/reversed.mp4"));
    }

    #[test]
    fn concat_maps_audio_only_when_present() {
        let with_audio = concat_command(&p("a.mp4"), &p("b.mp4"), &p("out.mp4"), true);
        assert_eq!(with_audio.values_of("-map"), vec![VIDEO_OUT_LABEL, AUDIO_OUT_LABEL]);
        assert_eq!(with_audio.values_of("-filter_complex"), vec![CONCAT_GRAPH_WITH_AUDIO]);

        let silent = concat_command(&p("a.mp4"), &p("b.mp4"), &p("out.mp4"), false);
        assert_eq!(silent.values_of("-map"), vec![VIDEO_OUT_LABEL]);
        assert_eq!(silent.values_of("-filter_complex"), vec![CONCAT_GRAPH_VIDEO_ONLY]);
    }

    #[test]
    fn concat_keeps_original_before_reversed() {
        let cmd = concat_command(&p("orig.mp4"), &p("rev.mp4"), &p("out.mp4"), false);
        assert_eq!(cmd.values_of("-i"), vec!["orig.mp4", "rev.mp4"]);
    }

    #[test]
    fn display_quotes_filter_graphs() {
        let cmd = concat_command(&p("a.mp4"), &p("b.mp4"), &p("out.mp4"), false);
        let shown = cmd.display_string();
        assert!(shown.contains("-filter_complex \"[0:v][1:v]concat=n=2:v=1[outv]\""));
        assert!(shown.contains("-map \"[outv]\""));
    }
}
