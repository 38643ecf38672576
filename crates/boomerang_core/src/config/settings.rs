//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::CameraFacing;
use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Working, gallery and log locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// External media toolchain binaries.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Album persistence.
    #[serde(default)]
    pub gallery: GallerySettings,

    /// Recording defaults.
    #[serde(default)]
    pub capture: CaptureSettings,
}

/// Path configuration for the scratch directory, gallery and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Scratch directory owned by the pipeline.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Root under which each album is a directory.
    #[serde(default = "default_gallery_root")]
    pub gallery_root: String,

    /// Folder for per-run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_work_dir() -> String {
    ".boomerang/work".to_string()
}

fn default_gallery_root() -> String {
    ".boomerang/gallery".to_string()
}

fn default_logs_folder() -> String {
    ".boomerang/logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            gallery_root: default_gallery_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Locations of the ffmpeg and ffprobe executables.
///
/// Bare names are resolved through `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written to the run log.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep tool output in the tail buffer only, instead of echoing every line.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines shown when a stage fails.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix log lines with a wall-clock timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Also log every tool invocation as a JSON argument vector.
    #[serde(default)]
    pub show_commands_json: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
            show_commands_json: false,
        }
    }
}

/// Album persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GallerySettings {
    /// Album that finished boomerangs are added to.
    #[serde(default = "default_album")]
    pub album: String,

    /// Save to the album as soon as processing succeeds.
    #[serde(default)]
    pub save_after_processing: bool,
}

fn default_album() -> String {
    "mini-when-videos".to_string()
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            album: default_album(),
            save_after_processing: false,
        }
    }
}

/// Recording defaults handed to the capture state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Length of the fixed recording window, in milliseconds.
    #[serde(default = "default_clip_duration_ms")]
    pub clip_duration_ms: u64,

    #[serde(default)]
    pub facing: CameraFacing,

    #[serde(default = "default_true")]
    pub mute: bool,
}

fn default_clip_duration_ms() -> u64 {
    2000
}

impl CaptureSettings {
    pub fn clip_duration(&self) -> Duration {
        Duration::from_millis(self.clip_duration_ms)
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            clip_duration_ms: default_clip_duration_ms(),
            facing: CameraFacing::default(),
            mute: true,
        }
    }
}

impl Settings {
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.work_dir)
    }

    pub fn gallery_root(&self) -> PathBuf {
        PathBuf::from(&self.paths.gallery_root)
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.logs_folder)
    }
}

/// Configuration sections (for section-level validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Tools,
    Logging,
    Gallery,
    Capture,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Tools,
        ConfigSection::Logging,
        ConfigSection::Gallery,
        ConfigSection::Capture,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Logging => "logging",
            ConfigSection::Gallery => "gallery",
            ConfigSection::Capture => "capture",
        }
    }

    /// Comment written above the section in generated config files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Working, gallery and log directories",
            ConfigSection::Tools => "# External media toolchain",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Gallery => "# Album persistence",
            ConfigSection::Capture => "# Recording defaults",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[tools]"));
        assert!(toml.contains("[gallery]"));
        assert!(toml.contains("mini-when-videos"));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let settings: Settings = toml::from_str("[tools]\nffmpeg_path = \"/opt/ffmpeg\"\n").unwrap();
        assert_eq!(settings.tools.ffmpeg_path, "/opt/ffmpeg");
        assert_eq!(settings.tools.ffprobe_path, "ffprobe");
        assert_eq!(settings.capture.clip_duration(), Duration::from_secs(2));
        assert_eq!(settings.capture.facing, CameraFacing::Front);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }

    #[test]
    fn section_table_names_are_unique() {
        let mut names: Vec<_> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigSection::ALL.len());
    }
}
