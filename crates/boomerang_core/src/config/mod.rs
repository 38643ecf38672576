//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use boomerang_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new(".boomerang/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Album: {}", config.settings().gallery.album);
//!
//! config.settings_mut().logging.compact = false;
//! config.save().unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    CaptureSettings, ConfigSection, GallerySettings, LoggingSettings, PathSettings, Settings,
    ToolSettings,
};
