//! Loading and persisting the settings file.
//!
//! The file on disk is always rewritten from the typed [`Settings`], so a
//! saved file lists every key with its current value, sections in a fixed
//! order, each under a one-line comment. Writes go through a sibling temp
//! file and a rename.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::settings::{ConfigSection, Settings};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not access settings file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Settings file is not valid: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Could not encode settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("No settings file at {}", .0.display())]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the settings file path and the settings read from it.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Nothing is read until [`load`](Self::load) or
    /// [`load_or_create`](Self::load_or_create); until then the settings
    /// are the defaults.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until [`save`](Self::save).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Read the settings file as-is. A missing file is an error.
    pub fn load(&mut self) -> ConfigResult<()> {
        let text = self
            .read_existing()?
            .ok_or_else(|| ConfigError::NotFound(self.config_path.clone()))?;
        self.settings = toml::from_str(&text)?;
        Ok(())
    }

    /// Read the settings file, writing defaults first if there is none.
    ///
    /// An existing file missing keys, or carrying tables this version does
    /// not know, is rewritten in normalized form.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        let Some(text) = self.read_existing()? else {
            tracing::info!("Creating default settings at {}", self.config_path.display());
            self.settings = Settings::default();
            return self.save();
        };

        let (settings, needs_rewrite) = parse_and_clean(&text)?;
        self.settings = settings;
        if needs_rewrite {
            tracing::debug!("Normalizing settings file {}", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    /// Create the work, gallery and log directories.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        for dir in [
            self.settings.work_dir(),
            self.settings.gallery_root(),
            self.settings.logs_folder(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    pub fn save(&self) -> ConfigResult<()> {
        let text = self.render()?;
        self.replace_file(&text)?;
        Ok(())
    }

    fn read_existing(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Settings as TOML, one commented table per section.
    fn render(&self) -> ConfigResult<String> {
        let mut text = String::from("# Boomerang settings\n# Rewritten on save; unknown keys are dropped.\n");

        for section in ConfigSection::ALL {
            let body = match section {
                ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
                ConfigSection::Tools => toml::to_string_pretty(&self.settings.tools)?,
                ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
                ConfigSection::Gallery => toml::to_string_pretty(&self.settings.gallery)?,
                ConfigSection::Capture => toml::to_string_pretty(&self.settings.capture)?,
            };

            text.push('\n');
            text.push_str(section.comment());
            text.push('\n');
            text.push_str(&format!("[{}]\n", section.table_name()));
            text.push_str(body.trim_end());
            text.push('\n');
        }

        Ok(text)
    }

    /// Temp file in the same directory, synced, then renamed over the target.
    fn replace_file(&self, text: &str) -> io::Result<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let staging = self.config_path.with_extension("toml.tmp");
        let mut file = fs::File::create(&staging)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staging, &self.config_path)
    }
}

/// Parse the file and report whether a normalized save would differ.
fn parse_and_clean(text: &str) -> ConfigResult<(Settings, bool)> {
    let raw: toml::Table = text.parse()?;
    let settings: Settings = toml::from_str(text)?;

    let known: Vec<&str> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
    let has_unknown = raw.keys().any(|key| !known.contains(&key.as_str()));

    // Typed settings carry every key; fewer keys on disk means defaults
    // were filled in.
    let full = toml::Value::try_from(&settings)?;
    let table_len = |value: Option<&toml::Value>| {
        value.and_then(|v| v.as_table()).map_or(0, |t| t.len())
    };
    let missing_keys = known
        .iter()
        .any(|name| table_len(raw.get(*name)) < table_len(full.get(*name)));

    Ok((settings, has_unknown || missing_keys))
}
