//! Per-run logger.
//!
//! Every pipeline run gets one. Lines go to the run's log file (if any),
//! an optional callback, and `tracing`. Tool output is kept in a bounded
//! tail so the last lines before a failure can be replayed.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix, ToolStream};

/// Where formatted lines are written.
#[derive(Default)]
struct Sinks {
    file: Option<BufWriter<File>>,
    callback: Option<LogCallback>,
}

impl Sinks {
    fn write(&mut self, line: &str) {
        if let Some(file) = self.file.as_mut() {
            // A failed log write must not fail the run.
            let _ = writeln!(file, "{}", line);
        }
        if let Some(callback) = self.callback.as_ref() {
            callback(line);
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
    }
}

/// Ring of the most recent tool output lines.
struct Tail {
    capacity: usize,
    lines: VecDeque<String>,
}

impl Tail {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::new(),
        }
    }

    fn push(&mut self, line: &str) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }
}

pub struct RunLogger {
    run_name: String,
    log_path: Option<PathBuf>,
    config: LogConfig,
    sinks: Mutex<Sinks>,
    tail: Mutex<Tail>,
}

impl RunLogger {
    /// Log to `<log_dir>/<run_name>.log`, creating the directory if needed.
    pub fn new(
        run_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> io::Result<Self> {
        let run_name = run_name.into();
        fs::create_dir_all(log_dir.as_ref())?;

        let log_path = log_dir
            .as_ref()
            .join(format!("{}.log", sanitize_filename(&run_name)));
        let file = File::create(&log_path)?;

        let logger = Self::build(run_name, Some(log_path), config);
        {
            let mut sinks = logger.sinks.lock();
            sinks.file = Some(BufWriter::new(file));
            sinks.callback = callback;
        }
        Ok(logger)
    }

    /// Logger with no file; lines reach `tracing` and the callback only.
    pub fn detached(run_name: impl Into<String>, config: LogConfig) -> Self {
        Self::build(run_name.into(), None, config)
    }

    fn build(run_name: String, log_path: Option<PathBuf>, config: LogConfig) -> Self {
        Self {
            run_name,
            log_path,
            sinks: Mutex::new(Sinks::default()),
            tail: Mutex::new(Tail::new(config.error_tail)),
            config,
        }
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn set_callback(&self, callback: LogCallback) {
        self.sinks.lock().callback = Some(callback);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let run = self.run_name.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(run, "{}", message),
            LogLevel::Debug => tracing::debug!(run, "{}", message),
            LogLevel::Info => tracing::info!(run, "{}", message),
            LogLevel::Warn => tracing::warn!(run, "{}", message),
            LogLevel::Error => tracing::error!(run, "{}", message),
        }

        if level >= self.config.level {
            self.emit(message);
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// `$ <command>`
    pub fn command(&self, command: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Command.format(command));
    }

    /// `=== <stage> ===`
    pub fn stage(&self, stage_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Stage.format(stage_name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Argument vector as pretty JSON, at debug level.
    pub fn command_json(&self, args: &[String]) {
        match serde_json::to_string_pretty(args) {
            Ok(json) => self.debug(&json),
            Err(e) => tracing::warn!("Could not encode arguments: {}", e),
        }
    }

    /// One line of tool output. Always kept in the tail; written out as
    /// well unless the logger is compact.
    pub fn output_line(&self, line: &str, stream: ToolStream) {
        self.tail.lock().push(line);

        if !self.config.compact {
            match stream {
                ToolStream::Stdout => self.emit(line),
                ToolStream::Stderr => self.emit(&format!("[stderr] {}", line)),
            }
        }
    }

    /// Replay the tail under a `[<header>/tail]` marker.
    pub fn show_tail(&self, header: &str) {
        let lines = self.tail_lines();
        if lines.is_empty() {
            return;
        }

        self.emit(&format!("[{}/tail]", header));
        for line in &lines {
            self.emit(line);
        }
    }

    pub fn clear_tail(&self) {
        self.tail.lock().lines.clear();
    }

    pub fn tail_lines(&self) -> Vec<String> {
        self.tail.lock().lines.iter().cloned().collect()
    }

    pub fn flush(&self) {
        self.sinks.lock().flush();
    }

    /// Flush and release the log file. Later lines reach the callback only.
    pub fn close(&self) {
        let mut sinks = self.sinks.lock();
        sinks.flush();
        sinks.file = None;
    }

    fn emit(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };
        self.sinks.lock().write(&line);
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Replace characters that are not allowed in file names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
