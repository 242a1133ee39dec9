//! Per-unit logger with file output.
//!
//! Each unit gets its own logger that:
//! - Writes to a dedicated log file (when a log directory is configured)
//! - Mirrors every message to `tracing`, tagged with the unit name

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, MessagePrefix};

/// Logger for one retiming unit.
pub struct UnitLogger {
    /// Unit name for identification.
    unit_name: String,
    /// Path to log file, if file output is enabled.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Logging configuration.
    config: LogConfig,
}

impl UnitLogger {
    /// Create a logger writing to `<log_dir>/<unit_name>.log`.
    ///
    /// With `log_dir == None` the logger only forwards to `tracing`.
    pub fn new(
        unit_name: impl Into<String>,
        log_dir: Option<&Path>,
        config: LogConfig,
    ) -> std::io::Result<Self> {
        let unit_name = unit_name.into();

        let (log_path, writer) = match log_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}.log", sanitize_filename(&unit_name)));
                let file = File::create(&path)?;
                (Some(path), Some(BufWriter::new(file)))
            }
            None => (None, None),
        };

        Ok(Self {
            unit_name,
            log_path,
            file_writer: Mutex::new(writer),
            config,
        })
    }

    /// Logger that only forwards to `tracing`.
    pub fn tracing_only(unit_name: impl Into<String>, config: LogConfig) -> Self {
        Self {
            unit_name: unit_name.into(),
            log_path: None,
            file_writer: Mutex::new(None),
            config,
        }
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.forward(level, message);

        if level < self.config.level {
            return;
        }
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", self.format_message(message));
        }
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Section.format(section_name));
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn forward(&self, level: LogLevel, message: &str) {
        let unit = self.unit_name.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(unit = %unit, "{}", message),
            LogLevel::Debug => tracing::debug!(unit = %unit, "{}", message),
            LogLevel::Info => tracing::info!(unit = %unit, "{}", message),
            LogLevel::Warn => tracing::warn!(unit = %unit, "{}", message),
            LogLevel::Error => tracing::error!(unit = %unit, "{}", message),
        }
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }
}

impl Drop for UnitLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
