//! Configuration management for Dragon Radar.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults for anything missing from the file
//!
//! # Example
//!
//! ```no_run
//! use radar_core::config::{ConfigManager, ConfigSection};
//! use radar_core::logging::LogLevel;
//!
//! let mut config = ConfigManager::new(ConfigManager::DEFAULT_FILE);
//! config.load_or_create().unwrap();
//!
//! println!("Frame rate: {}", config.settings().retime.frame_rate);
//!
//! config.settings_mut().logging.level = LogLevel::Debug;
//! config.update_section(ConfigSection::Logging).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, LoggingSettings, PathSettings, RetimeSettings, Settings, ToolSettings,
};
