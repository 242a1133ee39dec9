//! Settings struct with TOML-based sections.
//!
//! Each section maps to a TOML table and can be rewritten on its own.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::models::{BitrateId, ScaleRate};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Where audio, assets and scratch space live.
    #[serde(default)]
    pub paths: PathSettings,

    /// External executables.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Retiming parameters.
    #[serde(default)]
    pub retime: RetimeSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root of the per-series source audio tree.
    #[serde(default = "default_source_folder")]
    pub source_folder: String,

    /// Root of the retimed output tree.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-unit working directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-unit log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder holding `blank_<bitrate>.ac3` clips.
    #[serde(default = "default_silence_dir")]
    pub silence_dir: String,

    /// Folder holding `<series>.json` frame data.
    #[serde(default = "default_frame_data_dir")]
    pub frame_data_dir: String,
}

fn default_source_folder() -> String {
    "source".to_string()
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_silence_dir() -> String {
    "ac3".to_string()
}

fn default_frame_data_dir() -> String {
    "data".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source_folder: default_source_folder(),
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            silence_dir: default_silence_dir(),
            frame_data_dir: default_frame_data_dir(),
        }
    }
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// DelayCut executable.
    #[serde(default = "default_delaycut")]
    pub delaycut: String,
}

fn default_delaycut() -> String {
    "delaycut/delaycut".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            delaycut: default_delaycut(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetimeSettings {
    /// Frame rate used for every frame to millisecond conversion.
    #[serde(default)]
    pub frame_rate: ScaleRate,

    /// Bitrate of the source audio, selects the silent clip.
    #[serde(default = "default_bitrate")]
    pub bitrate: BitrateId,

    /// Units retimed in parallel. `1` runs them one after another.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_bitrate() -> BitrateId {
    BitrateId::new("51_448")
}

fn default_jobs() -> usize {
    1
}

impl Default for RetimeSettings {
    fn default() -> Self {
        Self {
            frame_rate: ScaleRate::default(),
            bitrate: default_bitrate(),
            jobs: default_jobs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console and unit log output.
    #[serde(default)]
    pub level: LogLevel,

    /// Write a log file per unit into `paths.logs_folder`.
    #[serde(default = "default_true")]
    pub unit_logs: bool,

    /// Prefix unit log lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            unit_logs: true,
            show_timestamps: true,
        }
    }
}

impl LoggingSettings {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            show_timestamps: self.show_timestamps,
        }
    }
}

impl Settings {
    pub fn silence_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.silence_dir)
    }

    pub fn temp_root(&self) -> PathBuf {
        PathBuf::from(&self.paths.temp_root)
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.logs_folder)
    }

    pub fn delaycut(&self) -> PathBuf {
        PathBuf::from(&self.tools.delaycut)
    }
}

/// Configuration sections for atomic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Tools,
    Retime,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Paths,
        ConfigSection::Tools,
        ConfigSection::Retime,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Tools => "tools",
            ConfigSection::Retime => "retime",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section in generated files.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Source, output and working directories",
            ConfigSection::Tools => "External tools",
            ConfigSection::Retime => "Retiming parameters",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let toml = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[retime]"));
        assert!(toml.contains("frame_rate = \"30000/1001\""));
        assert!(toml.contains("bitrate = \"51_448\""));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.paths.output_folder, settings.paths.output_folder);
        assert_eq!(parsed.retime.frame_rate, ScaleRate::NTSC);
        assert_eq!(parsed.logging.level, LogLevel::Info);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[retime]\nframe_rate = \"24\"\njobs = 4\n";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.retime.frame_rate, ScaleRate::integer(24).unwrap());
        assert_eq!(parsed.retime.jobs, 4);
        assert_eq!(parsed.retime.bitrate, BitrateId::new("51_448"));
        assert_eq!(parsed.paths.temp_root, ".temp");
        assert!(parsed.logging.unit_logs);
    }

    #[test]
    fn decimal_frame_rate_is_accepted() {
        let parsed: Settings = toml::from_str("[retime]\nframe_rate = \"23.976\"\n").unwrap();
        assert_eq!(parsed.retime.frame_rate, ScaleRate::NTSC_FILM);
    }

    #[test]
    fn invalid_frame_rate_is_rejected() {
        assert!(toml::from_str::<Settings>("[retime]\nframe_rate = \"fast\"\n").is_err());
    }

    #[test]
    fn log_config_follows_settings() {
        let logging = LoggingSettings {
            level: LogLevel::Debug,
            unit_logs: false,
            show_timestamps: false,
        };
        let config = logging.log_config();
        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.show_timestamps);
    }

    #[test]
    fn table_names() {
        let names: Vec<_> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        assert_eq!(names, vec!["paths", "tools", "retime", "logging"]);
    }
}
