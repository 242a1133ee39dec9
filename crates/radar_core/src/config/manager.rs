//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only the modified table is replaced)
//! - Missing keys are filled with defaults and written back

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

const HEADER: &str = "# Dragon Radar configuration\n\
# Missing keys are filled in with defaults on load.\n\n";

/// Manages application configuration.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Default config file name, resolved against the working directory.
    pub const DEFAULT_FILE: &'static str = "dragon-radar.toml";

    /// Create a manager for `config_path`. Nothing is read until
    /// [`load`](Self::load) or [`load_or_create`](Self::load_or_create).
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

    /// Changes stay in memory until `save()` or `update_section()`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file. Fails if the file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = parse_and_validate(&content)?;
        Ok(())
    }

    /// Load config from file, creating it with defaults if it doesn't exist.
    ///
    /// An existing file missing sections or keys is completed and saved
    /// back; values already present are kept.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            self.settings = parse_and_validate(&content)?;

            if self.fill_missing(&content)? {
                tracing::debug!("Completed config {}", self.config_path.display());
            }
        } else {
            tracing::info!("Creating default config at {}", self.config_path.display());
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Create the output, temp and logs directories if missing.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        let paths = &self.settings.paths;
        for dir in [&paths.output_folder, &paths.temp_root, &paths.logs_folder] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Rewrite one section atomically.
    ///
    /// The file is re-read from disk and only `section`'s table is
    /// replaced, so other sections and their comments are left as they are.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current.trim().is_empty() {
            DocumentMut::new()
        } else {
            current.parse()?
        };

        doc[section.table_name()] = Item::Table(self.section_table(section)?);
        self.atomic_write(&doc.to_string())?;
        Ok(())
    }

    /// Add any section or key that `content` lacks. Returns whether the
    /// file was rewritten.
    fn fill_missing(&self, content: &str) -> ConfigResult<bool> {
        let mut doc: DocumentMut = content.parse()?;
        let mut modified = false;

        for section in ConfigSection::ALL {
            let defaults = self.section_table(section)?;
            let name = section.table_name();

            match doc.get_mut(name).and_then(Item::as_table_mut) {
                Some(existing) => {
                    for (key, value) in defaults.iter() {
                        if !existing.contains_key(key) {
                            existing.insert(key, value.clone());
                            modified = true;
                        }
                    }
                }
                None => {
                    doc[name] = Item::Table(defaults);
                    modified = true;
                }
            }
        }

        if modified {
            self.atomic_write(&doc.to_string())?;
        }
        Ok(modified)
    }

    /// Current values of one section as an editable table.
    fn section_table(&self, section: ConfigSection) -> ConfigResult<toml_edit::Table> {
        let content = self.section_toml(section)?;
        let doc: DocumentMut = content.parse()?;

        let mut table = toml_edit::Table::new();
        for (key, value) in doc.iter() {
            table.insert(key, value.clone());
        }
        Ok(table)
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let s = &self.settings;
        let content = match section {
            ConfigSection::Paths => toml::to_string_pretty(&s.paths)?,
            ConfigSection::Tools => toml::to_string_pretty(&s.tools)?,
            ConfigSection::Retime => toml::to_string_pretty(&s.retime)?,
            ConfigSection::Logging => toml::to_string_pretty(&s.logging)?,
        };
        Ok(content)
    }

    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::from(HEADER);

        for section in ConfigSection::ALL {
            output.push_str(&format!("# {}\n", section.description()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            output.push_str(self.section_toml(section)?.trim_end());
            output.push_str("\n\n");
        }

        Ok(output)
    }

    /// Write `content` to a sibling temp file, then rename over the config.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)
    }
}

/// Parse settings and reject values the engine cannot run with.
fn parse_and_validate(content: &str) -> ConfigResult<Settings> {
    let settings: Settings = toml::from_str(content)?;

    if settings.retime.jobs == 0 {
        return Err(ConfigError::Invalid {
            key: "retime.jobs",
            reason: "must be at least 1".to_string(),
        });
    }
    if settings.retime.bitrate.as_str().is_empty() {
        return Err(ConfigError::Invalid {
            key: "retime.bitrate",
            reason: "must not be empty".to_string(),
        });
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use crate::models::ScaleRate;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join(ConfigManager::DEFAULT_FILE);

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        for table in ["[paths]", "[tools]", "[retime]", "[logging]"] {
            assert!(content.contains(table), "missing {table}");
        }
        assert!(content.starts_with("# Dragon Radar configuration"));

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().retime.frame_rate, ScaleRate::NTSC);
    }

    #[test]
    fn load_or_create_preserves_existing_and_fills_gaps() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dragon-radar.toml");
        fs::write(
            &config_path,
            "# my notes\n[paths]\noutput_folder = \"retimed\"\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().paths.output_folder, "retimed");
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("# my notes"));
        assert!(content.contains("output_folder = \"retimed\""));
        assert!(content.contains("temp_root"));
        assert!(content.contains("[retime]"));
    }

    #[test]
    fn complete_file_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dragon-radar.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();
        let before = fs::read_to_string(&config_path).unwrap();

        let mut again = ConfigManager::new(&config_path);
        again.load_or_create().unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), before);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn zero_jobs_is_invalid() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dragon-radar.toml");
        fs::write(&config_path, "[retime]\njobs = 0\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        assert!(matches!(
            manager.load(),
            Err(ConfigError::Invalid { key: "retime.jobs", .. })
        ));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dragon-radar.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().logging.level = LogLevel::Debug;
        manager.settings_mut().paths.output_folder = "not-saved".to_string();
        manager.update_section(ConfigSection::Logging).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("level = \"debug\""));
        assert!(content.contains("# Source, output and working directories"));
        assert!(!content.contains("not-saved"));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("dragon-radar.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn ensure_dirs_exist_creates_working_folders() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("dragon-radar.toml"));
        let root = dir.path().display().to_string();
        manager.settings_mut().paths.output_folder = format!("{root}/out");
        manager.settings_mut().paths.temp_root = format!("{root}/tmp");
        manager.settings_mut().paths.logs_folder = format!("{root}/logs");

        manager.ensure_dirs_exist().unwrap();

        for name in ["out", "tmp", "logs"] {
            assert!(dir.path().join(name).is_dir());
        }
    }
}
