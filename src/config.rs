//! Application configuration management.
//!
//! This module handles the persistent configuration for podplay: where the
//! episode listing comes from, the locale used for dates, output volume, the
//! keyboard seek step and the log file location. Configuration is stored in
//! the user's config directory (typically ~/.config/podplay/config.toml) and
//! every field falls back to a default when missing.

use crate::constants::CONFIG_DIR_NAME;
use crate::utils::time::parse_locale;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

pub const CONFIG_KEYS: &[&str] = &[
    "episodes_source",
    "date_locale",
    "volume",
    "seek_step_secs",
    "log_file",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes_source: Option<String>,
    #[serde(default = "default_date_locale")]
    pub date_locale: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: u64,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_date_locale() -> String {
    "pt_BR".to_string()
}

fn default_volume() -> f32 {
    1.0
}

fn default_seek_step_secs() -> u64 {
    10
}

fn default_log_file() -> String {
    std::env::temp_dir()
        .join("podplay.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            episodes_source: None,
            date_locale: default_date_locale(),
            volume: default_volume(),
            seek_step_secs: default_seek_step_secs(),
            log_file: default_log_file(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // XDG_CONFIG_HOME wins so tests can redirect the location
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join(CONFIG_DIR_NAME)
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join(CONFIG_DIR_NAME)
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "episodes_source" => {
                let value = value.trim();
                self.episodes_source = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "date_locale" => {
                parse_locale(value)?;
                self.date_locale = value.trim().to_string();
            }
            "volume" => {
                let volume = value
                    .parse::<f32>()
                    .map_err(|_| "Volume must be a number")?;
                if !(0.0..=2.0).contains(&volume) {
                    return Err("Volume must be between 0.0 and 2.0".into());
                }
                self.volume = volume;
            }
            "seek_step_secs" => {
                let step = value
                    .parse::<u64>()
                    .map_err(|_| "Seek step must be a whole number of seconds")?;
                if step == 0 {
                    return Err("Seek step must be at least 1 second".into());
                }
                self.seek_step_secs = step;
            }
            "log_file" => {
                if value.trim().is_empty() {
                    return Err("Log file path cannot be empty".into());
                }
                self.log_file = shellexpand::tilde(value.trim()).to_string();
            }
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }

    /// Log file location with `~` expanded, however the value was written.
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(self.log_file.trim()).into_owned())
    }

    /// Pick the episode listing to open: an explicit source beats the configured one.
    pub fn resolve_source(&self, explicit: Option<&str>) -> Result<String, Box<dyn Error>> {
        explicit
            .map(str::to_string)
            .or_else(|| self.episodes_source.clone())
            .ok_or_else(|| {
                "No episode listing given. Pass one or run 'podplay config set episodes_source <path-or-url>'"
                    .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests that modify environment variables must not run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_temp_config_home<F: FnOnce(&TempDir)>(f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();

        let temp_dir = TempDir::new().unwrap();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        f(&temp_dir);

        unsafe {
            if let Some(original) = original_xdg {
                std::env::set_var("XDG_CONFIG_HOME", original);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.episodes_source, None);
        assert_eq!(config.date_locale, "pt_BR");
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.seek_step_secs, 10);
        assert!(config.log_file.ends_with("podplay.log"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("volume = 0.5\n").unwrap();
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.date_locale, "pt_BR");
        assert_eq!(config.seek_step_secs, 10);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::new();

        config
            .set_value("episodes_source", "https://example.com/episodes")
            .unwrap();
        assert_eq!(
            config.episodes_source.as_deref(),
            Some("https://example.com/episodes")
        );
        config.set_value("episodes_source", "").unwrap();
        assert_eq!(config.episodes_source, None);

        config.set_value("date_locale", "en_US").unwrap();
        assert_eq!(config.date_locale, "en_US");
        assert!(config.set_value("date_locale", "zz_ZZ").is_err());

        config.set_value("volume", "0.25").unwrap();
        assert_eq!(config.volume, 0.25);
        assert!(config.set_value("volume", "loud").is_err());
        assert!(config.set_value("volume", "3.0").is_err());

        config.set_value("seek_step_secs", "30").unwrap();
        assert_eq!(config.seek_step_secs, 30);
        assert!(config.set_value("seek_step_secs", "0").is_err());
        assert!(config.set_value("seek_step_secs", "-1").is_err());

        config.set_value("log_file", "/var/tmp/p.log").unwrap();
        assert_eq!(config.log_file, "/var/tmp/p.log");
        assert!(config.set_value("log_file", " ").is_err());

        assert!(config.set_value("unknown_key", "value").is_err());
    }

    #[test]
    fn test_log_path_expands_hand_edited_tilde() {
        let config: Config = toml::from_str("log_file = \"~/podplay.log\"\n").unwrap();
        assert_eq!(config.log_file, "~/podplay.log");

        let path = config.log_path();
        assert!(!path.starts_with("~"));
        assert!(path.ends_with("podplay.log"));
        assert_eq!(
            path,
            PathBuf::from(shellexpand::tilde("~/podplay.log").into_owned())
        );
    }

    #[test]
    fn test_resolve_source() {
        let mut config = Config::new();
        assert!(config.resolve_source(None).is_err());
        assert_eq!(config.resolve_source(Some("a.json")).unwrap(), "a.json");

        config.episodes_source = Some("b.json".to_string());
        assert_eq!(config.resolve_source(None).unwrap(), "b.json");
        assert_eq!(config.resolve_source(Some("a.json")).unwrap(), "a.json");
    }

    #[test]
    fn test_config_save_and_load() {
        with_temp_config_home(|temp_dir| {
            let mut config = Config::new();
            config.seek_step_secs = 15;
            config.episodes_source = Some("~/episodes.json".to_string());
            config.save().unwrap();

            let config_path = Config::config_path().unwrap();
            assert!(config_path.exists());
            assert!(config_path.starts_with(temp_dir.path().join("podplay")));

            let loaded = Config::load().unwrap();
            assert_eq!(loaded, config);
        });
    }

    #[test]
    fn test_load_without_file_returns_default() {
        with_temp_config_home(|_| {
            assert!(!Config::exists().unwrap());
            assert_eq!(Config::load().unwrap(), Config::new());
        });
    }
}
