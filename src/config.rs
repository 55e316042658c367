//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default alarm poll interval.
pub const DEFAULT_ALARM_POLL: Duration = Duration::from_secs(30);

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Name the assistant introduces itself with.
    pub name: String,
    /// Directory holding the collection files and logs.
    pub data_dir: PathBuf,
    /// How often an armed alarm re-reads the wall clock.
    pub alarm_poll_interval: Duration,
    /// External text-to-speech command (e.g. `say`, `espeak`). Text only when unset.
    pub speech_command: Option<String>,
    /// Also write logs to a daily rolling file under `data_dir/logs`.
    pub log_to_file: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Pico".to_string(),
            data_dir: default_data_dir(),
            alarm_poll_interval: DEFAULT_ALARM_POLL,
            speech_command: None,
            log_to_file: false,
        }
    }
}

impl AssistantConfig {
    /// Read the environment and make sure the data directory exists.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::from_lookup(lookup)?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Create `data_dir` and its parents if missing.
    pub fn ensure_data_dir(&self) -> std::result::Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Build configuration from `PICO_*` environment variables.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("PICO_NAME").filter(|s| !s.trim().is_empty()) {
            config.name = name.trim().to_string();
        }

        if let Some(dir) = lookup("PICO_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("PICO_ALARM_POLL_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "PICO_ALARM_POLL_SECS".to_string(),
                message: format!("{e}"),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "PICO_ALARM_POLL_SECS".to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            config.alarm_poll_interval = Duration::from_secs(secs);
        }

        config.speech_command = lookup("PICO_SPEECH_CMD")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(flag) = lookup("PICO_LOG_FILE") {
            config.log_to_file = matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pico-assist")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = AssistantConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.name, "Pico");
        assert_eq!(config.alarm_poll_interval, DEFAULT_ALARM_POLL);
        assert!(config.speech_command.is_none());
        assert!(!config.log_to_file);
    }

    #[test]
    fn reads_overrides() {
        let config = AssistantConfig::from_lookup(lookup_from(&[
            ("PICO_NAME", "Echo"),
            ("PICO_DATA_DIR", "/tmp/pico"),
            ("PICO_ALARM_POLL_SECS", "5"),
            ("PICO_SPEECH_CMD", "espeak"),
            ("PICO_LOG_FILE", "true"),
        ]))
        .unwrap();
        assert_eq!(config.name, "Echo");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pico"));
        assert_eq!(config.alarm_poll_interval, Duration::from_secs(5));
        assert_eq!(config.speech_command.as_deref(), Some("espeak"));
        assert!(config.log_to_file);
    }

    #[test]
    fn rejects_bad_poll_interval() {
        let err = AssistantConfig::from_lookup(lookup_from(&[("PICO_ALARM_POLL_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = AssistantConfig::from_lookup(lookup_from(&[("PICO_ALARM_POLL_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn load_creates_the_data_directory() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("nested/pico");
        let data_str = data.to_string_lossy().to_string();
        let config =
            AssistantConfig::load_with(lookup_from(&[("PICO_DATA_DIR", data_str.as_str())])).unwrap();
        assert_eq!(config.data_dir, data);
        assert!(data.is_dir());
    }

    #[test]
    fn load_reports_config_errors_through_the_top_level_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, "not a directory").unwrap();
        let file_str = file.to_string_lossy().to_string();

        let err = AssistantConfig::load_with(lookup_from(&[("PICO_DATA_DIR", file_str.as_str())]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Io(_))));
        assert!(err.to_string().starts_with("Configuration error: IO error"));

        let err = AssistantConfig::load_with(lookup_from(&[("PICO_ALARM_POLL_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidValue { .. })));
    }
}
