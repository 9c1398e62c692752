use std::{io::ErrorKind, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.json";

/// Timer settings. Read once at startup from `config.json` in the application directory and
/// overridden by command line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Seconds.
    pub focus_duration: u32,
    /// Seconds.
    pub rest_duration: u32,
    /// Capture a snapshot every this many samples. 0 disables snapshots.
    pub screenshot_interval: u32,
    pub sample_interval_ms: u64,
    pub tick_interval_ms: u64,
    /// Upper bound for session log and project lookups when a session finishes.
    pub collaborator_timeout_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: 25 * 60,
            rest_duration: 5 * 60,
            screenshot_interval: 0,
            sample_interval_ms: 1000,
            tick_interval_ms: 500,
            collaborator_timeout_secs: 5,
        }
    }
}

impl TimerConfig {
    pub fn duration_for(&self, focusing: bool) -> u32 {
        if focusing {
            self.focus_duration
        } else {
            self.rest_duration
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    pub fn validate(self) -> Result<Self> {
        if self.focus_duration == 0 || self.rest_duration == 0 {
            bail!("Focus and rest durations must be positive");
        }
        if self.sample_interval_ms == 0 || self.tick_interval_ms == 0 {
            bail!("Sample and tick intervals must be positive");
        }
        Ok(self)
    }
}

/// Loads `config.json` from `dir`. A missing file yields the defaults.
pub fn load_config(dir: &Path) -> Result<TimerConfig> {
    let path = dir.join(CONFIG_FILE);
    match std::fs::read(&path) {
        Ok(content) => serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse config {path:?}")),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(TimerConfig::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read config {path:?}")),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{load_config, TimerConfig, CONFIG_FILE};

    #[test]
    fn missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(load_config(dir.path())?, TimerConfig::default());
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"focus_duration": 3000, "screenshot_interval": 60}"#,
        )?;

        let config = load_config(dir.path())?;
        assert_eq!(config.focus_duration, 3000);
        assert_eq!(config.screenshot_interval, 60);
        assert_eq!(config.rest_duration, 300);
        assert_eq!(config.tick_interval_ms, 500);
        Ok(())
    }

    #[test]
    fn zero_durations_are_rejected() {
        let config = TimerConfig {
            rest_duration: 0,
            ..TimerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(TimerConfig::default().validate().is_ok());
    }
}
