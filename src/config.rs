use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OpwaitError;
use crate::retry::RetryConfig;

const CONFIG_DIR: &str = "opwait";
const CONFIG_FILENAME: &str = "config.json";

/// On-disk configuration, read fresh on every invocation.
///
/// Flags and environment variables take precedence over these values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: Option<String>,
    pub location: Option<String>,
    pub api_endpoint: Option<String>,
    pub access_token: Option<String>,
    pub wait: WaitSettings,
}

/// Polling knobs, all in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub pre_start_sleep_ms: Option<u64>,
    pub sleep_ms: Option<u64>,
    pub exponential_sleep_multiplier: Option<f64>,
    pub jitter_ms: Option<u64>,
    pub wait_ceiling_ms: Option<u64>,
    pub max_wait_ms: Option<u64>,
    pub max_retrials: Option<u32>,
}

impl Config {
    /// `$XDG_CONFIG_HOME/opwait/config.json` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
    }

    /// Loads the config at `path`, or defaults when it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OpwaitError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            OpwaitError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Loads from `path` if given, else from the default location.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, OpwaitError> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::default_path() {
                Some(p) => Self::load(p),
                None => Ok(Self::default()),
            },
        }
    }

    /// Polling schedule with file overrides applied and an optional
    /// command-line timeout replacing `max_wait_ms`.
    pub fn retry_config(&self, timeout: Option<Duration>) -> Result<RetryConfig, OpwaitError> {
        let defaults = RetryConfig::default();
        let wait = &self.wait;

        let multiplier = wait
            .exponential_sleep_multiplier
            .unwrap_or(defaults.multiplier);
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(OpwaitError::Config(format!(
                "exponential_sleep_multiplier must be >= 1.0, got {}",
                multiplier
            )));
        }
        if wait.max_retrials == Some(0) {
            return Err(OpwaitError::Config(
                "max_retrials must be at least 1".to_string(),
            ));
        }

        let ms = Duration::from_millis;
        Ok(RetryConfig {
            pre_start_sleep: wait.pre_start_sleep_ms.map(ms).unwrap_or(defaults.pre_start_sleep),
            sleep: wait.sleep_ms.map(ms).unwrap_or(defaults.sleep),
            multiplier,
            jitter: wait.jitter_ms.map(ms).unwrap_or(defaults.jitter),
            wait_ceiling: wait.wait_ceiling_ms.map(ms).unwrap_or(defaults.wait_ceiling),
            max_wait: timeout.or(wait.max_wait_ms.map(ms)).or(defaults.max_wait),
            max_retrials: wait.max_retrials.or(defaults.max_retrials),
        })
    }
}
