use afya_core::Profile;
use afya_risk::{HttpScorerConfig, ModelKind, Strategy};
use afya_sim::SimulatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const ENV_ANALYSIS_URL: &str = "AFYA_ANALYSIS_URL";
pub const ENV_PREDICT_URL: &str = "AFYA_PREDICT_URL";
pub const ENV_API_KEY: &str = "AFYA_API_KEY";
pub const ENV_USER_ID: &str = "AFYA_USER_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("analysis window {window} exceeds window capacity {capacity}")]
    WindowTooLarge { window: usize, capacity: usize },
    #[error("min readings {min} exceeds analysis window {window}")]
    MinReadingsTooLarge { min: usize, window: usize },
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
}

/// Monitor settings. Every field has a default, so an empty JSON object is a
/// valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Owner of the stored history rows; random per run when unset.
    pub user_id: Option<Uuid>,
    pub window_capacity: usize,
    pub analysis_interval_ms: u64,
    /// How many of the newest readings each analysis looks at.
    pub analysis_window: usize,
    pub min_readings: usize,
    pub history_max_rows: usize,
    pub model: ModelKind,
    pub strategy: Strategy,
    pub profile: Option<Profile>,
    pub simulator: SimulatorConfig,
    pub remote: HttpScorerConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            window_capacity: 60,
            analysis_interval_ms: 10_000,
            analysis_window: 20,
            min_readings: 5,
            history_max_rows: 100_000,
            model: ModelKind::default(),
            strategy: Strategy::default(),
            profile: None,
            simulator: SimulatorConfig::default(),
            remote: HttpScorerConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies the `AFYA_*` overrides. `lookup` is `std::env::var` in the
    /// binary; blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_ANALYSIS_URL) {
            self.remote.analysis_url = Some(url);
        }
        if let Some(url) = get(ENV_PREDICT_URL) {
            self.remote.predict_url = Some(url);
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.remote.api_key = Some(key);
        }
        if let Some(raw) = get(ENV_USER_ID) {
            let id = raw.trim().parse::<Uuid>().map_err(|_| ConfigError::Env {
                var: ENV_USER_ID,
                value: raw.clone(),
            })?;
            self.user_id = Some(id);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::Zero("window_capacity"));
        }
        if self.analysis_window == 0 {
            return Err(ConfigError::Zero("analysis_window"));
        }
        if self.min_readings == 0 {
            return Err(ConfigError::Zero("min_readings"));
        }
        if self.analysis_interval_ms == 0 {
            return Err(ConfigError::Zero("analysis_interval_ms"));
        }
        if self.simulator.tick_interval_ms == 0 {
            return Err(ConfigError::Zero("simulator.tick_interval_ms"));
        }
        if self.history_max_rows == 0 {
            return Err(ConfigError::Zero("history_max_rows"));
        }
        if self.remote.timeout_ms == 0 {
            return Err(ConfigError::Zero("remote.timeout_ms"));
        }
        if self.analysis_window > self.window_capacity {
            return Err(ConfigError::WindowTooLarge {
                window: self.analysis_window,
                capacity: self.window_capacity,
            });
        }
        if self.min_readings > self.analysis_window {
            return Err(ConfigError::MinReadingsTooLarge {
                min: self.min_readings,
                window: self.analysis_window,
            });
        }
        Ok(())
    }
}
