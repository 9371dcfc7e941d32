//! Configuration file support.
//!
//! Both binaries read the same JSON document. Every field has a default, so
//! an empty `{}` (or no file at all) yields a working setup for the standard
//! Raspberry Pi wiring:
//!
//! ```json
//! {
//!   "sensor": {
//!     "pins": { "s0": 5, "s1": 6, "s2": 13, "s3": 19, "out": 26 },
//!     "scaling": "twentyPercent",
//!     "sampleWindowMs": 100,
//!     "settleMs": 100,
//!     "pollIntervalMs": 500
//!   },
//!   "classifier": { "margin": 20, "darkBelow": 50, "brightAbove": 200 },
//!   "store": { "path": "/run/tcs3200/latest.json" },
//!   "web": { "bindAddr": "0.0.0.0:5000", "refreshSecs": 2, "staleAfterSecs": 5 }
//! }
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Classifier;
use crate::model::FrequencyScaling;

/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV: &str = "TCS3200_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `AppConfig`.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration values are inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration shared by reader and web server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub sensor: SensorSettings,
    pub classifier: Classifier,
    pub store: StoreSettings,
    pub web: WebSettings,
}

/// BCM pin numbers for the sensor wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub s0: u8,
    pub s1: u8,
    pub s2: u8,
    pub s3: u8,
    /// Frequency output of the sensor.
    pub out: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            s0: 5,
            s1: 6,
            s2: 13,
            s3: 19,
            out: 26,
        }
    }
}

impl PinConfig {
    fn as_array(&self) -> [u8; 5] {
        [self.s0, self.s1, self.s2, self.s3, self.out]
    }
}

/// Sensor timing and wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorSettings {
    pub pins: PinConfig,
    pub scaling: FrequencyScaling,
    /// Pulse counting window per channel.
    pub sample_window_ms: u64,
    /// Delay after switching filters before counting.
    pub settle_ms: u64,
    /// Pause between polling cycles.
    pub poll_interval_ms: u64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            scaling: FrequencyScaling::default(),
            sample_window_ms: 100,
            settle_ms: 100,
            poll_interval_ms: 500,
        }
    }
}

impl SensorSettings {
    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// JSON file holding the latest reading.
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/run/tcs3200/latest.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSettings {
    pub bind_addr: SocketAddr,
    /// Meta-refresh interval of the page.
    pub refresh_secs: u32,
    /// Readings older than this are flagged as stale.
    pub stale_after_secs: u64,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            refresh_secs: 2,
            stale_after_secs: 5,
        }
    }
}

impl WebSettings {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl AppConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json, path)
    }

    /// Resolve the configuration from an explicit path, then `TCS3200_CONFIG`,
    /// falling back to the built-in defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.sensor.pins.as_array();
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::Invalid(format!(
                    "GPIO {} is assigned to more than one sensor line",
                    pin
                )));
            }
        }
        if self.sensor.sample_window_ms == 0 {
            return Err(ConfigError::Invalid("sampleWindowMs must be positive".into()));
        }
        if self.sensor.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("pollIntervalMs must be positive".into()));
        }
        if self.web.refresh_secs == 0 {
            return Err(ConfigError::Invalid("refreshSecs must be positive".into()));
        }
        Ok(())
    }
}
