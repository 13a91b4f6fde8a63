//! Application configuration
//!
//! JSON document with generation defaults, mix levels, directory layout and
//! the read retry policy. A missing file means "use the defaults".

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dsp::{MixParams, DEFAULT_AMBIENCE_DB, DEFAULT_AMBIENCE_FADE_SEC, DEFAULT_BINAURAL_DB};
use crate::engine::{RetryPolicy, DEFAULT_SAMPLE_RATE};
use crate::error::{Result, SleepstackError};
use crate::presets::resolve_vibe;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "sleepstack.json";

const MIN_BACKOFF_FACTOR: f64 = 1.0;
const MAX_BACKOFF_FACTOR: f64 = 10.0;

/// Binaural generation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub default_vibe: String,
    pub sample_rate: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_vibe: "calm".to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Mix level defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub binaural_db: f64,
    pub ambience_db: f64,
    pub ambience_fade_sec: f64,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            binaural_db: DEFAULT_BINAURAL_DB,
            ambience_db: DEFAULT_AMBIENCE_DB,
            ambience_fade_sec: DEFAULT_AMBIENCE_FADE_SEC,
        }
    }
}

impl MixConfig {
    pub fn to_params(&self) -> MixParams {
        MixParams::uniform(self.binaural_db, self.ambience_db, self.ambience_fade_sec)
    }
}

/// Directory layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root holding `ambience/<sound>/<sound>_<tier>.wav`
    pub assets_dir: PathBuf,
    /// Root for generated `binaural/` and `mix/` outputs
    pub build_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            build_dir: PathBuf::from("build"),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub generation: GenerationConfig,
    pub mix: MixConfig,
    pub paths: PathsConfig,
    pub read_retry: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            last_updated: None,
            generation: GenerationConfig::default(),
            mix: MixConfig::default(),
            paths: PathsConfig::default(),
            read_retry: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load a config file, falling back to defaults if it does not exist
    ///
    /// # Errors
    /// * `InvalidConfig` - if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|e| SleepstackError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&text).map_err(|e| SleepstackError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the config as pretty JSON, stamping `last_updated`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        self.last_updated = Some(Utc::now());
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SleepstackError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Collect every problem with the current values
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.generation.sample_rate == 0 {
            errors.push("generation.sample_rate must be > 0".to_string());
        }
        if resolve_vibe(&self.generation.default_vibe).is_err() {
            errors.push(format!(
                "generation.default_vibe '{}' is not a known vibe",
                self.generation.default_vibe
            ));
        }
        if !self.mix.binaural_db.is_finite() || !self.mix.ambience_db.is_finite() {
            errors.push("mix levels must be finite dB values".to_string());
        }
        if self.mix.ambience_fade_sec.is_nan() || self.mix.ambience_fade_sec < 0.0 {
            errors.push("mix.ambience_fade_sec must be >= 0".to_string());
        }
        if self.read_retry.max_attempts == 0 {
            errors.push("read_retry.max_attempts must be at least 1".to_string());
        }
        let factor = self.read_retry.backoff_factor;
        if factor.is_nan() || !(MIN_BACKOFF_FACTOR..=MAX_BACKOFF_FACTOR).contains(&factor) {
            errors.push(format!(
                "read_retry.backoff_factor must be in [{}, {}]",
                MIN_BACKOFF_FACTOR, MAX_BACKOFF_FACTOR
            ));
        }

        errors
    }
}
