//! Pipeline configuration for the SAME decoder/encoder.
//!
//! [`PipelineConfig`] is the single TOML-serializable struct the CLI and any
//! embedder load at startup; [`validation::validate_config`] enforces the
//! range and vocabulary constraints each field is subject to.

mod error;
/// Range and vocabulary validation for [`PipelineConfig`].
pub mod validation;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use validation::{ValidationError, ValidationResult, validate_config};

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_sample_rate() -> u32 {
    22050
}
fn default_silence_floor_dbfs() -> f32 {
    -50.0
}
fn default_silence_window_sec() -> f32 {
    5.0
}
fn default_recovery_window_sec() -> f32 {
    10.0
}
fn default_ring_buffer_sec() -> f32 {
    5.0
}
fn default_dedup_window_sec() -> f32 {
    3600.0
}
/// Discard decodes below half confidence by default rather than emitting
/// everything the triplet vote can salvage.
fn default_min_confidence_emit() -> f32 {
    0.5
}
/// Eight seconds, matching the two-tone attention signal's typical
/// minimum broadcast duration.
fn default_attention_seconds() -> f32 {
    8.0
}
fn default_inter_burst_silence_sec() -> f32 {
    1.0
}

/// Top-level pipeline configuration, covering source management, decoding
/// thresholds, deduplication, and header field allowlists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Pipeline-wide sample rate in Hz; every source is resampled to this
    /// rate before reaching the decoder.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Level, in dBFS, below which a source is considered silent.
    #[serde(default = "default_silence_floor_dbfs")]
    pub silence_floor_dbfs: f32,

    /// How long a source may remain below the silence floor before the
    /// manager treats it as unhealthy.
    #[serde(default = "default_silence_window_sec")]
    pub silence_window_sec: f32,

    /// How long a higher-priority source must be continuously healthy
    /// before the manager fails back to it.
    #[serde(default = "default_recovery_window_sec")]
    pub recovery_window_sec: f32,

    /// Size of the backpressure ring buffer, in seconds of audio.
    #[serde(default = "default_ring_buffer_sec")]
    pub ring_buffer_sec: f32,

    /// Window over which identical activations are deduplicated.
    #[serde(default = "default_dedup_window_sec")]
    pub dedup_window_sec: f32,

    /// Minimum confidence (after triplet majority voting) required before
    /// an activation is emitted rather than discarded.
    #[serde(default = "default_min_confidence_emit")]
    pub min_confidence_emit: f32,

    /// Duration of the two-tone attention signal the encoder appends after
    /// the header and the decoder expects before the voice message.
    #[serde(default = "default_attention_seconds")]
    pub attention_seconds: f32,

    /// Minimum silence, in seconds, required between two header bursts for
    /// them to be treated as distinct activations rather than one burst's
    /// header repeated three times. Must be `>= 1.0`.
    #[serde(default = "default_inter_burst_silence_sec")]
    pub inter_burst_silence_sec: f32,

    /// Allowlisted originator codes; empty means all four are accepted.
    #[serde(default)]
    pub allowed_originators: Vec<String>,

    /// Allowlisted event codes; empty means every registered code is
    /// accepted.
    #[serde(default)]
    pub allowed_event_codes: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            silence_floor_dbfs: default_silence_floor_dbfs(),
            silence_window_sec: default_silence_window_sec(),
            recovery_window_sec: default_recovery_window_sec(),
            ring_buffer_sec: default_ring_buffer_sec(),
            dedup_window_sec: default_dedup_window_sec(),
            min_confidence_emit: default_min_confidence_emit(),
            attention_seconds: default_attention_seconds(),
            inter_burst_silence_sec: default_inter_burst_silence_sec(),
            allowed_originators: Vec::new(),
            allowed_event_codes: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config: Self = toml::from_str(&content)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Whether `originator` is acceptable per the allowlist (empty allowlist
    /// accepts everything).
    pub fn accepts_originator(&self, originator: &str) -> bool {
        self.allowed_originators.is_empty()
            || self.allowed_originators.iter().any(|o| o == originator)
    }

    /// Whether `event_code` is acceptable per the allowlist (empty allowlist
    /// accepts everything).
    pub fn accepts_event_code(&self, event_code: &str) -> bool {
        self.allowed_event_codes.is_empty()
            || self.allowed_event_codes.iter().any(|e| e == event_code)
    }
}
