//! Service configuration.
//!
//! Hosts hand the configuration over as JSON when the service is provisioned.
//! Every field has a default, so `{}` (or no document at all) is valid.
use serde::{Deserialize, Serialize};

use crate::compression::{
    CompressionError, DEFAULT_LEVEL, DEFAULT_MAX_DECODED_SIZE, MAX_WINDOW_LOG, MIN_WINDOW_LOG,
    POOL_SLOTS_PER_CPU,
};
use crate::utils::validate_level;

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Idle handles kept per kind (encoders, decoders) by the quick-path pool.
    pub pool_capacity: usize,

    /// Largest output a single decompress may produce, in bytes.
    pub max_decoded_size: u64,

    /// Largest window exponent a decoder will accept.
    pub decoder_window_log_max: u32,

    /// Level used when a create or quick compress passes zero or a negative
    /// level. Also reported as the default by `codec_info`.
    pub default_level: i32,

    /// Maximum log verbosity: off, error, warn, info, debug or trace.
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            pool_capacity: num_cpus::get().max(1) * POOL_SLOTS_PER_CPU,
            max_decoded_size: DEFAULT_MAX_DECODED_SIZE,
            decoder_window_log_max: MAX_WINDOW_LOG,
            default_level: DEFAULT_LEVEL,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Parse a JSON document. Empty or whitespace-only input yields defaults.
    pub fn from_json(raw: &[u8]) -> Result<Self, CompressionError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_slice(raw)
            .map_err(|e| CompressionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CompressionError> {
        if self.pool_capacity == 0 {
            return Err(CompressionError::Config("pool_capacity must be at least 1".into()));
        }
        if self.max_decoded_size == 0 {
            return Err(CompressionError::Config("max_decoded_size must be at least 1".into()));
        }
        if !(MIN_WINDOW_LOG..=MAX_WINDOW_LOG).contains(&self.decoder_window_log_max) {
            return Err(CompressionError::Config(format!(
                "decoder_window_log_max must be {}-{}, got {}",
                MIN_WINDOW_LOG, MAX_WINDOW_LOG, self.decoder_window_log_max
            )));
        }
        validate_level(self.default_level)
            .map_err(|e| CompressionError::Config(format!("default_level: {}", e)))?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(CompressionError::Config(format!(
                "log_level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.log_level
            )));
        }
        Ok(())
    }
}
