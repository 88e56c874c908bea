//! Environment variable names used by this crate for convenient
//! configuration of the encoder from services.
//!
//! These are purely helpers; the encoder itself never reads the
//! environment.

use crate::config::{EncoderConfig, DEFAULT_TIME_FORMAT};
use crate::error::ConfigError;

/// chrono strftime string for the `_t` field.
pub const LOG_JSON_TIME_FORMAT_ENV: &str = "LOG_JSON_TIME_FORMAT";

/// Logger name written to `_n`.
pub const LOG_JSON_NAME_ENV: &str = "LOG_JSON_NAME";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl EncoderConfig {
    /// Default configuration with the time format taken from
    /// `LOG_JSON_TIME_FORMAT` when set.
    ///
    /// **Returns**
    /// - `Err(ConfigError::InvalidTimeFormat)` if the variable holds a
    ///   format chrono cannot parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = env_or(LOG_JSON_TIME_FORMAT_ENV, DEFAULT_TIME_FORMAT);
        EncoderConfig::default().with_time_format(format)
    }
}
