use crate::error::ConfigError;
use chrono::format::{Item, StrftimeItems};
use std::borrow::Cow;
use std::collections::BTreeMap;

pub const LEVEL_TRACE: i32 = 10;
pub const LEVEL_DEBUG: i32 = 7;
pub const LEVEL_INFO: i32 = 6;
pub const LEVEL_WARN: i32 = 4;
pub const LEVEL_ERROR: i32 = 3;
pub const LEVEL_FATAL: i32 = 2;

/// Default `_t` layout: RFC 3339 with microseconds.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Level number to display name table used for `_l`.
///
/// The encoder does not interpret levels; it only looks names up here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelNames {
    names: BTreeMap<i32, String>,
}

impl LevelNames {
    /// Empty table: every level renders as its number.
    pub fn empty() -> Self {
        LevelNames { names: BTreeMap::new() }
    }

    pub fn with(mut self, level: i32, name: impl Into<String>) -> Self {
        self.names.insert(level, name.into());
        self
    }

    /// Name for `level`, or its decimal number when the table has no entry.
    pub fn name(&self, level: i32) -> Cow<'_, str> {
        match self.names.get(&level) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(level.to_string()),
        }
    }
}

impl Default for LevelNames {
    fn default() -> Self {
        LevelNames::empty()
            .with(LEVEL_TRACE, "TRACE")
            .with(LEVEL_DEBUG, "DEBUG")
            .with(LEVEL_INFO, "INFO")
            .with(LEVEL_WARN, "WARN")
            .with(LEVEL_ERROR, "ERROR")
            .with(LEVEL_FATAL, "FATAL")
    }
}

/// Settings the logger front-end supplies to the encoder.
///
/// **Fields**
/// - `time_format`: chrono strftime string for `_t`.
/// - `level_names`: table resolving `_l`.
#[derive(Clone, Debug)]
pub struct EncoderConfig {
    time_format: String,
    pub level_names: LevelNames,
}

impl EncoderConfig {
    /// Replace the time format.
    ///
    /// **Returns**
    /// - `Err(ConfigError::InvalidTimeFormat)` if chrono cannot parse the
    ///   strftime string.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Result<Self, ConfigError> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidTimeFormat(format));
        }
        self.time_format = format;
        Ok(self)
    }

    pub fn with_level_names(mut self, level_names: LevelNames) -> Self {
        self.level_names = level_names;
        self
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            level_names: LevelNames::default(),
        }
    }
}
