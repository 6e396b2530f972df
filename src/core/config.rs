//! Serializable logger configuration
//!
//! ```
//! use rust_structured_logger::{Logger, LoggerConfig, LogLevel};
//!
//! let config = LoggerConfig::from_json(r#"{"level": "db:debug, warn", "format": "Json"}"#).unwrap();
//! let logger = Logger::from_config(&config).unwrap();
//! assert_eq!(logger.level("db"), LogLevel::Debug);
//! assert_eq!(logger.level("http"), LogLevel::Warn);
//! ```

use super::buffer_pool::DEFAULT_POOL_CAPACITY;
use super::error::{LoggerError, Result};
use super::level_registry::parse_level_spec;
use super::logger::LoggerBuilder;
use super::timestamp::TimestampFormat;
use crate::formatters::OutputFormat;
use serde::{Deserialize, Serialize};

const DEFAULT_LEVEL_SPEC: &str = "*:info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Level spec such as `"db:debug, http:warn, info"`
    pub level: String,
    pub format: OutputFormat,
    pub timestamp_format: TimestampFormat,
    /// Only used by the text format
    pub use_colors: bool,
    pub buffer_pool_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL_SPEC.to_string(),
            format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
            use_colors: false,
            buffer_pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_pool_capacity == 0 {
            return Err(LoggerError::config(
                "buffer_pool_capacity",
                "must be at least 1",
            ));
        }
        self.timestamp_format.validate()?;
        parse_level_spec(&self.level)?;
        Ok(())
    }

    /// Builder preloaded with this configuration; output defaults to stderr
    pub fn into_builder(self) -> Result<LoggerBuilder> {
        self.validate()?;
        let formatter = self.format.formatter(self.timestamp_format, self.use_colors);
        LoggerBuilder::new()
            .shared_formatter(formatter)
            .buffer_pool_capacity(self.buffer_pool_capacity)
            .level_spec(&self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, "*:info");
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.buffer_pool_capacity, DEFAULT_POOL_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LoggerConfig::from_json(r#"{"format": "Logfmt"}"#).unwrap();
        assert_eq!(config.format, OutputFormat::Logfmt);
        assert_eq!(config.level, "*:info");
        assert_eq!(config.timestamp_format, TimestampFormat::Iso8601);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let err = LoggerConfig::from_json(r#"{"level": "db:chatty"}"#).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevelSpec { .. }));
    }

    #[test]
    fn test_zero_pool_rejected() {
        let err = LoggerConfig::from_json(r#"{"buffer_pool_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_invalid_custom_timestamp_rejected() {
        let err = LoggerConfig::from_json(r#"{"timestamp_format": {"Custom": "%Q"}}"#).unwrap_err();
        assert!(matches!(
            err,
            LoggerError::InvalidConfiguration { ref component, .. } if component == "timestamp_format"
        ));

        let config = LoggerConfig {
            timestamp_format: TimestampFormat::Custom("%Y-%".to_string()),
            ..LoggerConfig::default()
        };
        assert!(config.into_builder().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = LoggerConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_into_builder() {
        let config = LoggerConfig {
            level: "db:trace;error".to_string(),
            format: OutputFormat::Json,
            ..LoggerConfig::default()
        };
        let logger = config.into_builder().unwrap().build();
        assert_eq!(logger.level("db"), LogLevel::Trace);
        assert_eq!(logger.level(""), LogLevel::Error);
        assert_eq!(logger.formatter().name(), "json");
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = LoggerConfig {
            timestamp_format: TimestampFormat::Custom("%H:%M".to_string()),
            ..LoggerConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LoggerConfig::from_json(&json).unwrap(), config);
    }
}
