//! Formatter implementations
//!
//! - Text: human-readable format (default)
//! - Logfmt: key-value format compatible with log aggregation tools
//! - Json: one JSON object per line, compact or pretty

pub mod json;
pub mod logfmt;
pub mod text;

pub use json::JsonFormatter;
pub use logfmt::LogfmtFormatter;
pub use text::TextFormatter;

pub use crate::core::Formatter;

use crate::core::{FieldValue, Fields, LoggerError, TimestampFormat};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;

/// Selects a formatter by name, as used in [`LoggerConfig`](crate::LoggerConfig)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [INFO ] Request processed user=alice`
    #[default]
    Text,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO message="Request processed"`
    Logfmt,

    /// Example: `{"level":"INFO","message":"Request processed","timestamp":"2025-01-08T10:30:45.123Z"}`
    Json,

    /// JSON spread over several lines
    JsonPretty,
}

impl OutputFormat {
    pub fn formatter(
        self,
        timestamp_format: TimestampFormat,
        use_colors: bool,
    ) -> Arc<dyn Formatter> {
        match self {
            OutputFormat::Text => Arc::new(
                TextFormatter::new()
                    .with_timestamp_format(timestamp_format)
                    .with_colors(use_colors),
            ),
            OutputFormat::Logfmt => {
                Arc::new(LogfmtFormatter::new().with_timestamp_format(timestamp_format))
            }
            OutputFormat::Json => {
                Arc::new(JsonFormatter::new().with_timestamp_format(timestamp_format))
            }
            OutputFormat::JsonPretty => {
                Arc::new(JsonFormatter::pretty().with_timestamp_format(timestamp_format))
            }
        }
    }
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "logfmt" => Ok(OutputFormat::Logfmt),
            "json" => Ok(OutputFormat::Json),
            "json_pretty" | "json-pretty" => Ok(OutputFormat::JsonPretty),
            other => Err(LoggerError::config(
                "format",
                format!("unknown output format '{}'", other),
            )),
        }
    }
}

/// Fields ordered by key, for deterministic output
pub(crate) fn sorted_fields(fields: &Fields) -> Vec<(&str, &FieldValue)> {
    let mut sorted: Vec<(&str, &FieldValue)> =
        fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    sorted
}

/// Escape line breaks and tabs so an entry cannot forge extra lines
pub(crate) fn escape_control(value: &str) -> Cow<'_, str> {
    if !value.contains(['\n', '\r', '\t']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t"),
    )
}

pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Quote only when the value would otherwise be ambiguous
pub(crate) fn quote_if_needed(value: &str) -> Cow<'_, str> {
    let needs_quoting = value.is_empty()
        || value.contains([' ', '"', '=', '\\'])
        || value.chars().any(char::is_control);
    if needs_quoting {
        Cow::Owned(quote(value))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "json-pretty".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonPretty
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_formatter_names() {
        let ts = TimestampFormat::default();
        assert_eq!(OutputFormat::Text.formatter(ts.clone(), false).name(), "text");
        assert_eq!(OutputFormat::Logfmt.formatter(ts.clone(), false).name(), "logfmt");
        assert_eq!(OutputFormat::JsonPretty.formatter(ts, false).name(), "json");
    }

    #[test]
    fn test_escape_control() {
        assert!(matches!(escape_control("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape_control("a\nb\tc"), "a\\nb\\tc");
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("alice"), "alice");
        assert_eq!(quote_if_needed("two words"), "\"two words\"");
        assert_eq!(quote_if_needed("id=1"), "\"id=1\"");
        assert_eq!(quote_if_needed(""), "\"\"");
        assert_eq!(quote_if_needed("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
