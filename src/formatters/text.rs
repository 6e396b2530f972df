//! Human-readable text formatter

use super::{escape_control, quote_if_needed, sorted_fields};
use crate::core::{Entry, Formatter, Result, TimestampFormat};
use chrono::Utc;
use colored::Colorize;
use std::io::Write;

/// `[timestamp] [LEVEL] message key=value ...`, fields sorted by key
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color the level with ANSI escapes
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set the timestamp format for this formatter
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_structured_logger::formatters::TextFormatter;
    /// use rust_structured_logger::TimestampFormat;
    ///
    /// let formatter = TextFormatter::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()> {
        let time = entry.time.unwrap_or_else(Utc::now);
        let level_str = if self.use_colors {
            format!("{:5}", entry.level.to_str())
                .color(entry.level.color_code())
                .to_string()
        } else {
            format!("{:5}", entry.level.to_str())
        };

        write!(
            buf,
            "[{}] [{}] {}",
            self.timestamp_format.format(&time)?,
            level_str,
            escape_control(&entry.message)
        )?;

        for (key, value) in sorted_fields(&entry.data) {
            write!(
                buf,
                " {}={}",
                escape_control(key),
                quote_if_needed(&value.to_string())
            )?;
        }
        buf.push(b'\n');
        Ok(())
    }

    fn name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, Logger};
    use chrono::TimeZone;

    fn entry(level: LogLevel, message: &str) -> Entry {
        let mut entry = Logger::new().entry();
        entry.time = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single();
        entry.level = level;
        entry.message = message.to_string();
        entry
    }

    fn render(formatter: &TextFormatter, entry: &Entry) -> String {
        let mut buf = Vec::new();
        formatter.format(entry, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_format() {
        let result = render(&TextFormatter::new(), &entry(LogLevel::Info, "Test message"));
        assert_eq!(result, "[2025-01-08T10:30:45.000Z] [INFO ] Test message\n");
    }

    #[test]
    fn test_text_format_with_fields() {
        let mut entry = entry(LogLevel::Info, "User logged in");
        entry.add_field("user_id", 123);
        entry.add_field("action", "login");
        entry.add_field("note", "two words");

        let result = render(&TextFormatter::new(), &entry);
        assert!(result.ends_with("User logged in action=login note=\"two words\" user_id=123\n"));
    }

    #[test]
    fn test_newlines_cannot_forge_entries() {
        let mut entry = entry(LogLevel::Warn, "line one\n[2025-01-01] [ERROR] forged");
        entry.add_field("payload", "a\nb");

        let result = render(&TextFormatter::new(), &entry);
        assert_eq!(result.lines().count(), 1);
        assert!(result.contains("line one\\n[2025-01-01]"));
        assert!(result.contains("payload=\"a\\nb\""));
    }

    #[test]
    fn test_custom_timestamp() {
        let formatter = TextFormatter::new().with_custom_timestamp("%d/%b/%Y");
        let result = render(&formatter, &entry(LogLevel::Error, "x"));
        assert!(result.starts_with("[08/Jan/2025] [ERROR] x"));
    }

    #[test]
    fn test_invalid_custom_timestamp_is_an_error() {
        let formatter = TextFormatter::new().with_custom_timestamp("%Q");
        let mut buf = Vec::new();
        let err = formatter
            .format(&entry(LogLevel::Info, "x"), &mut buf)
            .unwrap_err();
        assert!(matches!(err, crate::core::LoggerError::FormatterError { .. }));
    }

    #[test]
    fn test_colors_wrap_level() {
        colored::control::set_override(true);
        let formatter = TextFormatter::new().with_colors(true);
        let result = render(&formatter, &entry(LogLevel::Error, "red"));
        assert!(result.contains("\x1b["));
        assert!(result.contains("red"));
    }
}
