//! Logfmt formatter (key=value pairs)

use super::{quote, quote_if_needed, sorted_fields};
use crate::core::{Entry, FieldValue, Formatter, Result, TimestampFormat};
use chrono::Utc;
use std::io::Write;

/// `timestamp=.. level=.. message=".." key=value ...`
#[derive(Debug, Clone, Default)]
pub struct LogfmtFormatter {
    timestamp_format: TimestampFormat,
}

impl LogfmtFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

/// Keys keep only characters that cannot break the key=value grammar
fn escape_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

impl Formatter for LogfmtFormatter {
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()> {
        let time = entry.time.unwrap_or_else(Utc::now);
        let timestamp = self.timestamp_format.format(&time)?;

        // Message is always quoted
        write!(
            buf,
            "timestamp={} level={} message={}",
            quote_if_needed(&timestamp),
            entry.level.to_str(),
            quote(&entry.message)
        )?;

        for (key, value) in sorted_fields(&entry.data) {
            let formatted = match value {
                FieldValue::String(s) => quote(s),
                FieldValue::Null => "null".to_string(),
                other => quote_if_needed(&other.to_string()).into_owned(),
            };
            write!(buf, " {}={}", escape_key(key), formatted)?;
        }
        buf.push(b'\n');
        Ok(())
    }

    fn name(&self) -> &str {
        "logfmt"
    }
}
