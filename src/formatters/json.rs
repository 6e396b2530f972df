//! JSON formatter for structured logging
//!
//! Writes each entry as a single-line JSON object (JSONL format), compatible
//! with log aggregation tools like ELK, Loki, etc.

use crate::core::{Entry, Formatter, Result, TimestampFormat};
use chrono::Utc;
use serde_json::{Map, Value};

const TIMESTAMP_KEY: &str = "timestamp";
const LEVEL_KEY: &str = "level";
const MESSAGE_KEY: &str = "message";

/// Prefix for user fields that collide with the keys above
const FIELD_PREFIX: &str = "fields.";

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
    timestamp_format: TimestampFormat,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed output; one entry then spans several lines
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn to_value(&self, entry: &Entry) -> Result<Value> {
        let mut json_obj = Map::with_capacity(entry.data.len() + 3);

        // Renamed keys go in last so they win over a user field of the same name.
        let mut renamed = Vec::new();
        for (key, value) in entry.data.iter() {
            match key.as_str() {
                TIMESTAMP_KEY | LEVEL_KEY | MESSAGE_KEY => renamed.push((key, value)),
                _ => {
                    json_obj.insert(key.clone(), value.to_json_value());
                }
            }
        }
        for (key, value) in renamed {
            json_obj.insert(format!("{}{}", FIELD_PREFIX, key), value.to_json_value());
        }

        let time = entry.time.unwrap_or_else(Utc::now);
        json_obj.insert(
            TIMESTAMP_KEY.to_string(),
            self.timestamp_format.format_json(&time)?,
        );
        json_obj.insert(
            LEVEL_KEY.to_string(),
            Value::String(entry.level.to_str().to_string()),
        );
        json_obj.insert(
            MESSAGE_KEY.to_string(),
            Value::String(entry.message.clone()),
        );

        Ok(Value::Object(json_obj))
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()> {
        let value = self.to_value(entry)?;
        if self.pretty {
            serde_json::to_writer_pretty(&mut *buf, &value)?;
        } else {
            serde_json::to_writer(&mut *buf, &value)?;
        }
        buf.push(b'\n');
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
