//! Errors that carry their own logging context
//!
//! A `StructuredError` remembers the stack where it was created, the module
//! that raised it and a set of fields. When such an error is attached to an
//! entry with `Entry::with_error`, all three are reused as-is instead of
//! capturing a new trace at the logging site.

use super::fields::{FieldValue, Fields, SharedError};
use super::stacktrace::StackTrace;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct StructuredError {
    name: String,
    message: String,
    stack: StackTrace,
    fields: Fields,
    source: Option<SharedError>,
}

impl StructuredError {
    /// Create an error for module `name`, capturing the current stack
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: StackTrace::capture(),
            fields: Fields::new(),
            source: None,
        }
    }

    /// Create an error wrapping `source`, capturing the current stack
    pub fn wrap<E>(name: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            stack: StackTrace::capture(),
            fields: Fields::new(),
            source: Some(Arc::new(source)),
        }
    }

    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields = self.fields.with_fields(fields);
        self
    }

    /// Module that raised the error; empty when unknown
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stack captured when the error was created
    pub fn stack(&self) -> &StackTrace {
        &self.stack
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl StdError for StructuredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Factory for `StructuredError`s sharing a module name and base fields
#[derive(Debug, Clone, Default)]
pub struct ErrorGenerator {
    name: String,
    fields: Fields,
}

impl ErrorGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            name: self.name.clone(),
            fields: self.fields.with_field(key, value),
        }
    }

    #[must_use]
    pub fn with_fields<I, K, V>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            name: self.name.clone(),
            fields: self.fields.with_fields(fields),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// New error carrying this generator's name and fields
    pub fn error(&self, message: impl Into<String>) -> StructuredError {
        let mut err = StructuredError::new(self.name.clone(), message);
        err.fields = self.fields.clone();
        err
    }

    /// New error wrapping `source`, carrying this generator's name and fields
    pub fn wrap<E>(&self, message: impl Into<String>, source: E) -> StructuredError
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut err = StructuredError::wrap(self.name.clone(), message, source);
        err.fields = self.fields.clone();
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_display() {
        let err = StructuredError::new("storage", "write failed");
        assert_eq!(err.to_string(), "write failed");
        assert_eq!(err.name(), "storage");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_wrap_keeps_source() {
        let io = std::io::Error::other("disk full");
        let err = StructuredError::wrap("storage", "write failed", io);
        assert_eq!(err.to_string(), "write failed: disk full");
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".to_string()));
    }

    #[test]
    fn test_generator_attaches_name_and_fields() {
        let generator = ErrorGenerator::new("uploader").with_field("bucket", "media");
        let err = generator.error("quota exceeded").with_field("path", "/tmp/a.png");

        assert_eq!(err.name(), "uploader");
        assert_eq!(err.fields().get("bucket"), Some(&FieldValue::from("media")));
        assert_eq!(err.fields().get("path"), Some(&FieldValue::from("/tmp/a.png")));
        assert!(!generator.fields().contains_key("path"));
    }
}
