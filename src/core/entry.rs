//! Log entries
//!
//! An `Entry` is a logger handle plus a set of fields. Chaining methods
//! (`with_field`, `with_error`, ...) never touch the receiver; they return a
//! new entry, so one entry can be built once and logged from many places or
//! threads. The logging methods (`info`, `error`, ...) gate on the entry's
//! module, then emit a private copy of the entry.

use super::diagnostics;
use super::exit::FATAL_EXIT_CODE;
use super::fields::{FieldValue, Fields, SharedError};
use super::level_registry::DEFAULT_MODULE;
use super::log_level::LogLevel;
use super::logger::{Emission, Logger};
use super::stacktrace::StackTrace;
use super::structured_error::{ErrorGenerator, StructuredError};
use super::error::Result;
use chrono::{DateTime, Utc};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Field holding the error attached with `with_error`
pub const ERROR_KEY: &str = "error";

/// Field holding a captured stack trace
pub const STACKTRACE_KEY: &str = "stacktrace";

/// Field naming the module an entry belongs to; drives level gating
pub const MODULE_KEY: &str = "module";

/// Most entries carry a handful of fields
const DEFAULT_FIELD_CAPACITY: usize = 5;

#[derive(Clone)]
pub struct Entry {
    logger: Logger,

    /// Fields set with the `with_*` methods or by hooks
    pub data: Fields,

    /// Set when the entry is emitted
    pub time: Option<DateTime<Utc>>,

    /// Level the entry was emitted at
    pub level: LogLevel,

    /// Message passed to the logging method
    pub message: String,
}

impl Entry {
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.clone(),
            data: Fields::with_capacity(DEFAULT_FIELD_CAPACITY),
            time: None,
            level: LogLevel::default(),
            message: String::new(),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn derive(&self, data: Fields) -> Entry {
        Entry {
            logger: self.logger.clone(),
            data,
            time: None,
            level: LogLevel::default(),
            message: String::new(),
        }
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.derive(self.data.with_field(key, value))
    }

    #[must_use]
    pub fn with_fields<I, K, V>(&self, fields: I) -> Entry
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.derive(self.data.with_fields(fields))
    }

    /// Add `key=value` plus alternating key/value `extras`.
    ///
    /// ```
    /// use rust_structured_logger::prelude::*;
    ///
    /// let logger = Logger::new();
    /// // "attempt" has no value and is kept as null
    /// let extras = [FieldValue::from("retries"), FieldValue::from(3), FieldValue::from("attempt")];
    /// let entry = logger.with("user", "alice", extras);
    /// assert_eq!(entry.data.get("retries"), Some(&FieldValue::Int(3)));
    /// assert_eq!(entry.data.get("attempt"), Some(&FieldValue::Null));
    /// ```
    #[must_use]
    pub fn with<K, V, I>(&self, key: K, value: V, extras: I) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator,
        I::Item: Into<FieldValue>,
    {
        self.derive(self.data.with(key, value, extras))
    }

    /// Tag the entry with a module, which selects its level in the registry
    #[must_use]
    pub fn with_module(&self, name: impl Into<String>) -> Entry {
        self.with_field(MODULE_KEY, name.into())
    }

    /// Attach the current stack trace
    #[must_use]
    pub fn with_stack(&self) -> Entry {
        self.with_field(STACKTRACE_KEY, StackTrace::capture())
    }

    /// Attach an error, its stack trace and, for a [`StructuredError`], its
    /// module name and fields.
    #[must_use]
    pub fn with_error<E>(&self, err: E) -> Entry
    where
        E: StdError + Send + Sync + 'static,
    {
        self.with_dyn_error(Arc::new(err))
    }

    /// [`with_error`](Entry::with_error) for an already shared error
    #[must_use]
    pub fn with_dyn_error(&self, err: SharedError) -> Entry {
        self.with_fields(&error_fields(err))
    }

    /// In-place field insertion, for hooks holding `&mut Entry`
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.data.insert(key, value);
    }

    pub fn add_fields<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        for (key, value) in fields {
            self.data.insert(key, value);
        }
    }

    /// Module named by the `module` field, or the default module
    pub fn module_name(&self) -> &str {
        self.data
            .get(MODULE_KEY)
            .and_then(FieldValue::as_str)
            .unwrap_or(DEFAULT_MODULE)
    }

    /// Whether an entry at `level` would be emitted for this entry's module
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.logger.level(self.module_name())
    }

    /// Format the entry with the logger's formatter without writing it
    pub fn render(&self) -> Result<String> {
        self.logger.render(self)
    }

    /// Error factory carrying this entry's module and fields
    pub fn error_generator(&self) -> ErrorGenerator {
        ErrorGenerator::new(self.module_name()).with_fields(&self.data)
    }

    /// Emit at `level`. Fatal and Panic keep their terminal behavior.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        match level {
            LogLevel::Fatal => self.fatal(message),
            LogLevel::Panic => self.panic(message),
            _ => {
                if self.enabled(level) {
                    self.logger.emit(self.clone(), level, message.into());
                }
            }
        }
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Alias of [`info`](Entry::info)
    #[inline]
    pub fn print(&self, message: impl Into<String>) {
        self.info(message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    /// Alias of [`warn`](Entry::warn)
    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.warn(message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Emit at Fatal, flush the output, run the exit handlers and terminate
    /// with status 1.
    ///
    /// Termination happens even when Fatal is gated out for the module.
    /// This only returns if the logger was built with a terminator that
    /// does not exit.
    pub fn fatal(&self, message: impl Into<String>) {
        if self.enabled(LogLevel::Fatal) {
            self.logger
                .emit(self.clone(), LogLevel::Fatal, message.into());
        }
        if let Err(err) = self.logger.flush() {
            diagnostics::report("Failed to flush output before exit", &err);
        }
        self.logger.exit(FATAL_EXIT_CODE);
    }

    /// Emit at Panic, then unwind with the emitted `Entry` as payload.
    ///
    /// Recover the entry with `payload.downcast_ref::<Entry>()` after
    /// `std::panic::catch_unwind`.
    pub fn panic(&self, message: impl Into<String>) -> ! {
        let message = message.into();
        if self.enabled(LogLevel::Panic) {
            if let Emission::Unwind(entry) =
                self.logger
                    .emit(self.clone(), LogLevel::Panic, message.clone())
            {
                std::panic::panic_any(*entry);
            }
        }
        std::panic::panic_any(message)
    }
}

/// Fields describing `err`.
///
/// For a [`StructuredError`] the error's own fields come first and the
/// reserved keys are written over them: `error`, `stacktrace` (the trace
/// captured with the error) and `module` (when the error is named) always
/// come from the error itself. Any other error gets a trace captured here.
pub fn error_fields(err: SharedError) -> Fields {
    if let Some(structured) = err.downcast_ref::<StructuredError>() {
        let mut fields = structured.fields().clone();
        fields.insert(STACKTRACE_KEY, structured.stack().clone());
        if !structured.name().is_empty() {
            fields.insert(MODULE_KEY, structured.name());
        }
        fields.insert(ERROR_KEY, FieldValue::Error(Arc::clone(&err)));
        return fields;
    }

    let mut fields = Fields::with_capacity(2);
    fields.insert(STACKTRACE_KEY, StackTrace::capture());
    fields.insert(ERROR_KEY, FieldValue::Error(err));
    fields
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("time", &self.time)
            .field("level", &self.level)
            .field("message", &self.message)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::MemoryOutput;

    fn quiet_logger() -> (Logger, MemoryOutput) {
        let output = MemoryOutput::new();
        let logger = Logger::builder().output(output.clone()).build();
        (logger, output)
    }

    #[test]
    fn test_chaining_leaves_parent_untouched() {
        let (logger, _) = quiet_logger();
        let parent = logger.entry();
        let first = parent.with_field("a", 1);
        let second = parent.with_field("a", 2);

        assert!(parent.data.is_empty());
        assert_eq!(first.data.get("a"), Some(&FieldValue::Int(1)));
        assert_eq!(second.data.get("a"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_with_module_sets_gate_module() {
        let (logger, _) = quiet_logger();
        let entry = logger.entry().with_module("db");
        assert_eq!(entry.module_name(), "db");
        assert_eq!(logger.entry().module_name(), DEFAULT_MODULE);
    }

    #[test]
    fn test_non_string_module_uses_default() {
        let (logger, _) = quiet_logger();
        let entry = logger.with_field(MODULE_KEY, 7);
        assert_eq!(entry.module_name(), DEFAULT_MODULE);
    }

    #[test]
    fn test_plain_error_gets_fresh_stack() {
        let (logger, _) = quiet_logger();
        let entry = logger.entry().with_error(std::io::Error::other("disk full"));

        assert_eq!(
            entry.data.get(ERROR_KEY).map(|v| v.to_string()),
            Some("disk full".to_string())
        );
        assert!(entry.data.contains_key(STACKTRACE_KEY));
        assert!(!entry.data.contains_key(MODULE_KEY));
    }

    #[test]
    fn test_structured_error_fields_reused() {
        let (logger, _) = quiet_logger();
        let err = StructuredError::new("storage", "write failed").with_field("path", "/tmp");
        let expected_stack = err.stack().to_string();

        let entry = logger.entry().with_error(err);
        assert_eq!(entry.data.get("path"), Some(&FieldValue::from("/tmp")));
        assert_eq!(entry.data.get(MODULE_KEY), Some(&FieldValue::from("storage")));
        assert_eq!(
            entry.data.get(STACKTRACE_KEY).map(|v| v.to_string()),
            Some(expected_stack)
        );
        assert_eq!(entry.module_name(), "storage");
    }

    #[test]
    fn test_reserved_keys_win_over_attached_fields() {
        let (logger, _) = quiet_logger();
        let err = StructuredError::new("storage", "write failed")
            .with_field(ERROR_KEY, "spoofed")
            .with_field(STACKTRACE_KEY, "spoofed")
            .with_field(MODULE_KEY, "spoofed");

        let entry = logger.entry().with_error(err);
        assert_eq!(
            entry.data.get(ERROR_KEY).map(|v| v.to_string()),
            Some("write failed".to_string())
        );
        assert_ne!(
            entry.data.get(STACKTRACE_KEY).map(|v| v.to_string()),
            Some("spoofed".to_string())
        );
        assert_eq!(entry.data.get(MODULE_KEY), Some(&FieldValue::from("storage")));
    }

    #[test]
    fn test_unnamed_structured_error_omits_module() {
        let (logger, _) = quiet_logger();
        let entry = logger
            .entry()
            .with_error(StructuredError::new("", "anonymous failure"));
        assert!(!entry.data.contains_key(MODULE_KEY));
    }

    #[test]
    fn test_error_generator_carries_context() {
        let (logger, _) = quiet_logger();
        let entry = logger.with_module("billing").with_field("invoice", 42);
        let err = entry.error_generator().error("charge declined");

        assert_eq!(err.name(), "billing");
        assert_eq!(err.fields().get("invoice"), Some(&FieldValue::Int(42)));
    }

    #[test]
    fn test_render_does_not_write() {
        let (logger, output) = quiet_logger();
        let mut entry = logger.with_field("k", "v");
        entry.message = "rendered".to_string();

        let text = entry.render().unwrap();
        assert!(text.contains("rendered"));
        assert!(text.contains("k=v"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_debug_output() {
        let (logger, _) = quiet_logger();
        let debug = format!("{:?}", logger.with_field("k", 1));
        assert!(debug.contains("Entry"));
        assert!(debug.contains("\"k\""));
    }
}
