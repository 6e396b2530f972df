//! Main logger implementation
//!
//! A `Logger` is a cheap handle (`Clone` shares everything) over the level
//! registry, hooks, formatter, output, buffer pool and exit handlers. All
//! configuration can change while other threads are logging.
//!
//! Emission order for one entry: stamp time, level and message; fire the
//! hooks for the level; format into a pooled buffer; write the buffer under
//! the output lock. Failures in any step are reported on stderr and counted
//! in [`LoggerMetrics`]; they never reach the caller.

use super::{
    buffer_pool::{BufferPool, DEFAULT_POOL_CAPACITY},
    config::LoggerConfig,
    diagnostics,
    entry::Entry,
    error::{LoggerError, Result},
    exit::{process_terminator, ExitHandlers, Terminator},
    fields::{FieldValue, SharedError},
    formatter::Formatter,
    hooks::{Hook, LevelHooks},
    level_registry::{parse_level_spec, LevelRegistry, DEFAULT_MODULE, WILDCARD_MODULE},
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use crate::formatters::TextFormatter;
use arc_swap::ArcSwap;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::io::{self, Write};
use std::sync::Arc;

/// What the caller of [`Logger::emit`] must do after the entry is written
pub(crate) enum Emission {
    Completed,
    /// Panic level: unwind with this entry
    Unwind(Box<Entry>),
}

struct LoggerInner {
    registry: LevelRegistry,
    hooks: ArcSwap<LevelHooks>,
    formatter: RwLock<Arc<dyn Formatter>>,
    /// Held only for the write itself
    out: Mutex<Box<dyn Write + Send>>,
    pool: BufferPool,
    metrics: LoggerMetrics,
    exit: ExitHandlers,
}

#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Logger writing text to stderr at Info and above
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a new builder for fluent Logger construction
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        Ok(config.clone().into_builder()?.build())
    }

    /// Fresh entry with no fields
    pub fn entry(&self) -> Entry {
        Entry::new(self)
    }

    /// Effective minimum level for `module`
    #[inline]
    pub fn level(&self, module: &str) -> LogLevel {
        self.inner.registry.effective_level(module)
    }

    pub fn set_level(&self, module: impl Into<String>, level: LogLevel) {
        self.inner.registry.set_level(module, level);
    }

    /// Set the level of every module without an explicit mapping
    pub fn set_min_level(&self, level: LogLevel) {
        self.inner.registry.set_level(WILDCARD_MODULE, level);
    }

    /// Replace the level table, see [`LevelRegistry::set_level_from_spec`]
    pub fn set_level_from_spec(&self, spec: &str) -> Result<()> {
        self.inner.registry.set_level_from_spec(spec)
    }

    pub fn registry(&self) -> &LevelRegistry {
        &self.inner.registry
    }

    /// Whether an entry without a module would be emitted at `level`
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level(DEFAULT_MODULE)
    }

    pub fn add_hook<H: Hook + 'static>(&self, hook: H) {
        let hook: Arc<dyn Hook> = Arc::new(hook);
        self.inner.hooks.rcu(|current| {
            let mut next = LevelHooks::clone(current);
            next.add(Arc::clone(&hook));
            next
        });
    }

    /// Swap in a new hook set, returning the previous one
    pub fn replace_hooks(&self, hooks: LevelHooks) -> Arc<LevelHooks> {
        self.inner.hooks.swap(Arc::new(hooks))
    }

    pub fn hooks(&self) -> Arc<LevelHooks> {
        self.inner.hooks.load_full()
    }

    pub fn formatter(&self) -> Arc<dyn Formatter> {
        self.inner.formatter.read().clone()
    }

    pub fn set_formatter<F: Formatter + 'static>(&self, formatter: F) {
        *self.inner.formatter.write() = Arc::new(formatter);
    }

    /// Replace the output. Entries already being written finish on the old one.
    pub fn set_output<W: Write + Send + 'static>(&self, output: W) {
        *self.inner.out.lock() = Box::new(output);
    }

    /// Get a reference to the logger's metrics
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.inner.pool
    }

    pub fn flush(&self) -> Result<()> {
        self.inner
            .out
            .lock()
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing", "output flush failed", e))
    }

    /// Run `handler` when a Fatal entry terminates the process
    pub fn register_exit_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.exit.register(handler);
    }

    /// Like [`register_exit_handler`](Logger::register_exit_handler), but the
    /// handler runs before those already registered
    pub fn defer_exit_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.exit.defer_register(handler);
    }

    /// Run the exit handlers, then terminate with `code`
    pub fn exit(&self, code: i32) {
        self.inner.exit.exit(code);
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.entry().with_field(key, value)
    }

    #[must_use]
    pub fn with_fields<I, K, V>(&self, fields: I) -> Entry
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.entry().with_fields(fields)
    }

    #[must_use]
    pub fn with<K, V, I>(&self, key: K, value: V, extras: I) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator,
        I::Item: Into<FieldValue>,
    {
        self.entry().with(key, value, extras)
    }

    #[must_use]
    pub fn with_module(&self, name: impl Into<String>) -> Entry {
        self.entry().with_module(name)
    }

    #[must_use]
    pub fn with_stack(&self) -> Entry {
        self.entry().with_stack()
    }

    #[must_use]
    pub fn with_error<E>(&self, err: E) -> Entry
    where
        E: StdError + Send + Sync + 'static,
    {
        self.entry().with_error(err)
    }

    #[must_use]
    pub fn with_dyn_error(&self, err: SharedError) -> Entry {
        self.entry().with_dyn_error(err)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if level.is_terminal() || self.enabled(level) {
            self.entry().log(level, message);
        }
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn print(&self, message: impl Into<String>) {
        self.info(message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.warn(message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// See [`Entry::fatal`]
    pub fn fatal(&self, message: impl Into<String>) {
        self.entry().fatal(message);
    }

    /// See [`Entry::panic`]
    pub fn panic(&self, message: impl Into<String>) -> ! {
        self.entry().panic(message)
    }

    /// Stamp, hook, format and write `entry`. The caller has already gated it.
    pub(crate) fn emit(&self, mut entry: Entry, level: LogLevel, message: String) -> Emission {
        let inner = &*self.inner;
        entry.time = Some(Utc::now());
        entry.level = level;
        entry.message = message;

        // Hooks may log through this logger; no lock is held while they run.
        let hooks = inner.hooks.load_full();
        for err in hooks.fire(level, &mut entry) {
            inner.metrics.record_hook_failure();
            diagnostics::report("Failed to fire hook", &err);
        }

        let mut buf = inner.pool.get();
        let formatter = self.formatter();
        match formatter.format(&entry, &mut buf) {
            Ok(()) => match inner.write(&buf) {
                Ok(()) => {
                    inner.metrics.record_logged();
                }
                Err(err) => {
                    inner.metrics.record_write_failure();
                    let err = LoggerError::io_operation("writing", "output rejected entry", err);
                    diagnostics::report("Failed to write to output", &err);
                }
            },
            Err(err) => {
                inner.metrics.record_format_failure();
                diagnostics::report(
                    &format!("Failed to format entry with '{}'", formatter.name()),
                    &err,
                );
            }
        }
        drop(buf);

        if level == LogLevel::Panic {
            Emission::Unwind(Box::new(entry))
        } else {
            Emission::Completed
        }
    }

    pub(crate) fn render(&self, entry: &Entry) -> Result<String> {
        let mut buf = self.inner.pool.get();
        self.formatter().format(entry, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl LoggerInner {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock();
        out.write_all(bytes)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("registry", &self.inner.registry)
            .field("hooks", &self.hooks())
            .field("formatter", &self.formatter().name())
            .field("metrics", &self.inner.metrics)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let output = MemoryOutput::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .level("db", LogLevel::Warn)
///     .formatter(JsonFormatter::new())
///     .output(output.clone())
///     .build();
///
/// logger.with_module("db").info("hidden");
/// logger.debug("shown");
/// assert_eq!(output.lines().len(), 1);
/// ```
pub struct LoggerBuilder {
    levels: HashMap<String, LogLevel>,
    formatter: Option<Arc<dyn Formatter>>,
    output: Option<Box<dyn Write + Send>>,
    hooks: LevelHooks,
    buffer_pool_capacity: usize,
    terminator: Option<Terminator>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            levels: HashMap::new(),
            formatter: None,
            output: None,
            hooks: LevelHooks::new(),
            buffer_pool_capacity: DEFAULT_POOL_CAPACITY,
            terminator: None,
        }
    }

    /// Set the level of every module without an explicit mapping
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.levels.insert(WILDCARD_MODULE.to_string(), level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, module: impl Into<String>, level: LogLevel) -> Self {
        self.levels.insert(module.into(), level);
        self
    }

    /// Replace the level table configured so far with a parsed spec
    pub fn level_spec(mut self, spec: &str) -> Result<Self> {
        self.levels = parse_level_spec(spec)?;
        Ok(self)
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(self, formatter: F) -> Self {
        self.shared_formatter(Arc::new(formatter))
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Where formatted entries go; stderr by default
    #[must_use = "builder methods return a new value"]
    pub fn output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.add(Arc::new(hook));
        self
    }

    /// Maximum number of idle formatting buffers kept for reuse
    #[must_use = "builder methods return a new value"]
    pub fn buffer_pool_capacity(mut self, capacity: usize) -> Self {
        self.buffer_pool_capacity = capacity;
        self
    }

    /// Replace `std::process::exit` as the final step of a Fatal entry
    #[must_use = "builder methods return a new value"]
    pub fn terminator<F>(mut self, terminator: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.terminator = Some(Arc::new(terminator));
        self
    }

    /// Build the Logger with configured settings
    pub fn build(self) -> Logger {
        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(TextFormatter::new()));
        let output = self
            .output
            .unwrap_or_else(|| Box::new(io::stderr()));
        let terminator = self.terminator.unwrap_or_else(process_terminator);

        Logger {
            inner: Arc::new(LoggerInner {
                registry: LevelRegistry::with_levels(self.levels),
                hooks: ArcSwap::from_pointee(self.hooks),
                formatter: RwLock::new(formatter),
                out: Mutex::new(output),
                pool: BufferPool::new(self.buffer_pool_capacity),
                metrics: LoggerMetrics::new(),
                exit: ExitHandlers::new(terminator),
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
