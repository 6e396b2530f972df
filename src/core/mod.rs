//! Core logger types and traits

pub mod buffer_pool;
pub mod config;
pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod exit;
pub mod fields;
pub mod formatter;
pub mod hooks;
pub mod level_registry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output;
pub mod stacktrace;
pub mod structured_error;
pub mod timestamp;

pub use buffer_pool::{BufferPool, PooledBuffer, DEFAULT_POOL_CAPACITY};
pub use config::LoggerConfig;
pub use entry::{error_fields, Entry, ERROR_KEY, MODULE_KEY, STACKTRACE_KEY};
pub use error::{LoggerError, Result};
pub use exit::{ExitHandlers, Terminator, FATAL_EXIT_CODE};
pub use fields::{FieldValue, Fields, SharedError};
pub use formatter::Formatter;
pub use hooks::{Hook, LevelHooks};
pub use level_registry::{
    parse_level_spec, LevelRegistry, BASELINE_LEVEL, DEFAULT_MODULE, WILDCARD_MODULE,
};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output::MemoryOutput;
pub use stacktrace::StackTrace;
pub use structured_error::{ErrorGenerator, StructuredError};
pub use timestamp::TimestampFormat;
