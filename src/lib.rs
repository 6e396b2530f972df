//! # Rust Structured Logger
//!
//! A synchronous structured logger: entries carry typed fields, levels are
//! set per module, hooks can enrich entries before they are formatted, and
//! errors attach their stack trace and context automatically.
//!
//! ## Features
//!
//! - **Immutable chaining**: `with_field`, `with_error` and friends return new
//!   entries and never touch the one they were called on
//! - **Module levels**: `"db:debug, http:warn, info"` style level specs
//! - **Hooks**: per-level observers that may add fields
//! - **Formatters**: text, logfmt and JSON
//!
//! ```
//! use rust_structured_logger::prelude::*;
//!
//! let output = MemoryOutput::new();
//! let logger = Logger::builder().output(output.clone()).build();
//!
//! logger.with_field("user", "alice").info("logged in");
//! assert!(output.as_string().contains("logged in user=alice"));
//! ```

pub mod core;
pub mod formatters;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Entry, ErrorGenerator, FieldValue, Fields, Formatter, Hook, LevelHooks, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, MemoryOutput, Result,
        StructuredError, TimestampFormat,
    };
    pub use crate::formatters::{JsonFormatter, LogfmtFormatter, OutputFormat, TextFormatter};
}

pub use core::{
    Entry, ErrorGenerator, FieldValue, Fields, Formatter, Hook, LevelHooks, LevelRegistry,
    LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, MemoryOutput,
    Result, SharedError, StackTrace, StructuredError, TimestampFormat, FATAL_EXIT_CODE,
};
pub use formatters::{JsonFormatter, LogfmtFormatter, OutputFormat, TextFormatter};
