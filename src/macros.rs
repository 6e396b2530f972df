//! Logging macros for ergonomic log message formatting.
//!
//! These macros take a `Logger` or an `Entry` and format like `format!`.
//! The message is only formatted when the entry's level is enabled, so
//! arguments of disabled calls cost nothing but the level check.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // On an entry with fields
//! let user_id = 42;
//! info!(logger.with_field("user_id", user_id), "User performed action: {}", "login");
//! ```

/// Log a message at the given level.
///
/// Fatal and Panic keep their terminal behavior, as with
/// [`Entry::log`](crate::Entry::log).
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let target = &$logger;
        let level: $crate::LogLevel = $level;
        if level.is_terminal() || target.enabled(level) {
            target.log(level, format!($($arg)+));
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new();
/// # logger.set_min_level(LogLevel::Trace);
/// use rust_structured_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_structured_logger::info;
/// info!(logger, "Application started");
/// info!(logger.with_module("worker"), "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_structured_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message, run the exit handlers and terminate.
///
/// # Examples
///
/// ```no_run
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_structured_logger::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format!($($arg)+))
    };
}

/// Log a panic-level message, then unwind with the entry as payload.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic(format!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Entry, LogLevel, Logger, MemoryOutput};
    use std::fmt;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts how often it is formatted
    struct Expensive(Arc<AtomicUsize>);

    impl fmt::Display for Expensive {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.fetch_add(1, Ordering::SeqCst);
            write!(f, "expensive")
        }
    }

    fn test_logger() -> (Logger, MemoryOutput, Arc<AtomicI32>) {
        let output = MemoryOutput::new();
        let code = Arc::new(AtomicI32::new(-1));
        let code_clone = Arc::clone(&code);
        let logger = Logger::builder()
            .output(output.clone())
            .terminator(move |c| code_clone.store(c, Ordering::SeqCst))
            .build();
        (logger, output, code)
    }

    #[test]
    fn test_log_macro() {
        let (logger, output, _) = test_logger();
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);

        let lines = output.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("Formatted: 42"));
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let (logger, output, _) = test_logger();
        let calls = Arc::new(AtomicUsize::new(0));

        debug!(logger, "value: {}", Expensive(Arc::clone(&calls)));
        trace!(logger, "value: {}", Expensive(Arc::clone(&calls)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(output.is_empty());

        warn!(logger, "value: {}", Expensive(Arc::clone(&calls)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_macros_on_entries_use_module_level() {
        let (logger, output, _) = test_logger();
        logger.set_level("noisy", LogLevel::Error);
        let entry: Entry = logger.with_module("noisy");

        info!(entry, "suppressed");
        error!(entry, "kept {}", 1);
        info!(logger, "kept {}", 2);

        let lines = output.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("kept 1 module=noisy"));
    }

    #[test]
    fn test_fatal_macro() {
        let (logger, output, code) = test_logger();
        fatal!(logger, "Critical failure: {}", "system");
        assert!(output.as_string().contains("Critical failure: system"));
        assert_eq!(code.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_log_macro() {
        let (logger, _, _) = test_logger();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            panic_log!(logger, "bad state: {}", 7)
        }));
        let payload = result.unwrap_err();
        let entry = payload.downcast_ref::<Entry>().unwrap();
        assert_eq!(entry.message, "bad state: 7");
    }
}
