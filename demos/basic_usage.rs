//! Basic logger usage example
//!
//! Demonstrates levels, fields, module levels, hooks and error context.
//!
//! Run with: cargo run --example basic_usage

use rust_structured_logger::prelude::*;
use std::io;

/// Tags every error entry with the host name
struct HostHook {
    host: String,
}

impl Hook for HostHook {
    fn levels(&self) -> &[LogLevel] {
        &[LogLevel::Error, LogLevel::Fatal, LogLevel::Panic]
    }

    fn fire(&self, entry: &mut Entry) -> Result<()> {
        entry.add_field("host", self.host.as_str());
        Ok(())
    }

    fn name(&self) -> &str {
        "host"
    }
}

fn main() -> Result<()> {
    println!("=== Rust Structured Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .level_spec("db:debug, http:warn, info")?
        .formatter(TextFormatter::new().with_colors(true))
        .output(io::stdout())
        .hook(HostHook {
            host: "web-01".to_string(),
        })
        .build();

    println!("1. Logging at different levels:");
    logger.debug("Debug message (hidden, default level is INFO)");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message (tagged by the hook)");

    println!("\n2. Fields and chaining:");
    let request = logger.with_fields([("request_id", "r-42"), ("method", "GET")]);
    request.info("Request received");
    request.with_field("status", 200).info("Request completed");

    println!("\n3. Module levels:");
    logger.with_module("db").debug("Query plan cached (db is at DEBUG)");
    logger.with_module("http").info("Connection reused (hidden, http is at WARN)");
    logger.with_module("http").warn("Slow upstream");

    println!("\n4. Errors carry their context:");
    let storage = logger.with_module("storage").with_field("bucket", "media");
    let err = storage
        .error_generator()
        .with_field("key", "avatar.png")
        .error("object not found");
    logger.with_error(err).error("Upload failed");

    println!("\n5. Same logger, JSON output:");
    logger.set_formatter(JsonFormatter::new());
    logger.with_field("user", "alice").info("Switched to JSON");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
