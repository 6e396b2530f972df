//! File logging example
//!
//! Demonstrates loading a configuration and writing to a buffered file.
//!
//! Run with: cargo run --example file_logging

use rust_structured_logger::prelude::*;
use std::fs::OpenOptions;
use std::io::BufWriter;

fn main() -> Result<()> {
    println!("=== Rust Structured Logger - File Logging Example ===\n");

    let config = LoggerConfig::from_json(
        r#"{
            "level": "worker:debug, info",
            "format": "Json",
            "timestamp_format": "UnixMillis"
        }"#,
    )?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("application.log")?;
    let logger = config.into_builder()?.output(BufWriter::new(file)).build();

    // Fatal flushes the output itself; handlers only release other resources.
    logger.register_exit_handler(|| println!("Shutting down workers"));

    println!("1. Logging to application.log:");
    logger.info("Application started");
    logger.debug("Loading configuration... (hidden)");
    logger.warn("Using default settings for some options");

    println!("\n2. Performing some operations:");
    let worker = logger.with_module("worker");
    for i in 1..=5 {
        worker.with_field("item", i).debug(format!("Processing item {}/5", i));
        if i == 3 {
            worker
                .with_field("item", i)
                .with_field("elapsed_ms", 1250)
                .warn("Item took longer than expected");
        }
    }

    logger.info("All operations completed");
    logger.flush()?;

    let metrics = logger.metrics();
    println!(
        "\nLogged {} entries ({} dropped)",
        metrics.total_logged(),
        metrics.dropped_count()
    );
    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");

    Ok(())
}
