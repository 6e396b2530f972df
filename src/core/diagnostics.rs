//! Fallback channel for failures inside the pipeline itself
//!
//! Hook, formatter and write failures cannot be reported through the output
//! that just failed, and must not reach the caller. They go to stderr,
//! one line per failure, serialized across all loggers in the process.

use parking_lot::Mutex;
use std::any::Any;
use std::fmt::Display;

static STDERR_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Report a recoverable pipeline failure
pub fn report(context: &str, err: &dyn Display) {
    let _guard = STDERR_LOCK.lock();
    eprintln!("[LOGGER ERROR] {}: {}", context, err);
}

/// Report a failure that escaped as a panic
pub fn critical(context: &str, message: &str) {
    let _guard = STDERR_LOCK.lock();
    eprintln!("[LOGGER CRITICAL] {}: {}", context, message);
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
