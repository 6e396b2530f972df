//! Stack trace capture for the `stacktrace` field

use super::fields::FieldValue;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

/// Symbols of the capture machinery. Leading frames matching any of these
/// are dropped so a trace starts at the caller.
const INTERNAL_FRAMES: &[&str] = &[
    "std::backtrace",
    "backtrace::",
    "StackTrace::capture",
    "Entry::with_stack",
    "Entry::with_error",
    "Entry::with_dyn_error",
    "entry::error_fields",
    "Logger::with_stack",
    "Logger::with_error",
    "Logger::with_dyn_error",
    "StructuredError::new",
    "StructuredError::wrap",
    "ErrorGenerator::",
];

/// A captured call stack, one rendered line per frame
#[derive(Clone, PartialEq, Eq)]
pub struct StackTrace {
    frames: Arc<[String]>,
}

impl StackTrace {
    /// Capture the current stack, regardless of `RUST_BACKTRACE`
    pub fn capture() -> Self {
        Self::from_rendered(&Backtrace::force_capture().to_string())
    }

    /// Build from the text form of a `std::backtrace::Backtrace`
    pub(crate) fn from_rendered(rendered: &str) -> Self {
        let frames: Vec<String> = parse_frames(rendered)
            .into_iter()
            .skip_while(|frame| is_internal(frame))
            .collect();
        Self {
            frames: frames.into(),
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn is_internal(frame: &str) -> bool {
    INTERNAL_FRAMES.iter().any(|marker| frame.contains(marker))
}

fn parse_frames(rendered: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();
    for line in rendered.lines().map(str::trim) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.push_str(" at ");
                last.push_str(location);
            }
            continue;
        }
        if let Some((index, symbol)) = line.split_once(": ") {
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                frames.push(symbol.to_string());
            }
        }
    }
    frames
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return write!(f, "<unavailable>");
        }
        write!(f, "{}", self.frames.join("\n"))
    }
}

impl fmt::Debug for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.frames.iter()).finish()
    }
}

impl From<StackTrace> for FieldValue {
    fn from(stack: StackTrace) -> Self {
        FieldValue::display(stack)
    }
}
