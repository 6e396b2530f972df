//! Formatter trait: turns a finished entry into bytes

use super::{entry::Entry, error::Result};

/// Converts an entry into the bytes written to the output.
///
/// `buf` is a pooled buffer, already empty. Implementations append to it and
/// must not keep the entry or the buffer after returning.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()>;
    fn name(&self) -> &str;
}
