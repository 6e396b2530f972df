//! Hooks run on an entry before it is formatted

use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use std::collections::HashMap;
use std::sync::Arc;

/// Observer fired for the levels it subscribes to.
///
/// `fire` gets exclusive access to the entry for the duration of the
/// dispatch; fields it adds are part of what gets formatted.
pub trait Hook: Send + Sync {
    fn levels(&self) -> &[LogLevel];
    fn fire(&self, entry: &mut Entry) -> Result<()>;

    fn name(&self) -> &str {
        "hook"
    }
}

/// Hooks grouped by level, in registration order
#[derive(Clone, Default)]
pub struct LevelHooks {
    by_level: HashMap<LogLevel, Vec<Arc<dyn Hook>>>,
}

impl LevelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `hook` to each of its levels
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        for level in hook.levels() {
            self.by_level
                .entry(*level)
                .or_default()
                .push(Arc::clone(&hook));
        }
    }

    /// Number of hooks subscribed to `level`
    pub fn count(&self, level: LogLevel) -> usize {
        self.by_level.get(&level).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.is_empty()
    }

    /// Fire every hook registered for `level`, in order.
    ///
    /// A failing hook does not stop the ones after it, unlike dispatch that
    /// returns on the first error. The failures are returned so the caller
    /// can report them.
    pub fn fire(&self, level: LogLevel, entry: &mut Entry) -> Vec<LoggerError> {
        let mut failures = Vec::new();
        if let Some(hooks) = self.by_level.get(&level) {
            for hook in hooks {
                if let Err(err) = hook.fire(entry) {
                    failures.push(match err {
                        err @ LoggerError::HookError { .. } => err,
                        other => LoggerError::hook(hook.name(), other.to_string()),
                    });
                }
            }
        }
        failures
    }
}

impl std::fmt::Debug for LevelHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(LogLevel, usize)> = self
            .by_level
            .iter()
            .map(|(level, hooks)| (*level, hooks.len()))
            .collect();
        counts.sort();
        f.debug_struct("LevelHooks").field("counts", &counts).finish()
    }
}
