//! Per-module minimum levels
//!
//! The registry is consulted on every logging call, so reads are a lock-free
//! `ArcSwap` snapshot load. Writers publish a whole new table with `rcu`.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// Module name that supplies the default for unmapped modules
pub const WILDCARD_MODULE: &str = "*";

/// Module name of entries that were never tagged with a module
pub const DEFAULT_MODULE: &str = "";

/// Level used when neither the module nor the wildcard is mapped
pub const BASELINE_LEVEL: LogLevel = LogLevel::Info;

/// Maps module names to the minimum level they emit at
pub struct LevelRegistry {
    levels: ArcSwap<HashMap<String, LogLevel>>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self {
            levels: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub fn with_levels(table: HashMap<String, LogLevel>) -> Self {
        Self {
            levels: ArcSwap::from_pointee(table),
        }
    }

    /// Set the minimum level of one module; `"*"` sets the default
    pub fn set_level(&self, module: impl Into<String>, level: LogLevel) {
        let module = module.into();
        self.levels.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(module.clone(), level);
            next
        });
    }

    /// Replace the whole table from text such as `"db:debug, http:warn *:info"`.
    ///
    /// Tokens are separated by commas, semicolons or whitespace. Each token is
    /// `module:level` (or `module=level`); a bare `level` applies to the
    /// wildcard. Nothing changes if any token is malformed.
    pub fn set_level_from_spec(&self, spec: &str) -> Result<()> {
        let table = parse_level_spec(spec)?;
        self.levels.store(Arc::new(table));
        Ok(())
    }

    /// Minimum level for `module`. Never fails: falls back to the wildcard,
    /// then to [`BASELINE_LEVEL`].
    #[inline]
    pub fn effective_level(&self, module: &str) -> LogLevel {
        let levels = self.levels.load();
        levels
            .get(module)
            .or_else(|| levels.get(WILDCARD_MODULE))
            .copied()
            .unwrap_or(BASELINE_LEVEL)
    }

    /// Drop the explicit mapping of one module
    pub fn remove(&self, module: &str) {
        self.levels.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(module);
            next
        });
    }

    pub fn clear(&self) {
        self.levels.store(Arc::new(HashMap::new()));
    }

    /// Copy of the current table
    pub fn snapshot(&self) -> HashMap<String, LogLevel> {
        HashMap::clone(&self.levels.load())
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LevelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelRegistry")
            .field("levels", &self.snapshot())
            .finish()
    }
}

/// Parse a level spec into a module table
pub fn parse_level_spec(spec: &str) -> Result<HashMap<String, LogLevel>> {
    let mut table = HashMap::new();
    let tokens = spec
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty());

    for token in tokens {
        let (module, level) = match token.rsplit_once(|c: char| c == ':' || c == '=') {
            Some((module, level)) => (module.trim(), level.trim()),
            None => (WILDCARD_MODULE, token),
        };
        if level.is_empty() {
            return Err(LoggerError::invalid_level_spec(token, "missing level"));
        }
        let level = level
            .parse::<LogLevel>()
            .map_err(|message| LoggerError::invalid_level_spec(token, message))?;
        table.insert(module.to_string(), level);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_falls_back_to_baseline() {
        let registry = LevelRegistry::new();
        assert_eq!(registry.effective_level("anything"), BASELINE_LEVEL);
        assert_eq!(registry.effective_level(DEFAULT_MODULE), BASELINE_LEVEL);
    }

    #[test]
    fn test_wildcard_default() {
        let registry = LevelRegistry::new();
        registry.set_level("foo", LogLevel::Debug);
        registry.set_level(WILDCARD_MODULE, LogLevel::Warn);

        assert_eq!(registry.effective_level("foo"), LogLevel::Debug);
        assert_eq!(registry.effective_level("bar"), LogLevel::Warn);
        assert_eq!(registry.effective_level(DEFAULT_MODULE), LogLevel::Warn);
    }

    #[test]
    fn test_spec_parsing_tolerates_delimiters() {
        let registry = LevelRegistry::new();
        registry
            .set_level_from_spec("foo:debug, bar=error;  *:info\tbaz:WARNING")
            .unwrap();

        assert_eq!(registry.effective_level("foo"), LogLevel::Debug);
        assert_eq!(registry.effective_level("bar"), LogLevel::Error);
        assert_eq!(registry.effective_level("baz"), LogLevel::Warn);
        assert_eq!(registry.effective_level("other"), LogLevel::Info);
    }

    #[test]
    fn test_bare_level_sets_wildcard() {
        let table = parse_level_spec("trace").unwrap();
        assert_eq!(table.get(WILDCARD_MODULE), Some(&LogLevel::Trace));
    }

    #[test]
    fn test_invalid_spec_leaves_registry_untouched() {
        let registry = LevelRegistry::new();
        registry.set_level("foo", LogLevel::Debug);

        let err = registry.set_level_from_spec("foo:trace,bar:loud").unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevelSpec { .. }));
        assert_eq!(registry.effective_level("foo"), LogLevel::Debug);

        assert!(registry.set_level_from_spec("foo:").is_err());
    }

    #[test]
    fn test_spec_replaces_table() {
        let registry = LevelRegistry::new();
        registry.set_level("old", LogLevel::Trace);
        registry.set_level_from_spec("new:error").unwrap();

        assert_eq!(registry.effective_level("old"), BASELINE_LEVEL);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = LevelRegistry::new();
        registry.set_level("foo", LogLevel::Error);
        registry.set_level(WILDCARD_MODULE, LogLevel::Debug);

        registry.remove("foo");
        assert_eq!(registry.effective_level("foo"), LogLevel::Debug);

        registry.clear();
        assert_eq!(registry.effective_level("foo"), BASELINE_LEVEL);
    }
}
