//! Severity values and the name/value registry that gates which messages emit.
//!
//! Levels are open-ended integers rather than a closed enum so applications can
//! register their own severities between the built-ins. Zero is reserved as the
//! inherit sentinel and is never a severity of its own.

use std::collections::HashMap;

use crate::error::Error;

/// Numeric severity. Higher is more severe; lower is more verbose.
pub type LevelValue = i32;

/// Sentinel meaning "no explicit level, walk the ancestors".
pub const INHERIT: LevelValue = 0;

/// Most verbose level, for instrumenting the test suite itself.
pub const TEST: LevelValue = 2;
/// High-volume instrumentation, more verbose than DEBUG.
pub const TRACE: LevelValue = 5;
/// Development-time diagnostics.
pub const DEBUG: LevelValue = 10;
/// More detailed than INFO.
pub const DETAIL: LevelValue = 15;
/// Normal operational milestones.
pub const INFO: LevelValue = 20;
/// Less detailed than INFO.
pub const MINIMAL: LevelValue = 25;
/// Non-fatal anomalies that may need attention.
pub const WARNING: LevelValue = 30;
/// Failures that prevent an operation from completing.
pub const ERROR: LevelValue = 40;
/// Failures that prevent the program from continuing.
pub const CRITICAL: LevelValue = 50;
/// One above the highest severity: disables all logging.
pub const SILENT: LevelValue = 51;

/// Canonical levels from most to least verbose, for help output and iteration.
pub const LEVEL_ORDER: [(&str, LevelValue); 10] = [
    ("TEST", TEST),
    ("TRACE", TRACE),
    ("DEBUG", DEBUG),
    ("DETAIL", DETAIL),
    ("INFO", INFO),
    ("MINIMAL", MINIMAL),
    ("WARNING", WARNING),
    ("ERROR", ERROR),
    ("CRITICAL", CRITICAL),
    ("SILENT", SILENT),
];

/// A level given either by numeric value or by (case-insensitive) name.
///
/// The `From` impls let call sites pass `"debug"`, a `String`, or
/// `level::DEBUG` interchangeably.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSpec {
    Value(LevelValue),
    Name(String),
}

impl From<LevelValue> for LevelSpec {
    fn from(value: LevelValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for LevelSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Single source of truth for the name/value mapping, including custom levels.
///
/// The mapping is strictly 1:1 between canonical names and values. Aliases
/// (`WARN`, `ERR`, `FATAL`) resolve but never appear as canonical names.
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    by_name: HashMap<String, LevelValue>,
    by_value: HashMap<LevelValue, String>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRegistry {
    /// A fresh registry pre-loaded with the built-in ladder and the inherit sentinel.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            by_name: HashMap::new(),
            by_value: HashMap::new(),
        };

        // The sentinel's own registration bypasses the positivity check;
        // nothing else is allowed to bind a non-positive value.
        registry.by_name.insert("NOTSET".to_string(), INHERIT);
        registry.by_value.insert(INHERIT, "NOTSET".to_string());

        for (name, value) in LEVEL_ORDER {
            registry.by_name.insert(name.to_string(), value);
            registry.by_value.insert(value, name.to_string());
        }

        // Aliases common in other logging ecosystems; lookup only.
        registry.by_name.insert("WARN".to_string(), WARNING);
        registry.by_name.insert("ERR".to_string(), ERROR);
        registry.by_name.insert("FATAL".to_string(), CRITICAL);

        registry
    }

    /// Binds `name` to `value`, enforcing the 1:1 invariant.
    ///
    /// Re-registering an identical pair is a no-op, so callers can register
    /// unconditionally at startup.
    ///
    /// # Errors
    /// `Error::InvalidLevel` for non-positive values; `Error::LevelConflict`
    /// when either side of the pair is already bound differently.
    pub fn register(&mut self, value: LevelValue, name: &str) -> Result<(), Error> {
        if value <= INHERIT {
            return Err(Error::InvalidLevel {
                name: name.to_string(),
                value,
            });
        }

        let key = name.to_uppercase();

        if let Some(&existing) = self.by_name.get(&key)
            && existing != value
        {
            return Err(Error::LevelConflict {
                name: key,
                value,
                existing_name: name.to_uppercase(),
                existing_value: existing,
            });
        }

        if let Some(existing) = self.by_value.get(&value)
            && existing != &key
        {
            return Err(Error::LevelConflict {
                name: key,
                value,
                existing_name: existing.clone(),
                existing_value: value,
            });
        }

        self.by_name.insert(key.clone(), value);
        self.by_value.insert(value, key);
        Ok(())
    }

    /// Turns a spec into a numeric value. Integers pass through unchanged;
    /// names are looked up case-insensitively.
    ///
    /// # Errors
    /// `Error::UnknownLevel` for unrecognized names.
    pub fn resolve(&self, spec: impl Into<LevelSpec>) -> Result<LevelValue, Error> {
        match spec.into() {
            LevelSpec::Value(value) => Ok(value),
            LevelSpec::Name(name) => self
                .by_name
                .get(&name.to_uppercase())
                .copied()
                .ok_or(Error::UnknownLevel(name)),
        }
    }

    /// Canonical name for `value`, or a `"Level <n>"` placeholder for
    /// unregistered values (lenient mode).
    #[must_use]
    pub fn name_of(&self, value: LevelValue) -> String {
        self.by_value
            .get(&value)
            .cloned()
            .unwrap_or_else(|| format!("Level {value}"))
    }

    /// Canonical name for `value`, failing for unregistered values (strict mode).
    ///
    /// # Errors
    /// `Error::UnknownLevel` when no name is bound to `value`.
    pub fn name_of_strict(&self, value: LevelValue) -> Result<String, Error> {
        self.by_value
            .get(&value)
            .cloned()
            .ok_or_else(|| Error::UnknownLevel(format!("Level {value}")))
    }

    /// Whether `name` resolves, canonically or via alias.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_uppercase())
    }
}
