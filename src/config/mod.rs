//! TOML configuration loading and `source = "..."` include resolution.
//!
//! Separated from struct definitions so that the loading logic (file I/O,
//! cycle detection, merge strategy) stays independent of the serde schema.

mod structs;

pub use structs::{Config, GeneralConfig, ResolveConfig};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::internal;

/// Scans raw TOML for `source = "..."` directives before deserialization,
/// since serde cannot handle them. Returns the extracted paths and the
/// remaining TOML content stripped of those lines.
#[doc(hidden)]
#[must_use]
pub fn extract_sources(content: &str) -> (Vec<String>, String) {
    let mut sources = Vec::new();
    let mut remaining = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("source") && trimmed.contains('=') {
            if let Some(path) = trimmed
                .split('=')
                .nth(1)
                .map(|s| s.trim().trim_matches('"').trim_matches('\''))
                && !path.is_empty()
            {
                sources.push(path.to_string());
            }
        } else {
            remaining.push_str(line);
            remaining.push('\n');
        }
    }

    (sources, remaining)
}

impl Config {
    /// Loads the user's config from the default location with all
    /// `source = "..."` includes resolved.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined or TOML parsing hits
    /// a syntax error.
    pub fn load() -> Result<Self, crate::Error> {
        let config_path = Self::default_path()?;
        Self::load_with_sources(&config_path, &mut HashSet::new())
    }

    /// Loads configuration from an explicit path instead of the default
    /// location. Useful for tests that point at a non-standard config file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or contains cyclic
    /// includes.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        Self::load_with_sources(path, &mut HashSet::new())
    }

    /// Recursive loader that expands `source = "..."` includes while tracking
    /// visited paths in `seen` to break include cycles.
    fn load_with_sources(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Self, crate::Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if !seen.insert(canonical.clone()) {
            return Err(crate::Error::CyclicInclude(canonical));
        }

        let content = fs::read_to_string(path)?;
        let (sources, toml_content) = extract_sources(&content);
        let mut config: Self = toml::from_str(&toml_content)?;

        for source_path in sources {
            let expanded = shellexpand::tilde(&source_path);
            let source_file = Path::new(expanded.as_ref());
            if source_file.exists() {
                let source_config = Self::load_with_sources(source_file, seen)?;
                config.merge(source_config);
            } else {
                internal::safe_log(&format!("config source not found: {source_path}"));
            }
        }

        Ok(config)
    }

    /// Folds a sourced config into `self` without overwriting existing
    /// values, so the primary file takes precedence over includes.
    pub fn merge(&mut self, other: Self) {
        for (name, value) in other.levels {
            self.levels.entry(name).or_insert(value);
        }
        if self.general.level.is_none() {
            self.general.level = other.general.level;
        }
        if self.resolve.env_vars.is_empty() {
            self.resolve.env_vars = other.resolve.env_vars;
        }
        if self.resolve.default_level.is_none() {
            self.resolve.default_level = other.resolve.default_level;
        }
        if self.resolve.logger_name.is_none() {
            self.resolve.logger_name = other.resolve.logger_name;
        }
    }

    /// XDG-compliant path under the platform config directory.
    ///
    /// # Errors
    /// Fails when the platform has no concept of a config directory.
    pub fn default_path() -> Result<PathBuf, crate::Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("logtree").join("logtree.toml"))
            .ok_or(crate::Error::ConfigDirNotFound)
    }
}
