//! Configuration struct definitions.

use serde::Deserialize;
use std::collections::HashMap;

use crate::level::LevelValue;

/// General configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Explicit root level; absent means the root inherits and the resolve
    /// chain decides.
    pub level: Option<String>,
    /// Propagation default for newly created loggers.
    pub propagate: bool,
    /// Color mode ("auto", "always", "never").
    pub colors: String,
    /// Prefix rendered lines with timestamps.
    pub timestamps: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            level: None,
            propagate: true,
            colors: "auto".to_string(),
            timestamps: false,
        }
    }
}

/// Default-level resolution configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ResolveConfig {
    /// Environment variables probed in order; empty means the built-in list.
    pub env_vars: Vec<String>,
    /// Level name used when an inherit walk runs out of ancestors.
    pub default_level: Option<String>,
    /// Logger name preferred over module-path inference.
    pub logger_name: Option<String>,
}

/// A completely empty config file must still produce a working hierarchy —
/// `#[serde(default)]` on every field ensures zero-config works out of the box.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Root level, propagation, and rendering apply to the whole tree.
    pub general: GeneralConfig,
    /// Where the default level comes from when nothing explicit is set.
    pub resolve: ResolveConfig,
    /// Custom levels: name = value. Registered alongside the built-ins.
    pub levels: HashMap<String, LevelValue>,
}
