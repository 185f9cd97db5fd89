//! Bridges the TOML config schema onto the builder.

use super::Hierarchy;
use crate::config::Config;
use crate::error::Error;
use crate::fmt::{ColorMode, TagConfig};

impl Hierarchy {
    /// Builds a tree from a loaded config: custom levels, root level,
    /// propagation default, color mode, timestamps, and the resolution
    /// settings all come from the file.
    ///
    /// # Errors
    /// Level registration conflicts and invalid or unknown level names in the
    /// config.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut builder = Self::builder()
            .propagate(config.general.propagate)
            .color(ColorMode::parse(&config.general.colors))
            .tags(TagConfig::default().show_timestamp(config.general.timestamps));

        // Levels first: the root level may name one of them.
        let mut levels: Vec<(&String, &i32)> = config.levels.iter().collect();
        levels.sort_by_key(|(_, value)| **value);
        for (name, value) in levels {
            builder = builder.level(*value, name.clone());
        }

        if let Some(ref level) = config.general.level {
            builder = builder.root_level(level.clone());
        }
        if let Some(ref default_level) = config.resolve.default_level {
            builder = builder.default_level(default_level.clone());
        }
        if !config.resolve.env_vars.is_empty() {
            builder = builder.env_vars(config.resolve.env_vars.clone());
        }
        if let Some(ref name) = config.resolve.logger_name {
            builder = builder.logger_name(name.clone());
        }

        builder.build()
    }
}
