//! Per-level tag prefixes (`[DEBUG]`, warning glyphs) rendered ahead of the
//! message. Levels without a style render the bare message, so normal program
//! output stays clean while diagnostics stay scannable.

use std::collections::HashMap;

use super::color::{Color, colorize};
use crate::handler::Record;

/// How one level's tag looks. A style with no color renders plain even when
/// colors are enabled.
#[derive(Debug, Clone)]
pub struct TagStyle {
    pub label: String,
    pub color: Option<Color>,
}

impl TagStyle {
    #[must_use]
    pub fn new(label: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Every rendering knob in one struct so the handler doesn't accept a dozen
/// loose parameters. Keyed by canonical level name so custom levels can carry
/// tags too.
#[derive(Debug, Clone)]
pub struct TagConfig {
    styles: HashMap<String, TagStyle>,
    show_timestamp: bool,
    timestamp_format: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        let mut styles = HashMap::new();
        styles.insert("TEST".to_string(), TagStyle::new("[TEST]", Some(Color::gray())));
        styles.insert("TRACE".to_string(), TagStyle::new("[TRACE]", Some(Color::gray())));
        styles.insert("DEBUG".to_string(), TagStyle::new("[DEBUG]", Some(Color::cyan())));
        styles.insert("WARNING".to_string(), TagStyle::new("\u{26a0}\u{fe0f}", None));
        styles.insert("ERROR".to_string(), TagStyle::new("\u{274c}", None));
        styles.insert("CRITICAL".to_string(), TagStyle::new("\u{1f4a5}", None));

        Self {
            styles,
            show_timestamp: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl TagConfig {
    /// Explicit constructor matches the builder-pattern convention used throughout the crate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides or adds the tag for one level name (custom levels included).
    #[must_use]
    pub fn style(mut self, level_name: &str, style: TagStyle) -> Self {
        self.styles.insert(level_name.to_uppercase(), style);
        self
    }

    /// Removes a level's tag entirely so it renders like the stdout levels.
    #[must_use]
    pub fn bare(mut self, level_name: &str) -> Self {
        self.styles.remove(&level_name.to_uppercase());
        self
    }

    /// Timestamps are off by default — interactive output reads better without them.
    #[must_use]
    pub const fn show_timestamp(mut self, show: bool) -> Self {
        self.show_timestamp = show;
        self
    }

    /// Different locales and log analysis tools expect different timestamp formats.
    #[must_use]
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Single entry point for rendering — the record passes through unmodified,
    /// the returned string is what the handler writes to the routed stream.
    #[must_use]
    pub fn render(&self, record: &Record<'_>, color_enabled: bool) -> String {
        let mut line = String::new();

        if self.show_timestamp {
            line.push_str(&record.timestamp.format(&self.timestamp_format).to_string());
            line.push(' ');
        }

        if let Some(style) = self.styles.get(&record.level_name.to_uppercase()) {
            match style.color {
                Some(color) if color_enabled => line.push_str(&colorize(&style.label, color)),
                _ => line.push_str(&style.label),
            }
            line.push(' ');
        }

        line.push_str(record.message);
        line
    }
}
