//! Default-level resolution and logger-name inference.
//!
//! The level chain, highest priority first: CLI-supplied level, registered
//! environment variables (first non-empty wins), caller fallback, registered
//! default, built-in default. Only a level *name* comes out of here — the
//! registry is the sole authority on turning names into values.

/// Probed when no environment variables have been registered.
pub const DEFAULT_LEVEL_ENV_VARS: &[&str] = &["LOG_LEVEL"];

/// Last resort of the resolution chain.
pub const DEFAULT_LEVEL_NAME: &str = "DETAIL";

fn probe<'a, I: IntoIterator<Item = &'a str>>(vars: I) -> Option<String> {
    for var in vars {
        if let Ok(value) = std::env::var(var)
            && !value.is_empty()
        {
            return Some(value.to_uppercase());
        }
    }
    None
}

/// Resolves the default level name. An empty `env_vars` slice means "use the
/// built-in probe list", not "probe nothing".
#[must_use]
pub fn default_level_name(
    cli_level: Option<&str>,
    env_vars: &[String],
    fallback: Option<&str>,
    registered_default: Option<&str>,
) -> String {
    if let Some(level) = cli_level {
        return level.to_uppercase();
    }

    let from_env = if env_vars.is_empty() {
        probe(DEFAULT_LEVEL_ENV_VARS.iter().copied())
    } else {
        probe(env_vars.iter().map(String::as_str))
    };
    if let Some(level) = from_env {
        return level;
    }

    fallback
        .or(registered_default)
        .unwrap_or(DEFAULT_LEVEL_NAME)
        .to_uppercase()
}

/// Best-effort logger name for a calling context: the top-level segment of a
/// module path (callers pass `module_path!()`). Returns `None` for an empty
/// path — the caller decides whether that is an error.
#[must_use]
pub fn infer_logger_name(module_path: &str) -> Option<String> {
    let top = module_path.split("::").next()?.trim();
    if top.is_empty() {
        return None;
    }
    Some(top.to_string())
}

/// CLI fragment for embedding applications: `--log-level` plugs straight into
/// [`default_level_name`].
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LevelArgs {
    /// Log level name, overriding environment probing.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[cfg(feature = "cli")]
impl LevelArgs {
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }
}
