//! Direct `Hierarchy` construction would require knowing every default's
//! interaction — the builder hides that behind a stepwise API.

use super::{Defaults, Hierarchy, NodeFactory, NodeOptions};
use crate::error::Error;
use crate::fmt::{ColorMode, TagConfig};
use crate::level::{LevelRegistry, LevelSpec, LevelValue};

/// Stepwise configuration for a new logger tree.
#[derive(Default)]
pub struct HierarchyBuilder {
    root_level: Option<LevelSpec>,
    default_level: Option<String>,
    env_vars: Vec<String>,
    logger_name: Option<String>,
    propagate: Option<bool>,
    color: ColorMode,
    tags: Option<TagConfig>,
    custom_levels: Vec<(LevelValue, String)>,
    factory: Option<NodeFactory>,
}

impl HierarchyBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit level for the root node. Without it the root inherits, and the
    /// registered default level decides.
    #[must_use]
    pub fn root_level(mut self, spec: impl Into<LevelSpec>) -> Self {
        self.root_level = Some(spec.into());
        self
    }

    /// Default level name used when an inherit walk runs out of ancestors.
    #[must_use]
    pub fn default_level(mut self, name: impl Into<String>) -> Self {
        self.default_level = Some(name.into());
        self
    }

    /// Adds one environment variable to the default-level probe list.
    #[must_use]
    pub fn env_var(mut self, var: impl Into<String>) -> Self {
        self.env_vars.push(var.into());
        self
    }

    /// Replaces the whole default-level probe list.
    #[must_use]
    pub fn env_vars(mut self, vars: Vec<String>) -> Self {
        self.env_vars = vars;
        self
    }

    /// Name preferred over module-path inference in `get_for_module`.
    #[must_use]
    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    /// Propagation default for newly created nodes.
    #[must_use]
    pub const fn propagate(mut self, propagate: bool) -> Self {
        self.propagate = Some(propagate);
        self
    }

    /// Color decision for managed handlers; `Auto` consults the environment.
    #[must_use]
    pub const fn color(mut self, mode: ColorMode) -> Self {
        self.color = mode;
        self
    }

    /// Tag styles shared by every managed handler in the tree.
    #[must_use]
    pub fn tags(mut self, tags: TagConfig) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Registers a custom level alongside the built-ins.
    #[must_use]
    pub fn level(mut self, value: LevelValue, name: impl Into<String>) -> Self {
        self.custom_levels.push((value, name.into()));
        self
    }

    /// Node strategy deciding each new node's initial options by name.
    #[must_use]
    pub fn node_factory(
        mut self,
        factory: impl Fn(&str) -> NodeOptions + Send + Sync + 'static,
    ) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Builds the tree. Custom levels are registered first so the root level
    /// may be given by a custom name.
    ///
    /// # Errors
    /// Level registration conflicts and invalid or unknown root levels.
    pub fn build(self) -> Result<Hierarchy, Error> {
        let mut registry = LevelRegistry::new();
        for (value, name) in &self.custom_levels {
            registry.register(*value, name)?;
        }

        let defaults = Defaults {
            default_level: self.default_level,
            env_vars: self.env_vars,
            logger_name: self.logger_name,
            propagate: self.propagate,
        };

        let hierarchy = Hierarchy::from_parts(
            registry,
            defaults,
            self.color,
            self.tags.unwrap_or_default(),
            self.factory.unwrap_or_else(super::default_factory),
        );

        if let Some(spec) = self.root_level {
            hierarchy.root().set_level(spec)?;
        }

        Ok(hierarchy)
    }
}
