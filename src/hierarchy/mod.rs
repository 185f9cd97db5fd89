//! The single shared tree of named loggers: registration, dot-prefix parent
//! linkage, and safe hot-replacement of the root node.
//!
//! There is no process-global state — a `Hierarchy` is created explicitly at
//! startup and cloned wherever logging is needed; clones share one tree.

mod builder;
mod from_config;

pub use builder::HierarchyBuilder;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::error::Error;
use crate::fmt::{ColorMode, TagConfig};
use crate::internal;
use crate::level::{self, LevelRegistry, LevelSpec, LevelValue};
use crate::logger::Logger;
use crate::resolve;
use crate::stream::StreamHub;

/// Initial state handed to a freshly constructed node. `None` fields fall back
/// to the hierarchy's registered defaults.
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    /// Explicit level; `level::INHERIT` (the default) walks the ancestors.
    pub level: LevelValue,
    pub propagate: Option<bool>,
    pub disabled: bool,
    pub color: Option<bool>,
}

/// Pluggable node strategy: maps a node name to its initial options. Replaces
/// global logger-class registration — callers who need custom behavior attach
/// their own handlers, which the policy engine never touches.
pub type NodeFactory = Box<dyn Fn(&str) -> NodeOptions + Send + Sync>;

fn default_factory() -> NodeFactory {
    Box::new(|_| NodeOptions::default())
}

/// Settings registered by the embedding application, consulted when a logger
/// has no explicit level and when no explicit name is supplied.
#[derive(Debug, Default)]
pub(crate) struct Defaults {
    pub(crate) default_level: Option<String>,
    pub(crate) env_vars: Vec<String>,
    pub(crate) logger_name: Option<String>,
    pub(crate) propagate: Option<bool>,
}

struct Table {
    nodes: HashMap<String, Arc<Logger>>,
    root: Arc<Logger>,
}

fn is_proper_dot_prefix(prefix: &str, name: &str) -> bool {
    name.len() > prefix.len()
        && name.starts_with(prefix)
        && name.as_bytes()[prefix.len()] == b'.'
}

impl Table {
    /// The node whose name is the longest proper dot-prefix of `name` that
    /// exists in the table, else the root.
    fn parent_for(&self, name: &str) -> Arc<Logger> {
        let mut prefix = name;
        while let Some(idx) = prefix.rfind('.') {
            prefix = &prefix[..idx];
            if let Some(node) = self.nodes.get(prefix) {
                return Arc::clone(node);
            }
        }
        Arc::clone(&self.root)
    }

    /// Re-derives the parent pointer of every node below `prefix`. Run after
    /// an insertion or removal changes which prefixes exist.
    fn relink_descendants_of(&self, prefix: &str) {
        for (name, node) in &self.nodes {
            if is_proper_dot_prefix(prefix, name) {
                node.set_parent(&self.parent_for(name));
            }
        }
    }
}

/// State shared between the hierarchy handle and every node in its tree.
pub(crate) struct Shared {
    pub(crate) levels: RwLock<LevelRegistry>,
    pub(crate) streams: Arc<StreamHub>,
    pub(crate) tags: TagConfig,
    pub(crate) color_default: bool,
    table: RwLock<Table>,
    defaults: RwLock<Defaults>,
    factory: RwLock<NodeFactory>,
    root_user_configured: AtomicBool,
}

impl Shared {
    pub(crate) fn is_root_node(&self, node: &Logger) -> bool {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        std::ptr::eq(Arc::as_ptr(&table.root), std::ptr::from_ref(node))
    }

    pub(crate) fn clear_enabled_caches(&self) {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.root.clear_enabled_cache();
        for node in table.nodes.values() {
            node.clear_enabled_cache();
        }
    }

    /// The level used when an inherit walk runs out of ancestors: the
    /// registered default, overridable by the registered environment
    /// variables.
    pub(crate) fn fallback_level(&self) -> LevelValue {
        let name = {
            let defaults = self.defaults.read().unwrap_or_else(PoisonError::into_inner);
            resolve::default_level_name(
                None,
                &defaults.env_vars,
                None,
                defaults.default_level.as_deref(),
            )
        };
        self.levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(name.as_str())
            .unwrap_or(level::DETAIL)
    }

    fn propagate_default(&self) -> bool {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .propagate
            .unwrap_or(true)
    }

    fn build_node(shared: &Arc<Self>, name: &str) -> Arc<Logger> {
        let opts = {
            let factory = shared.factory.read().unwrap_or_else(PoisonError::into_inner);
            factory(name)
        };
        Arc::new(Logger::from_options(
            name,
            Arc::downgrade(shared),
            &opts,
            shared.propagate_default(),
            shared.color_default,
        ))
    }
}

/// Handle to one logger tree. `Clone` is cheap and shares the tree.
#[derive(Clone)]
pub struct Hierarchy {
    shared: Arc<Shared>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::from_parts(
            LevelRegistry::new(),
            Defaults::default(),
            ColorMode::default(),
            TagConfig::default(),
            default_factory(),
        )
    }
}

impl Hierarchy {
    /// A tree with built-in levels, default tag styles, and auto color.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stepwise construction for custom levels, defaults, and node strategy.
    #[must_use]
    pub fn builder() -> HierarchyBuilder {
        HierarchyBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: LevelRegistry,
        defaults: Defaults,
        color: ColorMode,
        tags: TagConfig,
        factory: NodeFactory,
    ) -> Self {
        let color_default = color.enabled();
        let propagate_default = defaults.propagate.unwrap_or(true);
        let root_opts = factory("");
        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let root = Arc::new(Logger::from_options(
                "",
                weak.clone(),
                &root_opts,
                propagate_default,
                color_default,
            ));
            Shared {
                levels: RwLock::new(registry),
                streams: Arc::new(StreamHub::new()),
                tags,
                color_default,
                table: RwLock::new(Table {
                    nodes: HashMap::new(),
                    root,
                }),
                defaults: RwLock::new(defaults),
                factory: RwLock::new(factory),
                root_user_configured: AtomicBool::new(false),
            }
        });
        Self { shared }
    }

    /// The distinguished root node, also reachable as `get_or_create("")`.
    #[must_use]
    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(
            &self
                .shared
                .table
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .root,
        )
    }

    /// Returns the named logger, creating and linking it if necessary. New
    /// nodes start at the inherit sentinel; their parent is the longest
    /// existing dot-prefix. Creating an intermediate node adopts the deeper
    /// nodes it now shadows.
    #[must_use]
    pub fn get_or_create(&self, name: &str) -> Arc<Logger> {
        if name.is_empty() {
            return self.root();
        }

        {
            let table = self.shared.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(node) = table.nodes.get(name) {
                // Parent pointers are recomputed lazily on access so earlier
                // removals can't leave a node pointing at a detached parent.
                node.set_parent(&table.parent_for(name));
                return Arc::clone(node);
            }
        }

        let mut table = self
            .shared
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(node) = table.nodes.get(name) {
            node.set_parent(&table.parent_for(name));
            return Arc::clone(node);
        }

        let node = Shared::build_node(&self.shared, name);
        node.set_parent(&table.parent_for(name));
        table.nodes.insert(name.to_string(), Arc::clone(&node));
        table.relink_descendants_of(name);
        node
    }

    /// Existing node lookup without creating one.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        if name.is_empty() {
            return Some(self.root());
        }
        self.shared
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .nodes
            .get(name)
            .cloned()
    }

    /// Detaches and discards one node. Descendants are not removed; they are
    /// re-pointed at their next-longest existing prefix. The root cannot be
    /// removed — replace it instead.
    pub fn remove(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let mut table = self
            .shared
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(node) = table.nodes.remove(name) else {
            return false;
        };
        node.detach_parent();
        table.relink_descendants_of(name);
        true
    }

    /// Builds a fresh root via the node strategy and swaps it in. With
    /// `port_level`, the old root's level, propagation, and disabled flags
    /// carry over; with `port_handlers`, its entire handler set moves to the
    /// new root (so no record is ever emitted twice). Every node whose parent
    /// was the old root is re-pointed before the swap becomes visible.
    ///
    /// Returns `false` without touching anything when the root has been
    /// marked user-configured.
    pub fn replace_root(&self, port_level: bool, port_handlers: bool) -> bool {
        if self.shared.root_user_configured.load(Ordering::Relaxed) {
            internal::safe_log("replace_root skipped: root is user-configured");
            return false;
        }

        let new_root = Shared::build_node(&self.shared, "");

        let mut table = self
            .shared
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let old_root = Arc::clone(&table.root);
        if port_level {
            new_root.port_state_from(&old_root);
        }
        if port_handlers {
            let (handlers, stream_ids) = old_root.take_handler_state();
            new_root.install_handler_state(handlers, stream_ids);
        }
        for node in table.nodes.values() {
            if node.parent_is(&old_root) {
                node.set_parent(&new_root);
            }
        }
        table.root = new_root;
        true
    }

    /// Marks the root as externally configured; from then on
    /// [`Self::replace_root`] is a refusing no-op.
    pub fn mark_root_user_configured(&self) {
        self.shared
            .root_user_configured
            .store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn root_user_configured(&self) -> bool {
        self.shared.root_user_configured.load(Ordering::Relaxed)
    }

    /// Swaps the node strategy used for nodes created from here on.
    pub fn set_node_factory(&self, factory: NodeFactory) {
        *self
            .shared
            .factory
            .write()
            .unwrap_or_else(PoisonError::into_inner) = factory;
    }

    /// Logger for a calling module: the registered name wins, else the top
    /// segment of `module_path` (callers pass `module_path!()`).
    ///
    /// # Errors
    /// `Error::UnresolvedName` when neither source yields a name.
    pub fn get_for_module(&self, module_path: &str) -> Result<Arc<Logger>, Error> {
        let registered = self
            .shared
            .defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .logger_name
            .clone();
        let name = registered
            .or_else(|| resolve::infer_logger_name(module_path))
            .ok_or(Error::UnresolvedName)?;
        Ok(self.get_or_create(&name))
    }

    /// Registers the default level name used when an inherit walk finds no
    /// explicit level anywhere.
    pub fn register_default_level(&self, name: impl Into<String>) {
        self.shared
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .default_level = Some(name.into());
    }

    /// Registers the environment variables probed (in order) for the default
    /// level; replaces the built-in `LOG_LEVEL` probe list.
    pub fn register_level_env_vars(&self, vars: Vec<String>) {
        self.shared
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .env_vars = vars;
    }

    /// Registers the logger name [`Self::get_for_module`] prefers over inference.
    pub fn register_logger_name(&self, name: impl Into<String>) {
        self.shared
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .logger_name = Some(name.into());
    }

    /// Registers the propagation default for newly created nodes.
    pub fn register_propagate(&self, propagate: bool) {
        self.shared
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .propagate = Some(propagate);
    }

    /// Registers a custom level in this tree's registry.
    ///
    /// # Errors
    /// See [`LevelRegistry::register`].
    pub fn register_level(&self, value: LevelValue, name: &str) -> Result<(), Error> {
        self.shared
            .levels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(value, name)
    }

    /// Resolves a level spec through this tree's registry.
    ///
    /// # Errors
    /// `Error::UnknownLevel` for unrecognized names.
    pub fn resolve_level(&self, spec: impl Into<LevelSpec>) -> Result<LevelValue, Error> {
        self.shared
            .levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(spec)
    }

    /// Canonical (or placeholder) name for a level value.
    #[must_use]
    pub fn level_name(&self, value: LevelValue) -> String {
        self.shared
            .levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .name_of(value)
    }

    /// Strict variant of [`Self::level_name`].
    ///
    /// # Errors
    /// `Error::UnknownLevel` for unregistered values.
    pub fn level_name_strict(&self, value: LevelValue) -> Result<String, Error> {
        self.shared
            .levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .name_of_strict(value)
    }

    /// Sets the root's explicit level.
    ///
    /// # Errors
    /// Same validation as [`Logger::set_level`].
    pub fn set_root_level(&self, spec: impl Into<LevelSpec>) -> Result<(), Error> {
        self.root().set_level(spec)
    }

    /// The root's explicit level (`level::INHERIT` when unset).
    #[must_use]
    pub fn root_level(&self) -> LevelValue {
        self.root().level()
    }

    /// Scoped override of the root level; restores on guard drop, panics
    /// included, and invalidates the root's stream-identity cache on exit.
    ///
    /// # Errors
    /// Same validation as [`Logger::set_level`].
    pub fn use_root_level(&self, spec: impl Into<LevelSpec>) -> Result<RootLevelGuard, Error> {
        let value = self.resolve_level(spec)?;
        if value <= level::INHERIT {
            return Err(Error::InvalidLevel {
                name: self.level_name(value),
                value,
            });
        }
        let root = self.root();
        let prev_level = root.level();
        root.apply_level(value);
        Ok(RootLevelGuard { root, prev_level })
    }

    /// Scoped root override that only applies when more verbose than the
    /// root's current effective level.
    ///
    /// # Errors
    /// Same validation as [`Logger::set_level`].
    pub fn use_root_level_minimum(
        &self,
        spec: impl Into<LevelSpec>,
    ) -> Result<RootLevelGuard, Error> {
        let value = self.resolve_level(spec)?;
        if value <= level::INHERIT {
            return Err(Error::InvalidLevel {
                name: self.level_name(value),
                value,
            });
        }
        let root = self.root();
        let prev_level = root.level();
        if root.minimum_applies(value) {
            root.apply_level(value);
        }
        Ok(RootLevelGuard { root, prev_level })
    }

    /// The destination streams shared by every managed handler in this tree.
    /// Redirect them here to isolate output in tests.
    #[must_use]
    pub fn streams(&self) -> Arc<StreamHub> {
        Arc::clone(&self.shared.streams)
    }

    /// Names of all registered (non-root) loggers, sorted.
    #[must_use]
    pub fn logger_names(&self) -> Vec<String> {
        let table = self.shared.table.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = table.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Flushes every node's handlers.
    ///
    /// # Errors
    /// Returns the first I/O error encountered.
    pub fn flush(&self) -> Result<(), Error> {
        let (root, nodes): (Arc<Logger>, Vec<Arc<Logger>>) = {
            let table = self.shared.table.read().unwrap_or_else(PoisonError::into_inner);
            (
                Arc::clone(&table.root),
                table.nodes.values().cloned().collect(),
            )
        };
        root.flush()?;
        for node in nodes {
            node.flush()?;
        }
        Ok(())
    }
}

/// Restores the root's explicit level when dropped. Obtained from
/// [`Hierarchy::use_root_level`]. Owns the root `Arc`, so it outlives any
/// concurrent root replacement without dangling.
#[must_use = "the override ends as soon as the guard is dropped"]
pub struct RootLevelGuard {
    root: Arc<Logger>,
    prev_level: LevelValue,
}

impl Drop for RootLevelGuard {
    fn drop(&mut self) {
        self.root.restore_scope(self.prev_level, None);
    }
}
