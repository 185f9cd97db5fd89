#![forbid(unsafe_code)]

//! `logtree` - Hierarchical logging levels, handler policy, and safe root
//! replacement.
//!
//! A tree of named loggers with inherited severity levels (custom levels
//! included), automatic attachment and removal of output handlers driven by
//! each node's propagation state, and hot-replacement of the root node
//! without breaking parent links or duplicating output.
//!
//! # Example
//!
//! ```
//! use logtree::{Hierarchy, level};
//!
//! let tree = Hierarchy::new();
//! tree.set_root_level("warning").unwrap();
//!
//! let logger = tree.get_or_create("app.net");
//! assert_eq!(logger.effective_level(), level::WARNING);
//!
//! logger.warning("connection timeout");
//! logger.debug("not emitted at this level");
//!
//! {
//!     let _scope = logger.use_level("trace").unwrap();
//!     logger.debug("emitted while the override is in scope");
//! }
//! assert_eq!(logger.level(), level::INHERIT);
//! ```
//!
//! # Features
//!
//! - `cli`: clap argument fragment for the default-level resolution chain

// Core modules (always available)
pub mod config;
pub mod error;
pub mod fmt;
pub mod handler;
pub mod hierarchy;
pub mod internal;
pub mod level;
pub mod logger;
pub mod resolve;
pub mod stream;

// Re-exports for convenience
pub use config::Config;
pub use error::Error;
pub use fmt::{Color, ColorMode, TagConfig, TagStyle};
pub use handler::{DualStreamHandler, Handler, Record};
pub use hierarchy::{Hierarchy, HierarchyBuilder, NodeFactory, NodeOptions, RootLevelGuard};
pub use level::{LevelRegistry, LevelSpec, LevelValue};
pub use logger::{LevelGuard, Logger};
pub use stream::{MemorySink, StreamHub, StreamIds};

// CLI re-exports
#[cfg(feature = "cli")]
pub use resolve::LevelArgs;
