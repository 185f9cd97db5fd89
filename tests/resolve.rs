//! Tests for default-level resolution and logger-name inference.

use logtree::resolve::{DEFAULT_LEVEL_NAME, default_level_name, infer_logger_name};
use logtree::{Error, Hierarchy};

fn unset(vars: &[&str]) -> Vec<String> {
    vars.iter().map(ToString::to_string).collect()
}

#[test]
fn cli_level_wins_over_everything() {
    let name = default_level_name(
        Some("debug"),
        &unset(&["LOGTREE_RESOLVE_UNSET_A"]),
        Some("info"),
        Some("warning"),
    );
    assert_eq!(name, "DEBUG");
}

#[test]
fn env_vars_are_probed_in_order() {
    // SAFETY: test-only mutation with names no other test uses.
    unsafe {
        std::env::set_var("LOGTREE_RESOLVE_SECOND", "trace");
    }
    let name = default_level_name(
        None,
        &unset(&["LOGTREE_RESOLVE_FIRST_UNSET", "LOGTREE_RESOLVE_SECOND"]),
        None,
        None,
    );
    assert_eq!(name, "TRACE");
}

#[test]
fn empty_env_values_are_skipped() {
    // SAFETY: test-only mutation with names no other test uses.
    unsafe {
        std::env::set_var("LOGTREE_RESOLVE_EMPTY", "");
        std::env::set_var("LOGTREE_RESOLVE_FILLED", "minimal");
    }
    let name = default_level_name(
        None,
        &unset(&["LOGTREE_RESOLVE_EMPTY", "LOGTREE_RESOLVE_FILLED"]),
        None,
        None,
    );
    assert_eq!(name, "MINIMAL");
}

#[test]
fn fallback_beats_registered_default() {
    let name = default_level_name(
        None,
        &unset(&["LOGTREE_RESOLVE_UNSET_B"]),
        Some("info"),
        Some("warning"),
    );
    assert_eq!(name, "INFO");
}

#[test]
fn registered_default_beats_builtin_default() {
    let name = default_level_name(None, &unset(&["LOGTREE_RESOLVE_UNSET_C"]), None, Some("warning"));
    assert_eq!(name, "WARNING");
}

#[test]
fn builtin_default_is_the_last_resort() {
    let name = default_level_name(None, &unset(&["LOGTREE_RESOLVE_UNSET_D"]), None, None);
    assert_eq!(name, DEFAULT_LEVEL_NAME);
}

#[test]
fn infer_takes_the_top_module_segment() {
    assert_eq!(infer_logger_name("myapp::net::tcp").as_deref(), Some("myapp"));
    assert_eq!(infer_logger_name("solo").as_deref(), Some("solo"));
    assert_eq!(infer_logger_name(""), None);
    assert_eq!(infer_logger_name("  "), None);
}

#[test]
fn get_for_module_infers_from_the_module_path() {
    let tree = Hierarchy::builder()
        .env_vars(vec!["LOGTREE_TEST_UNSET_VAR".to_string()])
        .build()
        .unwrap();
    let logger = tree.get_for_module(module_path!()).unwrap();
    assert_eq!(logger.name(), "resolve");
}

#[test]
fn get_for_module_prefers_the_registered_name() {
    let tree = Hierarchy::builder()
        .env_vars(vec!["LOGTREE_TEST_UNSET_VAR".to_string()])
        .logger_name("myapp")
        .build()
        .unwrap();
    let logger = tree.get_for_module(module_path!()).unwrap();
    assert_eq!(logger.name(), "myapp");
}

#[test]
fn get_for_module_fails_when_nothing_resolves() {
    let tree = Hierarchy::new();
    assert!(matches!(tree.get_for_module(""), Err(Error::UnresolvedName)));
}

#[test]
fn registered_env_vars_drive_the_fallback_level() {
    // SAFETY: test-only mutation with a name no other test uses.
    unsafe {
        std::env::set_var("LOGTREE_RESOLVE_TREE_LEVEL", "warning");
    }
    let tree = Hierarchy::builder()
        .env_vars(vec!["LOGTREE_RESOLVE_TREE_LEVEL".to_string()])
        .build()
        .unwrap();
    let logger = tree.get_or_create("app");
    assert_eq!(logger.effective_level(), logtree::level::WARNING);
}
