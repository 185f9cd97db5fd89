//! Tests for the level registry.

use logtree::level::{self, LevelRegistry};
use logtree::{Error, LevelSpec};

#[test]
fn builtin_names_resolve_case_insensitively() {
    let registry = LevelRegistry::new();
    assert_eq!(registry.resolve("debug").unwrap(), level::DEBUG);
    assert_eq!(registry.resolve("DEBUG").unwrap(), level::DEBUG);
    assert_eq!(registry.resolve("Warning").unwrap(), level::WARNING);
    assert_eq!(registry.resolve("silent").unwrap(), level::SILENT);
}

#[test]
fn aliases_resolve_to_canonical_values() {
    let registry = LevelRegistry::new();
    assert_eq!(registry.resolve("warn").unwrap(), level::WARNING);
    assert_eq!(registry.resolve("err").unwrap(), level::ERROR);
    assert_eq!(registry.resolve("fatal").unwrap(), level::CRITICAL);
    // Aliases never become canonical names.
    assert_eq!(registry.name_of(level::WARNING), "WARNING");
}

#[test]
fn integer_specs_pass_through_unchanged() {
    let registry = LevelRegistry::new();
    assert_eq!(registry.resolve(17).unwrap(), 17);
    assert_eq!(registry.resolve(level::INHERIT).unwrap(), level::INHERIT);
}

#[test]
fn unknown_name_is_an_error() {
    let registry = LevelRegistry::new();
    assert!(matches!(
        registry.resolve("nope"),
        Err(Error::UnknownLevel(name)) if name == "nope"
    ));
}

#[test]
fn register_custom_level() {
    let mut registry = LevelRegistry::new();
    registry.register(22, "NOTICE").unwrap();
    assert_eq!(registry.resolve("notice").unwrap(), 22);
    assert_eq!(registry.name_of(22), "NOTICE");
    assert!(registry.contains_name("notice"));
    assert!(!registry.contains_name("remark"));
}

#[test]
fn register_is_idempotent() {
    let mut registry = LevelRegistry::new();
    registry.register(22, "NOTICE").unwrap();
    registry.register(22, "notice").unwrap();
    registry.register(22, "NOTICE").unwrap();
    assert_eq!(registry.resolve("notice").unwrap(), 22);
}

#[test]
fn register_rejects_name_bound_to_different_value() {
    let mut registry = LevelRegistry::new();
    registry.register(22, "NOTICE").unwrap();
    assert!(matches!(
        registry.register(23, "NOTICE"),
        Err(Error::LevelConflict { .. })
    ));
}

#[test]
fn register_rejects_value_bound_to_different_name() {
    let mut registry = LevelRegistry::new();
    registry.register(22, "NOTICE").unwrap();
    assert!(matches!(
        registry.register(22, "REMARK"),
        Err(Error::LevelConflict { .. })
    ));
    // Builtins are bindings too.
    assert!(matches!(
        registry.register(level::DEBUG, "VERBOSE"),
        Err(Error::LevelConflict { .. })
    ));
}

#[test]
fn register_rejects_non_positive_values() {
    let mut registry = LevelRegistry::new();
    assert!(matches!(
        registry.register(0, "ZERO"),
        Err(Error::InvalidLevel { value: 0, .. })
    ));
    assert!(matches!(
        registry.register(-5, "NEGATIVE"),
        Err(Error::InvalidLevel { value: -5, .. })
    ));
}

#[test]
fn name_of_is_lenient_for_unregistered_values() {
    let registry = LevelRegistry::new();
    assert_eq!(registry.name_of(999), "Level 999");
    assert_eq!(registry.name_of(level::INHERIT), "NOTSET");
}

#[test]
fn name_of_strict_fails_for_unregistered_values() {
    let registry = LevelRegistry::new();
    assert!(registry.name_of_strict(level::INFO).is_ok());
    assert!(matches!(
        registry.name_of_strict(999),
        Err(Error::UnknownLevel(_))
    ));
}

#[test]
fn level_order_is_ascending() {
    for pair in level::LEVEL_ORDER.windows(2) {
        assert!(pair[0].1 < pair[1].1, "{} >= {}", pair[0].0, pair[1].0);
    }
}

#[test]
fn spec_conversions() {
    assert_eq!(LevelSpec::from(10), LevelSpec::Value(10));
    assert_eq!(LevelSpec::from("info"), LevelSpec::Name("info".to_string()));
    assert_eq!(
        LevelSpec::from(String::from("info")),
        LevelSpec::Name("info".to_string())
    );
}
