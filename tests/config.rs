//! Tests for TOML config loading, includes, and hierarchy construction.

use std::fs;

use logtree::{Config, Error, Hierarchy, level};
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let tmp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&tmp_dir.path().join("absent.toml")).unwrap();
    assert!(config.general.level.is_none());
    assert!(config.general.propagate);
    assert_eq!(config.general.colors, "auto");
    assert!(config.levels.is_empty());
}

#[test]
fn empty_file_yields_defaults() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("empty.toml");
    fs::write(&path, "").unwrap();
    let config = Config::load_from(&path).unwrap();
    assert!(config.resolve.env_vars.is_empty());
}

#[test]
fn full_schema_parses() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("logtree.toml");
    fs::write(
        &path,
        r#"
[general]
level = "warning"
propagate = false
colors = "never"
timestamps = true

[resolve]
env_vars = ["MYAPP_LOG_LEVEL", "LOG_LEVEL"]
default_level = "info"
logger_name = "myapp"

[levels]
notice = 22
audit = 35
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.general.level.as_deref(), Some("warning"));
    assert!(!config.general.propagate);
    assert_eq!(config.general.colors, "never");
    assert!(config.general.timestamps);
    assert_eq!(config.resolve.env_vars.len(), 2);
    assert_eq!(config.resolve.default_level.as_deref(), Some("info"));
    assert_eq!(config.levels.get("notice"), Some(&22));
    assert_eq!(config.levels.get("audit"), Some(&35));
}

#[test]
fn sources_merge_without_overriding_the_primary() {
    let tmp_dir = TempDir::new().unwrap();
    let base_path = tmp_dir.path().join("base.toml");
    let child_path = tmp_dir.path().join("child.toml");

    let base_content = format!(
        r#"
source = "{}"

[general]
level = "warning"

[levels]
notice = 22
"#,
        child_path.display()
    );
    fs::write(&base_path, base_content).unwrap();

    fs::write(
        &child_path,
        r#"
[general]
level = "debug"

[resolve]
default_level = "info"

[levels]
notice = 99
audit = 35
"#,
    )
    .unwrap();

    let config = Config::load_from(&base_path).unwrap();
    // Primary file wins on collisions; includes fill the gaps.
    assert_eq!(config.general.level.as_deref(), Some("warning"));
    assert_eq!(config.levels.get("notice"), Some(&22));
    assert_eq!(config.levels.get("audit"), Some(&35));
    assert_eq!(config.resolve.default_level.as_deref(), Some("info"));
}

#[test]
fn missing_source_is_ignored() {
    let tmp_dir = TempDir::new().unwrap();
    let base_path = tmp_dir.path().join("base.toml");
    let base_content = format!(
        r#"
source = "{}"

[levels]
notice = 22
"#,
        tmp_dir.path().join("missing.toml").display()
    );
    fs::write(&base_path, base_content).unwrap();

    let config = Config::load_from(&base_path).unwrap();
    assert_eq!(config.levels.get("notice"), Some(&22));
}

#[test]
fn cyclic_sources_are_detected() {
    let tmp_dir = TempDir::new().unwrap();
    let a_path = tmp_dir.path().join("a.toml");
    let b_path = tmp_dir.path().join("b.toml");

    fs::write(&a_path, format!("source = \"{}\"\n", b_path.display())).unwrap();
    fs::write(&b_path, format!("source = \"{}\"\n", a_path.display())).unwrap();

    assert!(matches!(
        Config::load_from(&a_path),
        Err(Error::CyclicInclude(_))
    ));
}

#[test]
fn from_config_builds_a_working_tree() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("logtree.toml");
    fs::write(
        &path,
        r#"
[general]
level = "notice"
propagate = false
colors = "never"

[resolve]
env_vars = ["LOGTREE_CONFIG_TEST_UNSET"]

[levels]
notice = 22
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let tree = Hierarchy::from_config(&config).unwrap();

    // The custom level is registered and names the root level.
    assert_eq!(tree.root_level(), 22);
    assert_eq!(tree.level_name(22), "NOTICE");
    assert_eq!(tree.level_name_strict(22).unwrap(), "NOTICE");
    assert!(tree.level_name_strict(23).is_err());
    assert_eq!(tree.resolve_level("notice").unwrap(), 22);

    // The propagation default from the file applies to new nodes.
    let node = tree.get_or_create("app");
    assert!(!node.propagate());
    assert_eq!(node.effective_level(), 22);
}

#[test]
fn from_config_rejects_unknown_root_level() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("logtree.toml");
    fs::write(&path, "[general]\nlevel = \"louder\"\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(Hierarchy::from_config(&config).is_err());
}

#[test]
fn extract_sources_strips_directives() {
    let (sources, remaining) = logtree::config::extract_sources(
        "source = \"extra.toml\"\n[general]\nlevel = \"info\"\n",
    );
    assert_eq!(sources, vec!["extra.toml"]);
    assert!(!remaining.contains("source"));
    assert!(remaining.contains("[general]"));
}
