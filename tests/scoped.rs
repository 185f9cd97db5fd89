//! Tests for scoped level overrides: restore-on-exit, restore-on-panic, and
//! minimum semantics.

use std::panic::{AssertUnwindSafe, catch_unwind};

use logtree::{Hierarchy, level};

fn isolated_tree() -> Hierarchy {
    Hierarchy::builder()
        .env_vars(vec!["LOGTREE_TEST_UNSET_VAR".to_string()])
        .build()
        .unwrap()
}

#[test]
fn use_level_restores_explicit_level() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");
    logger.set_level("info").unwrap();

    {
        let _scope = logger.use_level("trace").unwrap();
        assert_eq!(logger.level(), level::TRACE);
    }
    assert_eq!(logger.level(), level::INFO);
}

#[test]
fn use_level_restores_the_inherit_sentinel() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");

    {
        let _scope = logger.use_level("debug").unwrap();
        assert_eq!(logger.level(), level::DEBUG);
    }
    assert_eq!(logger.level(), level::INHERIT);
}

#[test]
fn use_level_restores_on_panic() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");
    logger.set_level("info").unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _scope = logger.use_level("trace").unwrap();
        assert_eq!(logger.level(), level::TRACE);
        panic!("boom");
    }));
    assert!(result.is_err());
    assert_eq!(logger.level(), level::INFO);
}

#[test]
fn use_level_rejects_inherit_and_unknown_names() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");
    assert!(logger.use_level(0).is_err());
    assert!(logger.use_level("louder").is_err());
}

#[test]
fn use_level_minimum_only_upgrades() {
    let tree = isolated_tree();
    tree.set_root_level("info").unwrap();
    let logger = tree.get_or_create("app");

    {
        // WARNING is less verbose than the effective INFO: not applied.
        let _scope = logger.use_level_minimum("warning").unwrap();
        assert_eq!(logger.effective_level(), level::INFO);
    }
    {
        let _scope = logger.use_level_minimum("trace").unwrap();
        assert_eq!(logger.effective_level(), level::TRACE);
    }
    assert_eq!(logger.level(), level::INHERIT);
}

#[test]
fn nested_guards_unwind_in_order() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");
    logger.set_level("info").unwrap();

    {
        let _outer = logger.use_level("debug").unwrap();
        {
            let _inner = logger.use_level("trace").unwrap();
            assert_eq!(logger.level(), level::TRACE);
        }
        assert_eq!(logger.level(), level::DEBUG);
    }
    assert_eq!(logger.level(), level::INFO);
}

#[test]
fn use_level_and_propagate_with_inherit_turns_propagation_on() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");
    logger.set_propagate(false);
    logger.set_level("debug").unwrap();

    {
        let _scope = logger.use_level_and_propagate(level::INHERIT).unwrap();
        assert_eq!(logger.level(), level::INHERIT);
        assert!(logger.propagate());
    }
    assert_eq!(logger.level(), level::DEBUG);
    assert!(!logger.propagate());
}

#[test]
fn use_level_and_propagate_with_concrete_level_turns_propagation_off() {
    let tree = isolated_tree();
    let logger = tree.get_or_create("app");
    logger.set_propagate(true);

    {
        let _scope = logger.use_level_and_propagate("debug").unwrap();
        assert_eq!(logger.level(), level::DEBUG);
        assert!(!logger.propagate());
    }
    assert_eq!(logger.level(), level::INHERIT);
    assert!(logger.propagate());
}

#[test]
fn use_level_and_propagate_on_root_leaves_propagation_alone() {
    let tree = isolated_tree();
    let root = tree.root();
    let original_propagate = root.propagate();

    {
        let _scope = root.use_level_and_propagate("debug").unwrap();
        assert_eq!(root.level(), level::DEBUG);
        assert_eq!(root.propagate(), original_propagate);
    }
    assert_eq!(root.level(), level::INHERIT);
    assert_eq!(root.propagate(), original_propagate);
}

#[test]
fn use_root_level_temporarily_changes_root_level() {
    let tree = isolated_tree();
    tree.set_root_level("info").unwrap();

    {
        let _scope = tree.use_root_level("debug").unwrap();
        assert_eq!(tree.root_level(), level::DEBUG);
    }
    assert_eq!(tree.root_level(), level::INFO);
}

#[test]
fn use_root_level_restores_on_panic() {
    let tree = isolated_tree();
    tree.set_root_level("info").unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _scope = tree.use_root_level("debug").unwrap();
        panic!("boom");
    }));
    assert!(result.is_err());
    assert_eq!(tree.root_level(), level::INFO);
}

#[test]
fn use_root_level_accepts_names_and_values() {
    let tree = isolated_tree();
    tree.set_root_level("info").unwrap();

    {
        let _scope = tree.use_root_level("debug").unwrap();
        assert_eq!(tree.root_level(), level::DEBUG);
    }
    {
        let _scope = tree.use_root_level(level::WARNING).unwrap();
        assert_eq!(tree.root_level(), level::WARNING);
    }
    assert_eq!(tree.root_level(), level::INFO);
}

#[test]
fn use_root_level_minimum_only_upgrades() {
    let tree = isolated_tree();
    tree.set_root_level("info").unwrap();

    {
        let _scope = tree.use_root_level_minimum("warning").unwrap();
        assert_eq!(tree.root_level(), level::INFO);
    }
    {
        let _scope = tree.use_root_level_minimum("trace").unwrap();
        assert_eq!(tree.root_level(), level::TRACE);
    }
    assert_eq!(tree.root_level(), level::INFO);
}

#[test]
fn guard_exit_invalidates_stream_identity_cache() {
    let tree = isolated_tree();
    let root = tree.root();

    // Emitting builds the managed handler and records the stream identities.
    root.info("prime the handler");
    assert!(root.stream_identity_cache().is_some());

    {
        let _scope = tree.use_root_level("debug").unwrap();
    }
    // Stale identities must not survive the scope: the caller's environment
    // may swap streams before the next log call.
    assert!(root.stream_identity_cache().is_none());
}
