//! Layering rules for the engine and the terminal renderer

use std::fs;

use architectural_enforcement::{assert_no_violations, find_violations, rust_sources, workspace_root};

#[test]
fn no_blocking_sleep_in_engine_or_renderer() {
    let root = workspace_root();
    for dir in ["engine/core/src", "tui/src"] {
        let violations = find_violations(&root.join(dir), &["std::thread::sleep", "thread::sleep("]);
        assert_no_violations("blocking sleep (use scheduled timers)", &violations);
    }
}

#[test]
fn engine_core_has_no_rendering_dependencies() {
    let root = workspace_root();
    let core = root.join("engine/core");

    let violations = find_violations(&core.join("src"), &["ratatui", "crossterm"]);
    assert_no_violations("rendering crate used in engine core", &violations);

    let manifest = fs::read_to_string(core.join("Cargo.toml")).expect("engine core manifest");
    for forbidden in ["ratatui", "crossterm"] {
        assert!(
            !manifest.contains(forbidden),
            "engine core Cargo.toml depends on {forbidden}"
        );
    }
}

#[test]
fn engine_core_never_prints() {
    let root = workspace_root();
    let violations = find_violations(&root.join("engine/core/src"), &["println!", "eprintln!"]);
    assert_no_violations("direct printing in engine core (use tracing)", &violations);
}

#[test]
fn scanned_trees_exist() {
    let root = workspace_root();
    assert!(!rust_sources(&root.join("engine/core/src")).is_empty());
    assert!(!rust_sources(&root.join("tui/src")).is_empty());
}
