#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `debug` command against the bundled sample
//! declaration.

mod common;

use std::path::PathBuf;

use common::*;
use furnish_cli::commands::{debug, load_declaration};

fn sample() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/furnish.toml")
}

fn report() -> String {
    let log = RecordingLog::default();
    let mut declaration = load_declaration(&sample(), &log).unwrap();
    let mut out = Vec::new();
    debug::report(&mut declaration, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn sample_declaration_loads() {
    let log = RecordingLog::default();
    let declaration = load_declaration(&sample(), &log).unwrap();
    assert_eq!(declaration.stages.len(), 3);
    assert_eq!(declaration.module_count(), 8);
    assert!(declaration.has_packages());
    assert!(log.contains("loaded 3 stages, 8 modules"));
}

#[test]
fn sample_execution_order() {
    let out = report();
    let order: Vec<&str> = out
        .lines()
        .skip_while(|l| *l != "execution order:")
        .skip(1)
        .map(str::trim)
        .collect();
    assert_eq!(
        order,
        [
            "1. base: xcode-select -> ssh",
            "2. tools: git -> ripgrep -> jq -> wget",
            "3. shell: oh-my-zsh -> zshrc",
        ]
    );
}

#[test]
fn report_json_includes_computed_dependants() {
    let out = report();
    let json_end = out.find("\n\nexecution order:").unwrap();
    let value: serde_json::Value = serde_json::from_str(&out[..json_end]).unwrap();
    let stages = value["stages"].as_array().unwrap();
    let tools = stages.iter().find(|s| s["id"] == "tools").unwrap();
    assert_eq!(tools["dependants"], serde_json::json!(["shell"]));
}

#[test]
fn report_does_not_apply_anything() {
    let ws = Workspace::new();
    let text = format!("[main]\n[[main.shell]]\n{}", recording_shell("A", &[]));
    let log = RecordingLog::default();
    let mut declaration = load_declaration(&ws.declare(&text), &log).unwrap();
    debug::report(&mut declaration, &mut Vec::new()).unwrap();
    assert!(ws.order().is_empty());
}
