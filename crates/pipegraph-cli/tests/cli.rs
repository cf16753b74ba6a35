//! Command-line behavior against a throwaway data directory

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn pipegraph(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pipegraph").unwrap();
    cmd.env("PIPEGRAPH_CONFIG", dir.path().join("config.toml"))
        .env_remove("PIPEGRAPH_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

fn seed(dir: &TempDir) {
    pipegraph(dir)
        .args(["vertex", "add", "--id", "1", "-p", "name=alice"])
        .assert()
        .success();
    pipegraph(dir)
        .args(["vertex", "add", "--id", "10", "-p", "name=bob"])
        .assert()
        .success();
    pipegraph(dir)
        .args(["edge", "add", "1", "10", "-l", "knows"])
        .assert()
        .success();
}

#[test]
fn test_add_and_query() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    pipegraph(&dir)
        .args(["-f", "json", "query", r#"v(1).out("knows").property("name")"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bob\""));
}

#[test]
fn test_duplicate_vertex_rejected() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    pipegraph(&dir)
        .args(["vertex", "add", "--id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_dangling_edge_rejected() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    pipegraph(&dir)
        .args(["edge", "add", "1", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wasn't found"));
}

#[test]
fn test_reserved_properties_rejected() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    pipegraph(&dir)
        .args(["edge", "add", "1", "10", "-l", "knows", "-p", "_in=5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));

    pipegraph(&dir)
        .args(["vertex", "add", "-p", "_id=7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));

    pipegraph(&dir)
        .args(["-f", "json", "query", r#"v(1).out().property("name")"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bob\""));
}

#[test]
fn test_named_graphs_are_separate() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    pipegraph(&dir)
        .args(["--graph", "other", "query", "v()"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results"));

    pipegraph(&dir)
        .args(["graph", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graph (current)"));
}

#[test]
fn test_query_in_chunks() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    pipegraph(&dir)
        .args(["vertex", "add", "-p", "name=carol"])
        .assert()
        .success();

    pipegraph(&dir)
        .args(["query", "v().take(1)", "--chunks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch 3:"))
        .stdout(predicate::str::contains("Batch 4:").not());
}

#[test]
fn test_invalid_script() {
    let dir = TempDir::new().unwrap();
    pipegraph(&dir)
        .args(["query", "v(1).out(knows)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid arguments"));
}

#[test]
fn test_import_export_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.json");
    let flat = json!({
        "V": [{"_id": 1, "name": "alice"}, {"_id": "b", "name": "bob"}],
        "E": [{"_out": 1, "_in": "b", "_label": "knows", "since": 2019}]
    });
    std::fs::write(&input, flat.to_string()).unwrap();

    pipegraph(&dir)
        .arg("import")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 vertices and 1 edges"));

    pipegraph(&dir)
        .arg("import")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--merge"));

    pipegraph(&dir)
        .args(["export", "-o"])
        .arg(&output)
        .assert()
        .success();

    let exported: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(exported, flat);
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();

    pipegraph(&dir)
        .args(["config", "set", "default_graph", "social"])
        .assert()
        .success();

    pipegraph(&dir)
        .args(["config", "get", "default_graph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("social"));

    pipegraph(&dir)
        .args(["config", "get", "colour"])
        .assert()
        .failure();
}
