//! End-to-end query scenarios

use pipegraph_core::{
    Arg, EdgeRecord, Graph, Gremlin, Output, PipeState, Registry, Token, VertexId, VertexRecord,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn person(id: impl Into<VertexId>, name: &str) -> VertexRecord {
    VertexRecord::new().with_id(id).with_prop("name", name)
}

/// alice -> bob (knows), charlie -> bob (knows), bob -> delta (parent),
/// bob -> charlie (knows), alice -> charlie (parent), charlie -> delta (knows)
fn family() -> Graph {
    Graph::from_records(
        vec![
            person(1, "alice"),
            person(10, "bob"),
            person("charlie", "charlie"),
            person("delta", "delta"),
        ],
        vec![
            EdgeRecord::new(1, 10, "knows"),
            EdgeRecord::new("charlie", 10, "knows"),
            EdgeRecord::new(10, "delta", "parent"),
            EdgeRecord::new(10, "charlie", "knows"),
            EdgeRecord::new(1, "charlie", "parent"),
            EdgeRecord::new("charlie", "delta", "knows"),
        ],
    )
}

fn names(results: &[Output<'_>]) -> Vec<String> {
    let mut names: Vec<String> = results
        .iter()
        .map(|out| match out.to_json() {
            Value::String(s) => s,
            Value::Object(record) => record["name"].as_str().unwrap_or_default().to_string(),
            other => other.to_string(),
        })
        .collect();
    names.sort();
    names
}

#[test]
fn test_alice_knows_bob() {
    let graph = Graph::from_records(
        vec![
            VertexRecord::new().with_prop("name", "alice"),
            VertexRecord::new().with_id(10).with_prop("name", "bob"),
        ],
        vec![EdgeRecord::new(1, 10, "knows")],
    );

    let results = graph.v([1]).out("knows").run();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].to_json(), json!({"_id": 10, "name": "bob"}));
}

#[test]
fn test_two_hops() {
    let graph = family();
    let results = graph.v([1]).out("knows").out(()).property("name").run();
    assert_eq!(names(&results), vec!["charlie", "delta"]);
}

#[test]
fn test_edge_filter_shapes() {
    let graph = family();

    let by_list = graph.v([1]).out(json!(["knows", "parent"])).run();
    assert_eq!(names(&by_list), vec!["bob", "charlie"]);

    let by_record = graph.v([1]).out(json!({"_label": "parent"})).run();
    assert_eq!(names(&by_record), vec!["charlie"]);
}

#[test]
fn test_in_follows_incoming_edges() {
    let graph = family();
    let results = graph.v([10]).in_("knows").run();
    assert_eq!(names(&results), vec!["alice", "charlie"]);
}

#[test]
fn test_string_and_integer_ids_agree() {
    let graph = family();
    let results = graph.v(["10"]).property("name").run();
    assert_eq!(names(&results), vec!["bob"]);
}

#[test]
fn test_source_by_record() {
    let graph = family();
    let results = graph.v([json!({"name": "delta"})]).in_(()).run();
    assert_eq!(names(&results), vec!["bob", "charlie"]);
}

#[test]
fn test_take_in_chunks() {
    let graph = family();
    let mut query = graph.v_all().take(1);

    let mut seen = Vec::new();
    for _ in 0..4 {
        let batch = query.run();
        assert_eq!(batch.len(), 1);
        seen.extend(names(&batch));
    }
    assert!(query.run().is_empty());

    seen.sort();
    assert_eq!(seen, vec!["alice", "bob", "charlie", "delta"]);
}

#[test]
fn test_unique_never_repeats() {
    let graph = family();

    let without = graph.v([1]).out(()).out(()).run();
    assert_eq!(names(&without), vec!["bob", "charlie", "delta", "delta"]);

    let with = graph.v([1]).out(()).out(()).unique().run();
    assert_eq!(names(&with), vec!["bob", "charlie", "delta"]);
}

#[test]
fn test_filters() {
    let graph = family();

    let by_record = graph.v_all().filter(json!({"name": "bob"})).run();
    assert_eq!(names(&by_record), vec!["bob"]);

    let by_predicate = graph
        .v_all()
        .filter_fn(|vertex, _| vertex.id().to_value().is_string())
        .run();
    assert_eq!(names(&by_predicate), vec!["charlie", "delta"]);
}

#[test]
fn test_as_except_finds_co_followers() {
    let graph = family();
    let results = graph
        .v([1])
        .as_("me")
        .out("knows")
        .in_("knows")
        .except("me")
        .run();
    assert_eq!(names(&results), vec!["charlie"]);
}

#[test]
fn test_back_returns_to_bound_vertex() {
    let graph = family();
    let results = graph
        .v([1])
        .as_("start")
        .out(())
        .filter(json!({"name": "charlie"}))
        .back("start")
        .run();
    assert_eq!(names(&results), vec!["alice"]);

    let unbound = graph.v([1]).out(()).back("nowhere").run();
    assert!(unbound.is_empty());
}

#[test]
fn test_merge_collects_bound_vertices() {
    let graph = family();
    let results = graph
        .v([1])
        .as_("a")
        .out("knows")
        .as_("b")
        .out("parent")
        .merge(["a", "b"])
        .property("name")
        .run();
    assert_eq!(names(&results), vec!["alice", "bob"]);
}

#[test]
fn test_alias_defaults_match_explicit_args() {
    let mut registry = Registry::default();
    registry.add_alias("parents", "out", vec![Arg::from("parent")]);
    let graph = family().with_registry(Arc::new(registry));

    let aliased = graph.v([1]).step("parents", ()).run();
    let explicit = graph.v([1]).out("parent").run();
    assert_eq!(names(&aliased), names(&explicit));
    assert_eq!(names(&aliased), vec!["charlie"]);

    let overridden = graph.v([1]).step("parents", "knows").run();
    assert_eq!(names(&overridden), vec!["bob"]);
}

fn shout(graph: &Graph, _args: &[Arg], input: Option<Gremlin>, _state: &mut PipeState) -> Token {
    let Some(mut gremlin) = input else {
        return Token::Pull;
    };
    let name = graph
        .vertex(gremlin.vertex())
        .get("name")
        .and_then(|v| v.as_str().map(str::to_uppercase));
    gremlin.set_result(name.map(Value::String));
    Token::Gremlin(gremlin)
}

#[test]
fn test_custom_pipetype() {
    let mut registry = Registry::default();
    registry.add_pipetype("shout", shout);
    let graph = family().with_registry(Arc::new(registry));

    let results = graph.v([10]).step("shout", ()).run();
    assert_eq!(names(&results), vec!["BOB"]);
}

#[test]
fn test_round_trip_preserves_queries() {
    let graph = family();
    let restored = Graph::from_flat_str(&graph.to_flat_string().unwrap()).unwrap();

    assert_eq!(restored.to_flat(), graph.to_flat());
    assert_eq!(
        names(&restored.v([1]).out("knows").out(()).run()),
        names(&graph.v([1]).out("knows").out(()).run())
    );
}
