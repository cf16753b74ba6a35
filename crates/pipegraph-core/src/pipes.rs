//! Built-in pipetypes

use crate::error::Error;
use crate::graph::{Direction, EdgeIx, Graph, VertexIx};
use crate::gremlin::Gremlin;
use crate::pipe::{Arg, PipeState, Token};
use crate::registry::Registry;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashSet;

pub(crate) fn register_builtins(registry: &mut Registry) {
    registry
        .add_pipetype("vertex", vertex)
        .add_pipetype("in", traverse_in)
        .add_pipetype("out", traverse_out)
        .add_pipetype("property", property)
        .add_pipetype("unique", unique)
        .add_pipetype("filter", filter)
        .add_pipetype("take", take)
        .add_pipetype("as", as_)
        .add_pipetype("back", back)
        .add_pipetype("except", except)
        .add_pipetype("merge", merge);
}

#[derive(Default)]
struct VertexState {
    candidates: Option<Vec<VertexIx>>,
}

/// Source: one fresh gremlin per selected vertex, consumed from the end
pub fn vertex(graph: &Graph, args: &[Arg], _input: Option<Gremlin>, state: &mut PipeState) -> Token {
    let state = state.get_or_default::<VertexState>();
    let candidates = state
        .candidates
        .get_or_insert_with(|| graph.find_vertices(args));

    match candidates.pop() {
        Some(ix) => Token::Gremlin(Gremlin::new(ix)),
        None => Token::Done,
    }
}

#[derive(Default)]
struct TraversalState {
    gremlin: Option<Gremlin>,
    edges: Vec<EdgeIx>,
}

pub fn traverse_out(graph: &Graph, args: &[Arg], input: Option<Gremlin>, state: &mut PipeState) -> Token {
    traverse(Direction::Out, graph, args, input, state)
}

pub fn traverse_in(graph: &Graph, args: &[Arg], input: Option<Gremlin>, state: &mut PipeState) -> Token {
    traverse(Direction::In, graph, args, input, state)
}

fn traverse(
    direction: Direction,
    graph: &Graph,
    args: &[Arg],
    input: Option<Gremlin>,
    state: &mut PipeState,
) -> Token {
    let state = state.get_or_default::<TraversalState>();

    if state.edges.is_empty() {
        let Some(gremlin) = input else {
            return Token::Pull;
        };
        state.edges = graph
            .find_edges(gremlin.vertex(), direction)
            .iter()
            .copied()
            .filter(|&edge| edge_passes(graph, edge, args.first()))
            .collect();
        state.gremlin = Some(gremlin);
    }

    let (Some(edge), Some(gremlin)) = (state.edges.pop(), state.gremlin.as_ref()) else {
        return Token::Pull;
    };
    Token::Gremlin(gremlin.goto(graph.edge(edge).endpoint(direction.opposite())))
}

/// Edge filter: exact label, list of labels, or an edge record.
/// Anything else keeps every edge.
fn edge_passes(graph: &Graph, edge: EdgeIx, filter: Option<&Arg>) -> bool {
    let label = graph.edge(edge).label();
    match filter.and_then(Arg::as_value) {
        Some(Value::String(wanted)) => label == Some(wanted.as_str()),
        Some(Value::Array(wanted)) => {
            label.is_some_and(|l| wanted.iter().any(|w| w.as_str() == Some(l)))
        }
        Some(Value::Object(record)) => graph.edge_matches(edge, record),
        _ => true,
    }
}

/// Project a named attribute into the gremlin's result; vertices without it
/// are dropped
pub fn property(graph: &Graph, args: &[Arg], input: Option<Gremlin>, _state: &mut PipeState) -> Token {
    let Some(mut gremlin) = input else {
        return Token::Pull;
    };

    let value = args
        .first()
        .and_then(Arg::as_str)
        .and_then(|name| graph.vertex(gremlin.vertex()).get(name))
        .map(Cow::into_owned)
        .filter(|v| !v.is_null());

    match value {
        Some(value) => {
            gremlin.set_result(Some(value));
            Token::Gremlin(gremlin)
        }
        None => Token::Nothing,
    }
}

pub fn unique(_graph: &Graph, _args: &[Arg], input: Option<Gremlin>, state: &mut PipeState) -> Token {
    let Some(gremlin) = input else {
        return Token::Pull;
    };
    let seen = state.get_or_default::<HashSet<VertexIx>>();
    if seen.insert(gremlin.vertex()) {
        Token::Gremlin(gremlin)
    } else {
        Token::Pull
    }
}

/// Keep gremlins whose vertex matches a record or satisfies a predicate.
/// Anything else is reported and lets every gremlin through.
pub fn filter(graph: &Graph, args: &[Arg], input: Option<Gremlin>, _state: &mut PipeState) -> Token {
    let Some(gremlin) = input else {
        return Token::Pull;
    };
    let vertex = graph.vertex(gremlin.vertex());

    let keep = match args.first() {
        Some(Arg::Value(Value::Object(record))) => vertex.matches(record),
        Some(Arg::Predicate(test)) => test(vertex, &gremlin),
        other => {
            let shown = other.map_or_else(|| "nothing".to_string(), |arg| format!("{:?}", arg));
            tracing::error!("{}", Error::InvalidFilter(shown));
            true
        }
    };

    if keep {
        Token::Gremlin(gremlin)
    } else {
        Token::Pull
    }
}

#[derive(Default)]
struct TakeState {
    taken: u64,
}

/// Pass at most `n` gremlins, then report done and start counting again.
/// Without a count every gremlin passes.
pub fn take(_graph: &Graph, args: &[Arg], input: Option<Gremlin>, state: &mut PipeState) -> Token {
    let limit = args.first().and_then(Arg::as_value).and_then(Value::as_u64);
    let state = state.get_or_default::<TakeState>();

    if limit.is_some_and(|n| state.taken >= n) {
        state.taken = 0;
        return Token::Done;
    }

    let Some(gremlin) = input else {
        return Token::Pull;
    };
    state.taken += 1;
    Token::Gremlin(gremlin)
}

pub fn as_(_graph: &Graph, args: &[Arg], input: Option<Gremlin>, _state: &mut PipeState) -> Token {
    let Some(gremlin) = input else {
        return Token::Pull;
    };
    if let Some(label) = args.first().and_then(Arg::as_str) {
        gremlin.bind(label);
    }
    Token::Gremlin(gremlin)
}

pub fn back(_graph: &Graph, args: &[Arg], input: Option<Gremlin>, _state: &mut PipeState) -> Token {
    let Some(gremlin) = input else {
        return Token::Pull;
    };
    match args.first().and_then(Arg::as_str).and_then(|label| gremlin.bound(label)) {
        Some(target) => Token::Gremlin(gremlin.goto(target)),
        None => Token::Pull,
    }
}

pub fn except(_graph: &Graph, args: &[Arg], input: Option<Gremlin>, _state: &mut PipeState) -> Token {
    let Some(gremlin) = input else {
        return Token::Pull;
    };
    let bound = args.first().and_then(Arg::as_str).and_then(|label| gremlin.bound(label));
    if bound == Some(gremlin.vertex()) {
        Token::Pull
    } else {
        Token::Gremlin(gremlin)
    }
}

#[derive(Default)]
struct MergeState {
    source: Option<Gremlin>,
    vertices: Vec<VertexIx>,
}

/// Fan out to every vertex bound under the given labels; unbound labels are
/// skipped
pub fn merge(_graph: &Graph, args: &[Arg], input: Option<Gremlin>, state: &mut PipeState) -> Token {
    let state = state.get_or_default::<MergeState>();

    if state.vertices.is_empty() {
        let Some(gremlin) = input else {
            return Token::Pull;
        };
        state.vertices = args
            .iter()
            .filter_map(Arg::as_str)
            .filter_map(|label| gremlin.bound(label))
            .collect();
        state.source = Some(gremlin);
    }

    let (Some(vertex), Some(source)) = (state.vertices.pop(), state.source.as_ref()) else {
        return Token::Pull;
    };
    Token::Gremlin(source.goto(vertex))
}
