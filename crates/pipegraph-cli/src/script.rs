//! Textual query scripts
//!
//! A script is a dot-separated chain of steps, each written `name(args)` with
//! the arguments as comma-separated JSON values:
//!
//! ```text
//! v(1).out("knows").as("me").in().except("me").take(5)
//! ```
//!
//! `v` starts at the listed vertex ids (or at every vertex when empty); every
//! other name is a pipetype looked up in the registry when the query runs.

use anyhow::Context;
use pipegraph_core::{Arg, Args, Graph, Query};
use serde_json::Value;

/// One parsed step
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub pipetype: String,
    pub args: Vec<Value>,
}

/// Parse a script into steps
pub fn parse(script: &str) -> anyhow::Result<Vec<ScriptStep>> {
    let script = script.trim();
    if script.is_empty() {
        anyhow::bail!("Empty query script");
    }

    split_top_level(script)?
        .into_iter()
        .map(parse_step)
        .collect()
}

/// Build a query over `graph` from parsed steps
pub fn build<'g>(graph: &'g Graph, steps: &[ScriptStep]) -> Query<'g> {
    steps.iter().fold(graph.query(), |query, step| {
        let args: Vec<Arg> = step.args.iter().cloned().map(Arg::from).collect();
        query.step(step.pipetype.clone(), Args(args))
    })
}

fn parse_step(segment: &str) -> anyhow::Result<ScriptStep> {
    let segment = segment.trim();
    let open = segment
        .find('(')
        .with_context(|| format!("Expected '(' in step '{}'", segment))?;
    if !segment.ends_with(')') {
        anyhow::bail!("Expected ')' at the end of step '{}'", segment);
    }

    let name = segment[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        anyhow::bail!("Invalid step name '{}'", name);
    }

    let inner = &segment[open + 1..segment.len() - 1];
    let args: Vec<Value> = serde_json::from_str(&format!("[{}]", inner))
        .with_context(|| format!("Invalid arguments in step '{}'", segment))?;

    let pipetype = match name {
        "v" => "vertex",
        other => other,
    };

    Ok(ScriptStep {
        pipetype: pipetype.to_string(),
        args,
    })
}

/// Split on dots outside of brackets and string literals
fn split_top_level(script: &str) -> anyhow::Result<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in script.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    anyhow::bail!("Unbalanced '{}' at offset {}", c, i);
                }
            }
            '.' if depth == 0 => {
                segments.push(&script[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_string {
        anyhow::bail!("Unterminated string literal");
    }
    if depth != 0 {
        anyhow::bail!("Unbalanced brackets");
    }
    segments.push(&script[start..]);
    Ok(segments)
}
