//! Query builder and the pipeline virtual machine

use crate::graph::{Graph, Vertex};
use crate::gremlin::Gremlin;
use crate::pipe::{passthrough, Arg, Args, PipeState, Pipetype, Step, Token};
use serde_json::{Map, Value};

type PipeFn = fn(&Graph, &[Arg], Option<Gremlin>, &mut PipeState) -> Token;

/// Used in place of pipetypes missing from the registry
static FALLBACK: PipeFn = passthrough;

/// One result of a query run
#[derive(Debug, Clone)]
pub enum Output<'g> {
    /// The vertex a gremlin ended on
    Vertex(&'g Vertex),
    /// A value projected by a pipe such as `property`
    Value(Value),
}

impl<'g> Output<'g> {
    pub fn as_vertex(&self) -> Option<&'g Vertex> {
        match self {
            Self::Vertex(v) => Some(v),
            Self::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Vertex(_) => None,
        }
    }

    /// JSON form: the vertex record (`_id` plus attributes) or the value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Vertex(vertex) => {
                let mut record = Map::new();
                record.insert("_id".to_string(), vertex.id().to_value());
                record.extend(vertex.props().iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(record)
            }
            Self::Value(v) => v.clone(),
        }
    }
}

impl Graph {
    /// Start a query at the vertices selected by `args` (ids or a record)
    pub fn v<I, A>(&self, args: I) -> Query<'_>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.query()
            .step("vertex", Args(args.into_iter().map(Into::into).collect()))
    }

    /// Start a query at every vertex
    pub fn v_all(&self) -> Query<'_> {
        self.query().step("vertex", ())
    }

    /// Query with an empty program
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }
}

/// A pipeline over one graph
///
/// Steps are appended with the chain methods; [`Query::run`] evaluates them
/// lazily. Each step keeps its own state on the query, so calling `run`
/// again continues where the previous call stopped.
#[derive(Debug)]
pub struct Query<'g> {
    graph: &'g Graph,
    program: Vec<Step>,
    state: Vec<PipeState>,
    transformed: bool,
}

impl<'g> Query<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            program: Vec::new(),
            state: Vec::new(),
            transformed: false,
        }
    }

    pub fn program(&self) -> &[Step] {
        &self.program
    }

    /// Append a step for any pipetype, built-in or registered
    pub fn step(mut self, pipetype: impl Into<String>, args: impl Into<Args>) -> Self {
        self.program.push(Step::new(pipetype, args.into().0));
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Built-in steps
    // ─────────────────────────────────────────────────────────────────────────

    pub fn vertex(self, args: impl Into<Args>) -> Self {
        self.step("vertex", args)
    }

    /// Follow outgoing edges; filter by label, label list or edge record
    pub fn out(self, filter: impl Into<Args>) -> Self {
        self.step("out", filter)
    }

    /// Follow incoming edges; filter by label, label list or edge record
    pub fn in_(self, filter: impl Into<Args>) -> Self {
        self.step("in", filter)
    }

    pub fn property(self, name: &str) -> Self {
        self.step("property", name)
    }

    pub fn unique(self) -> Self {
        self.step("unique", ())
    }

    pub fn filter(self, filter: impl Into<Args>) -> Self {
        self.step("filter", filter)
    }

    pub fn filter_fn<F>(self, test: F) -> Self
    where
        F: Fn(&Vertex, &Gremlin) -> bool + Send + Sync + 'static,
    {
        self.step("filter", Arg::predicate(test))
    }

    pub fn take(self, n: usize) -> Self {
        self.step("take", n)
    }

    pub fn as_(self, label: &str) -> Self {
        self.step("as", label)
    }

    pub fn back(self, label: &str) -> Self {
        self.step("back", label)
    }

    pub fn except(self, label: &str) -> Self {
        self.step("except", label)
    }

    pub fn merge<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<Arg> = labels.into_iter().map(|l| Arg::from(l.into())).collect();
        self.step("merge", args)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Evaluation
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluate the pipeline until the last step is exhausted.
    ///
    /// The program counter starts at the last step. A `Pull` moves it one
    /// step left unless everything to the left is finished, in which case the
    /// step joins the finished prefix; `Done` always does. Any other answer
    /// moves right, and a gremlin carried past the end is a result.
    pub fn run(&mut self) -> Vec<Output<'g>> {
        if !self.transformed {
            let program = std::mem::take(&mut self.program);
            self.program = self.graph.registry().transform(program);
            self.transformed = true;
        }

        if self.program.is_empty() {
            return Vec::new();
        }

        tracing::debug!("Running query with {} steps", self.program.len());

        let registry = self.graph.registry();
        let pipetypes: Vec<&dyn Pipetype> = self
            .program
            .iter()
            .map(|step| {
                registry.pipetype(&step.pipetype).unwrap_or_else(|e| {
                    tracing::error!("{}", e);
                    &FALLBACK as &dyn Pipetype
                })
            })
            .collect();
        self.state.resize_with(self.program.len(), PipeState::default);

        let last = self.program.len() - 1;
        let mut pc = last;
        let mut done: Option<usize> = None;
        let mut carried: Option<Gremlin> = None;
        let mut results = Vec::new();

        while done != Some(last) {
            let token = pipetypes[pc].call(
                self.graph,
                &self.program[pc].args,
                carried.take(),
                &mut self.state[pc],
            );

            match token {
                Token::Pull => {
                    if pc > 0 && done.map_or(true, |d| pc - 1 > d) {
                        pc -= 1;
                        continue;
                    }
                    done = Some(pc);
                }
                Token::Done => done = Some(pc),
                Token::Gremlin(gremlin) => carried = Some(gremlin),
                Token::Nothing => {}
            }

            pc += 1;

            if pc > last {
                if let Some(gremlin) = carried.take() {
                    results.push(gremlin);
                }
                pc = last;
            }
        }

        tracing::debug!("Query produced {} results", results.len());

        results
            .into_iter()
            .map(|gremlin| {
                let vertex = gremlin.vertex();
                match gremlin.into_result() {
                    Some(value) => Output::Value(value),
                    None => Output::Vertex(self.graph.vertex(vertex)),
                }
            })
            .collect()
    }
}
