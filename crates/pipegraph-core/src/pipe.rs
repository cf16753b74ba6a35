//! Pipe building blocks: step arguments, control tokens, per-step state and
//! the [`Pipetype`] behavior trait

use crate::graph::{Graph, Vertex};
use crate::gremlin::Gremlin;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Boolean test over a gremlin's current vertex
pub type Predicate = Arc<dyn Fn(&Vertex, &Gremlin) -> bool + Send + Sync>;

/// One argument of a pipeline step
#[derive(Clone)]
pub enum Arg {
    /// Ids, labels, records, counts
    Value(Value),
    /// Caller-supplied test, used by `filter`
    Predicate(Predicate),
}

impl Arg {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Vertex, &Gremlin) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Predicate(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::Predicate(_) => write!(f, "<predicate>"),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Self::Value(Value::from(s))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Self::Value(Value::from(s))
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Self::Value(Value::from(n))
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Self::Value(Value::from(n))
    }
}

impl From<usize> for Arg {
    fn from(n: usize) -> Self {
        Self::Value(Value::from(n))
    }
}

impl From<Predicate> for Arg {
    fn from(p: Predicate) -> Self {
        Self::Predicate(p)
    }
}

/// Argument list for a chain call: `()`, a single value, or a list
#[derive(Debug, Clone, Default)]
pub struct Args(pub Vec<Arg>);

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self(Vec::new())
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

impl From<Arg> for Args {
    fn from(arg: Arg) -> Self {
        Self(vec![arg])
    }
}

macro_rules! single_arg {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Args {
                fn from(arg: $ty) -> Self {
                    Self(vec![Arg::from(arg)])
                }
            }
        )*
    };
}

single_arg!(Value, &str, String, i32, i64, usize, Predicate);

/// A program step: pipetype name plus its arguments
#[derive(Debug, Clone)]
pub struct Step {
    pub pipetype: String,
    pub args: Vec<Arg>,
}

impl Step {
    pub fn new(pipetype: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            pipetype: pipetype.into(),
            args,
        }
    }
}

/// What a pipe hands back to the VM
#[derive(Debug, Clone)]
pub enum Token {
    /// A gremlin offered downstream
    Gremlin(Gremlin),
    /// Nothing right now; ask the step before me
    Pull,
    /// Permanently exhausted
    Done,
    /// Nothing this time, but not finished
    Nothing,
}

/// Private, resumable state of one step
///
/// Allocated on first access and kept on the query object across `run()`
/// calls, so a pipe picks up where it stopped.
#[derive(Default)]
pub struct PipeState(Option<Box<dyn Any>>);

impl PipeState {
    /// Borrow the state as `T`, initializing it with `T::default()` on first
    /// use
    pub fn get_or_default<T: Default + 'static>(&mut self) -> &mut T {
        let fresh = !matches!(&self.0, Some(slot) if slot.is::<T>());
        if fresh {
            self.0 = Some(Box::new(T::default()));
        }
        // Safe: the slot was just checked or filled with a `T`
        self.0
            .as_mut()
            .and_then(|slot| slot.downcast_mut::<T>())
            .expect("pipe state holds T after initialization")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl std::fmt::Debug for PipeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeState")
            .field("initialized", &self.0.is_some())
            .finish()
    }
}

/// Behavior of a named pipe
///
/// Any function or closure with the matching signature is a pipetype.
pub trait Pipetype: Send + Sync {
    fn call(&self, graph: &Graph, args: &[Arg], input: Option<Gremlin>, state: &mut PipeState)
        -> Token;
}

impl<F> Pipetype for F
where
    F: Fn(&Graph, &[Arg], Option<Gremlin>, &mut PipeState) -> Token + Send + Sync,
{
    fn call(
        &self,
        graph: &Graph,
        args: &[Arg],
        input: Option<Gremlin>,
        state: &mut PipeState,
    ) -> Token {
        self(graph, args, input, state)
    }
}

/// Stand-in for unknown and alias pipetypes: forwards gremlins, otherwise
/// pulls
pub fn passthrough(
    _graph: &Graph,
    _args: &[Arg],
    input: Option<Gremlin>,
    _state: &mut PipeState,
) -> Token {
    input.map_or(Token::Pull, Token::Gremlin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        seen: usize,
    }

    #[test]
    fn test_pipe_state_persists() {
        let mut state = PipeState::default();
        assert!(state.is_empty());

        state.get_or_default::<Counter>().seen += 1;
        state.get_or_default::<Counter>().seen += 1;
        assert_eq!(state.get_or_default::<Counter>().seen, 2);
    }

    #[test]
    fn test_pipe_state_type_change_resets() {
        let mut state = PipeState::default();
        *state.get_or_default::<u32>() = 7;
        assert!(state.get_or_default::<String>().is_empty());
    }

    #[test]
    fn test_args_conversions() {
        assert!(Args::from(()).0.is_empty());
        assert_eq!(Args::from("knows").0[0].as_str(), Some("knows"));
        assert_eq!(Args::from(vec![Arg::from(1), Arg::from("x")]).0.len(), 2);
        assert!(Arg::predicate(|_, _| true).as_value().is_none());
    }
}
