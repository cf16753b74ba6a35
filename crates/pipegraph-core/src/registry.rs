//! Pipetype registry and program transformers

use crate::error::{Error, Result};
use crate::pipe::{passthrough, Arg, Pipetype, Step};
use crate::pipes;
use std::collections::HashMap;
use std::sync::Arc;

/// Priority given to alias rewrites
pub const ALIAS_PRIORITY: i32 = 100;

/// Rewrite pass over a whole program
pub type TransformFn = Arc<dyn Fn(Vec<Step>) -> Vec<Step> + Send + Sync>;

#[derive(Clone)]
struct Transformer {
    priority: i32,
    fun: TransformFn,
}

/// Named pipe behaviors plus the transformer chain applied before a run
///
/// Populate it before building queries; graphs hold it behind an `Arc`.
#[derive(Clone)]
pub struct Registry {
    pipetypes: HashMap<String, Arc<dyn Pipetype>>,
    transformers: Vec<Transformer>,
}

impl Default for Registry {
    /// Registry with the built-in pipetypes
    fn default() -> Self {
        let mut registry = Self::new();
        pipes::register_builtins(&mut registry);
        registry
    }
}

impl Registry {
    /// Empty registry, without built-ins
    pub fn new() -> Self {
        Self {
            pipetypes: HashMap::new(),
            transformers: Vec::new(),
        }
    }

    /// Register (or replace) a pipetype
    pub fn add_pipetype(
        &mut self,
        name: impl Into<String>,
        pipetype: impl Pipetype + 'static,
    ) -> &mut Self {
        let name = name.into();
        tracing::debug!("Registering pipetype: {}", name);
        self.pipetypes.insert(name, Arc::new(pipetype));
        self
    }

    pub fn pipetype(&self, name: &str) -> Result<&dyn Pipetype> {
        self.pipetypes
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| Error::UnknownPipetype(name.to_string()))
    }

    pub fn has_pipetype(&self, name: &str) -> bool {
        self.pipetypes.contains_key(name)
    }

    /// Registered pipetype names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipetypes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register a rewrite pass. Higher priority runs first; equal priorities
    /// run in registration order.
    pub fn add_transformer<F>(&mut self, fun: F, priority: i32) -> &mut Self
    where
        F: Fn(Vec<Step>) -> Vec<Step> + Send + Sync + 'static,
    {
        let at = self
            .transformers
            .iter()
            .position(|t| priority > t.priority)
            .unwrap_or(self.transformers.len());
        self.transformers.insert(
            at,
            Transformer {
                priority,
                fun: Arc::new(fun),
            },
        );
        self
    }

    /// Run every transformer over `program`, each consuming the previous
    /// output
    pub fn transform(&self, program: Vec<Step>) -> Vec<Step> {
        self.transformers
            .iter()
            .fold(program, |acc, transformer| (transformer.fun)(acc))
    }

    /// Make `new_name` a shorthand for `old_name`.
    ///
    /// Positions of `defaults` not supplied at the call site are filled in.
    pub fn add_alias(
        &mut self,
        new_name: impl Into<String>,
        old_name: impl Into<String>,
        defaults: Vec<Arg>,
    ) -> &mut Self {
        let new_name = new_name.into();
        let old_name = old_name.into();

        self.add_pipetype(new_name.clone(), passthrough);
        self.add_transformer(
            move |program| {
                program
                    .into_iter()
                    .map(|step| {
                        if step.pipetype != new_name {
                            return step;
                        }
                        let mut args = step.args;
                        let supplied = args.len();
                        args.extend(defaults.iter().skip(supplied).cloned());
                        Step::new(old_name.clone(), args)
                    })
                    .collect()
            },
            ALIAS_PRIORITY,
        )
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("pipetypes", &self.names())
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(program: &[Step]) -> Vec<&str> {
        program.iter().map(|s| s.pipetype.as_str()).collect()
    }

    fn tag(label: &'static str) -> impl Fn(Vec<Step>) -> Vec<Step> + Send + Sync {
        move |mut program| {
            program.push(Step::new(label, vec![]));
            program
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::default();
        for name in [
            "vertex", "in", "out", "property", "unique", "filter", "take", "as", "back", "except",
            "merge",
        ] {
            assert!(registry.has_pipetype(name), "missing {}", name);
        }
        assert!(Registry::new().names().is_empty());
    }

    #[test]
    fn test_unknown_pipetype() {
        let registry = Registry::default();
        assert!(matches!(
            registry.pipetype("teleport"),
            Err(Error::UnknownPipetype(name)) if name == "teleport"
        ));
    }

    #[test]
    fn test_transformers_run_by_priority() {
        let mut registry = Registry::new();
        registry
            .add_transformer(tag("low"), 1)
            .add_transformer(tag("high"), 10)
            .add_transformer(tag("mid-a"), 5)
            .add_transformer(tag("mid-b"), 5);

        let program = registry.transform(vec![]);
        assert_eq!(names(&program), vec!["high", "mid-a", "mid-b", "low"]);
    }

    #[test]
    fn test_alias_fills_missing_defaults() {
        let mut registry = Registry::default();
        registry.add_alias("parents", "out", vec![Arg::from("parent")]);
        assert!(registry.has_pipetype("parents"));

        let program = registry.transform(vec![
            Step::new("vertex", vec![Arg::from(1)]),
            Step::new("parents", vec![]),
            Step::new("parents", vec![Arg::from("guardian")]),
        ]);

        assert_eq!(names(&program), vec!["vertex", "out", "out"]);
        assert_eq!(program[1].args[0].as_str(), Some("parent"));
        assert_eq!(program[2].args[0].as_str(), Some("guardian"));
        assert_eq!(program[2].args.len(), 1);
    }
}
