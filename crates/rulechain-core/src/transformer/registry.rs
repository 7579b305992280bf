//! Function registry
//!
//! Named steps are resolved against an explicit registry filled by the host
//! application. A name maps to a plain function, a type constructor or a
//! capability object; aliases point at another registered name.

use super::built_in;
use super::types::{ConstructorFn, Transformable};
use crate::value::Value;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered function taking the prepared argument list
pub type NativeFn = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// What a registered name resolves to
#[derive(Clone)]
pub enum Resolved {
    Function(NativeFn),
    Constructor(ConstructorFn),
    Transformable(Arc<dyn Transformable>),
}

impl Resolved {
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Function(_) => "function",
            Resolved::Constructor(_) => "type",
            Resolved::Transformable(_) => "transformable",
        }
    }
}

/// Mapping from step names to invocables
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    entries: HashMap<String, Resolved>,
    aliases: HashMap<String, String>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in catalog
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        built_in::register_all(&mut registry);
        registry
    }

    /// Register a function called with `[value, args...]`
    pub fn register_function<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(name.into(), Resolved::Function(Arc::new(function)))
    }

    /// Register a type whose constructor takes the current value
    pub fn register_type<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(name.into(), Resolved::Constructor(Arc::new(constructor)))
    }

    /// Register a capability object under a name
    pub fn register_transformable<T>(&mut self, name: impl Into<String>, transformable: T) -> &mut Self
    where
        T: Transformable + 'static,
    {
        self.insert(name.into(), Resolved::Transformable(Arc::new(transformable)))
    }

    /// Register `alias` as another name for the already registered `target`
    pub fn register_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) -> Result<&mut Self> {
        let alias = alias.into();
        let target = target.into();
        let target = self.aliases.get(&target).cloned().unwrap_or(target);

        if !self.entries.contains_key(&target) {
            return Err(Error::configuration(format!(
                "Cannot alias '{}' to unregistered name '{}'",
                alias, target
            )));
        }

        self.entries.remove(&alias);
        self.aliases.insert(alias, target);
        Ok(self)
    }

    fn insert(&mut self, name: String, resolved: Resolved) -> &mut Self {
        self.aliases.remove(&name);
        self.entries.insert(name, resolved);
        self
    }

    /// Resolve a step name, following aliases
    pub fn resolve(&self, name: &str) -> Option<&Resolved> {
        match self.aliases.get(name) {
            Some(target) => self.entries.get(target),
            None => self.entries.get(name),
        }
    }

    /// The registered name an alias points at, or `name` itself
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Add every entry and alias of `other`, replacing same-named ones
    pub fn merge(&mut self, other: FunctionRegistry) -> &mut Self {
        for (name, resolved) in other.entries {
            self.insert(name, resolved);
        }
        for (alias, target) in other.aliases {
            self.entries.remove(&alias);
            self.aliases.insert(alias, target);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Registered names and aliases, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .keys()
            .chain(self.aliases.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Sorted `(name, kind)` pairs; aliases report as `alias of <target>`
    pub fn describe(&self) -> Vec<(String, String)> {
        self.names()
            .into_iter()
            .filter_map(|name| {
                let kind = match self.aliases.get(&name) {
                    Some(target) => format!("alias of {}", target),
                    None => self.entries.get(&name)?.kind().to_string(),
                };
                Some((name, kind))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::types::Flow;

    struct Yes;

    impl Transformable for Yes {
        fn transform(&self, _value: Value) -> Result<Flow> {
            Ok(Flow::Continue(Value::from("Yes")))
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_function("first", |args| Ok(args.into_iter().next().unwrap_or(Value::Null)))
            .register_type("Box", |value| Ok(Value::List(vec![value])))
            .register_transformable("yes", Yes);

        assert_eq!(registry.resolve("first").map(Resolved::kind), Some("function"));
        assert_eq!(registry.resolve("Box").map(Resolved::kind), Some("type"));
        assert_eq!(registry.resolve("yes").map(Resolved::kind), Some("transformable"));
        assert!(registry.resolve("missing").is_none());
    }

    #[test]
    fn test_aliases() {
        let mut registry = FunctionRegistry::new();
        registry.register_function("to_int", |_| Ok(Value::Int(1)));
        registry.register_alias("intval", "to_int").unwrap();
        registry.register_alias("int", "intval").unwrap();

        assert!(registry.contains("intval"));
        assert!(registry.contains("int"));
        assert_eq!(registry.names(), vec!["int", "intval", "to_int"]);
        assert_eq!(
            registry.describe()[0],
            ("int".to_string(), "alias of to_int".to_string())
        );

        let err = registry.register_alias("nope", "missing").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_registering_over_alias_replaces_it() {
        let mut registry = FunctionRegistry::new();
        registry.register_function("a", |_| Ok(Value::Int(1)));
        registry.register_alias("b", "a").unwrap();
        registry.register_function("b", |_| Ok(Value::Int(2)));

        let Some(Resolved::Function(f)) = registry.resolve("b") else {
            panic!("expected function");
        };
        assert_eq!(f(vec![]).unwrap(), Value::Int(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_canonical_names() {
        let mut registry = FunctionRegistry::new();
        registry.register_function("titlecase", |_| Ok(Value::Null));
        registry.register_alias("ucwords", "titlecase").unwrap();

        assert_eq!(registry.canonical("ucwords"), "titlecase");
        assert_eq!(registry.canonical("titlecase"), "titlecase");
        assert_eq!(registry.canonical("missing"), "missing");
    }

    #[test]
    fn test_merge_keeps_existing_entries() {
        let mut registry = FunctionRegistry::new();
        registry.register_function("a", |_| Ok(Value::Int(1)));

        let mut other = FunctionRegistry::new();
        other.register_function("b", |_| Ok(Value::Int(2)));
        other.register_alias("c", "b").unwrap();

        registry.merge(other);
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
        assert_eq!(registry.canonical("c"), "b");
    }

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::with_builtins();
        for name in ["trim", "titlecase", "uppercase", "strip_non_digits", "Date", "Text", "ucwords"] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }
}
