//! Core types for the transformation chain system
//!
//! This module defines the step shapes a chain is made of, the argument
//! tokens a step carries, the rule specifications callers hand in, and the
//! [`Flow`] signal closures use to stop a chain early.

use crate::value::{Map, Value};
use crate::Result;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

/// Step name that short-circuits the chain on blank values
pub const BLANK_MARKER: &str = "?";

/// Argument token replaced by the current value
pub const VALUE_PLACEHOLDER: &str = ":value:";

/// Prefix marking a step as a method call on the current value
pub const DELEGATE_PREFIX: &str = "->";

/// Outcome of a closure or capability step
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Keep going with the new value
    Continue(Value),
    /// Stop the chain and keep the value from the previous step
    Abort,
}

impl From<Value> for Flow {
    fn from(value: Value) -> Self {
        Flow::Continue(value)
    }
}

/// Capability object usable directly as a step
pub trait Transformable: Send + Sync {
    fn transform(&self, value: Value) -> Result<Flow>;
}

/// Inline closure step
pub type StepFn = Arc<dyn Fn(Value) -> Result<Flow> + Send + Sync>;

/// Single-argument constructor building a value of a registered type
pub type ConstructorFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Target type of a `literal@type` argument cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Int,
    Str,
    Float,
    Bool,
    Array,
    Object,
}

impl CastType {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "int" => Some(CastType::Int),
            "str" => Some(CastType::Str),
            "float" => Some(CastType::Float),
            "bool" => Some(CastType::Bool),
            "array" => Some(CastType::Array),
            "object" => Some(CastType::Object),
            _ => None,
        }
    }

    /// Coerce a literal to this type
    pub fn apply(&self, literal: &str) -> Value {
        let raw = Value::Str(literal.to_string());
        match self {
            CastType::Int => Value::Int(crate::value::parse_leading_int(literal)),
            CastType::Float => Value::Float(crate::value::parse_leading_float(literal)),
            CastType::Str => raw,
            CastType::Bool => Value::Bool(crate::value::is_truthy(literal)),
            CastType::Array => Value::List(vec![raw]),
            CastType::Object => {
                let mut map = Map::new();
                map.insert("scalar".to_string(), raw);
                Value::Map(map)
            }
        }
    }
}

/// A single argument token of a step
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Passed through as-is
    Literal(Value),
    /// `:value:` sentinel; keeps its raw text for when it is not the first one
    Placeholder(String),
    /// `literal@type`, coerced before the call
    Cast { literal: String, to: CastType },
}

/// One parsed step of a chain
#[derive(Clone)]
pub enum Step {
    /// `?` - stop when the current value is blank
    BlankGuard,
    /// Function, constructor or capability object resolved by name
    Named { name: String, args: Vec<Arg> },
    /// `->method` call on the current value
    Delegate { method: String, args: Vec<Arg> },
    /// Directly embedded constructor
    Construct {
        type_name: String,
        constructor: ConstructorFn,
    },
    /// Directly embedded capability object
    Transformable(Arc<dyn Transformable>),
    /// Inline closure
    Closure(StepFn),
}

impl Step {
    /// Display name used in logs and errors
    pub fn name(&self) -> String {
        match self {
            Step::BlankGuard => BLANK_MARKER.to_string(),
            Step::Named { name, .. } => name.clone(),
            Step::Delegate { method, .. } => format!("{DELEGATE_PREFIX}{method}"),
            Step::Construct { type_name, .. } => type_name.clone(),
            Step::Transformable(_) => "<transformable>".to_string(),
            Step::Closure(_) => "<closure>".to_string(),
        }
    }

    /// Argument tokens, empty for shapes with a fixed calling convention
    pub fn args(&self) -> &[Arg] {
        match self {
            Step::Named { args, .. } | Step::Delegate { args, .. } => args,
            _ => &[],
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::BlankGuard => write!(f, "BlankGuard"),
            Step::Named { name, args } => f
                .debug_struct("Named")
                .field("name", name)
                .field("args", args)
                .finish(),
            Step::Delegate { method, args } => f
                .debug_struct("Delegate")
                .field("method", method)
                .field("args", args)
                .finish(),
            Step::Construct { type_name, .. } => f
                .debug_struct("Construct")
                .field("type_name", type_name)
                .finish(),
            Step::Transformable(_) => write!(f, "Transformable"),
            Step::Closure(_) => write!(f, "Closure"),
        }
    }
}

/// Unparsed specification of a single step
#[derive(Clone)]
pub enum StepSpec {
    /// `name` or `name:arg1,arg2`
    Text(String),
    /// `[name, arg1, arg2, ...]`
    List(Vec<Value>),
    /// Constructor reference
    Constructor {
        type_name: String,
        constructor: ConstructorFn,
    },
    Transformable(Arc<dyn Transformable>),
    Closure(StepFn),
}

impl StepSpec {
    /// Build a list step from a name and arguments
    pub fn list<I, V>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut items = vec![Value::from(name)];
        items.extend(args.into_iter().map(Into::into));
        StepSpec::List(items)
    }

    /// Wrap a closure step
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Flow> + Send + Sync + 'static,
    {
        StepSpec::Closure(Arc::new(f))
    }

    pub fn transformable<T: Transformable + 'static>(transformable: T) -> Self {
        StepSpec::Transformable(Arc::new(transformable))
    }

    pub fn constructor<F>(type_name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        StepSpec::Constructor {
            type_name: type_name.into(),
            constructor: Arc::new(constructor),
        }
    }
}

impl fmt::Debug for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSpec::Text(text) => f.debug_tuple("Text").field(text).finish(),
            StepSpec::List(items) => f.debug_tuple("List").field(items).finish(),
            StepSpec::Constructor { type_name, .. } => {
                f.debug_tuple("Constructor").field(type_name).finish()
            }
            StepSpec::Transformable(_) => write!(f, "Transformable"),
            StepSpec::Closure(_) => write!(f, "Closure"),
        }
    }
}

impl From<&str> for StepSpec {
    fn from(text: &str) -> Self {
        StepSpec::Text(text.to_string())
    }
}

impl From<String> for StepSpec {
    fn from(text: String) -> Self {
        StepSpec::Text(text)
    }
}

/// Unparsed specification of a whole chain
#[derive(Debug, Clone)]
pub enum ChainSpec {
    /// `step1|step2:arg|...`
    Text(String),
    Steps(Vec<StepSpec>),
}

impl Default for ChainSpec {
    fn default() -> Self {
        ChainSpec::Steps(Vec::new())
    }
}

impl From<&str> for ChainSpec {
    fn from(text: &str) -> Self {
        ChainSpec::Text(text.to_string())
    }
}

impl From<String> for ChainSpec {
    fn from(text: String) -> Self {
        ChainSpec::Text(text)
    }
}

impl From<Vec<StepSpec>> for ChainSpec {
    fn from(steps: Vec<StepSpec>) -> Self {
        ChainSpec::Steps(steps)
    }
}

impl From<Vec<&str>> for ChainSpec {
    fn from(steps: Vec<&str>) -> Self {
        ChainSpec::Steps(steps.into_iter().map(StepSpec::from).collect())
    }
}

impl From<StepSpec> for ChainSpec {
    fn from(step: StepSpec) -> Self {
        ChainSpec::Steps(vec![step])
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStep {
    Text(String),
    List(Vec<Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChain {
    Text(String),
    Steps(Vec<RawStep>),
}

impl<'de> Deserialize<'de> for ChainSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawChain::deserialize(deserializer)? {
            RawChain::Text(text) => ChainSpec::Text(text),
            RawChain::Steps(steps) => ChainSpec::Steps(
                steps
                    .into_iter()
                    .map(|step| match step {
                        RawStep::Text(text) => StepSpec::Text(text),
                        RawStep::List(items) => StepSpec::List(items),
                    })
                    .collect(),
            ),
        })
    }
}

/// Ordered mapping of dotted key patterns to chains
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    rules: Vec<(String, ChainSpec)>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, builder style
    pub fn rule(mut self, key: impl Into<String>, chain: impl Into<ChainSpec>) -> Self {
        self.insert(key, chain);
        self
    }

    /// Add a rule, replacing any existing chain for the same key in place
    pub fn insert(&mut self, key: impl Into<String>, chain: impl Into<ChainSpec>) {
        let key = key.into();
        let chain = chain.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = chain,
            None => self.rules.push((key, chain)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ChainSpec> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, chain)| chain)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChainSpec)> {
        self.rules.iter().map(|(key, chain)| (key.as_str(), chain))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: Into<String>, C: Into<ChainSpec>> FromIterator<(K, C)> for RuleMap {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut rules = RuleMap::new();
        for (key, chain) in iter {
            rules.insert(key, chain);
        }
        rules
    }
}

impl<'de> Deserialize<'de> for RuleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RuleMapVisitor;

        impl<'de> Visitor<'de> for RuleMapVisitor {
            type Value = RuleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a mapping of key patterns to rule chains")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<RuleMap, A::Error> {
                let mut rules = RuleMap::new();
                while let Some((key, chain)) = access.next_entry::<String, ChainSpec>()? {
                    rules.insert(key, chain);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RuleMapVisitor)
    }
}
