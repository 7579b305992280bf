//! Transformation context
//!
//! A [`TransformContext`] carries everything a transformation session needs
//! besides the data itself: the function registry, the allow/deny policy
//! and the optional guard deciding which named functions may run. Each
//! session owns its guard, so installing one never affects other sessions.

use super::builder::TransformContextBuilder;
use super::data::DataTransformer;
use super::pipeline::Transformer;
use super::registry::FunctionRegistry;
use super::types::{ChainSpec, RuleMap};
use crate::value::{Map, Value};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Guard predicate over `(step name, current value, field name)`
pub type Guard = Arc<dyn Fn(&str, &Value, Option<&str>) -> bool + Send + Sync>;

/// Registry plus guard for one transformation session
///
/// Two gates decide whether a named function may run: the allow/deny
/// [`GuardPolicy`], checked against both the written name and the name an
/// alias resolves to, and the optional guard predicate, which sees the name
/// as written in the rule.
#[derive(Clone)]
pub struct TransformContext {
    registry: Arc<FunctionRegistry>,
    guard: Option<Guard>,
    policy: GuardPolicy,
}

impl TransformContext {
    /// Create an unguarded context over the given registry
    pub fn new(registry: FunctionRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Create an unguarded context over the built-in catalog
    pub fn with_builtins() -> Self {
        Self::new(FunctionRegistry::with_builtins())
    }

    pub fn builder() -> TransformContextBuilder {
        TransformContextBuilder::new()
    }

    /// Share a registry between several contexts
    pub fn from_shared(registry: Arc<FunctionRegistry>) -> Self {
        Self {
            registry,
            guard: None,
            policy: GuardPolicy::default(),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Install the guard deciding which named functions may run
    pub fn guard<F>(&mut self, predicate: F)
    where
        F: Fn(&str, &Value, Option<&str>) -> bool + Send + Sync + 'static,
    {
        let guard: Guard = Arc::new(predicate);
        self.guard = Some(guard);
    }

    /// Install an already shared guard, or clear it with `None`
    pub fn set_guard(&mut self, guard: Option<Guard>) {
        self.guard = guard;
    }

    /// Install the allow/deny policy
    pub fn set_policy(&mut self, policy: GuardPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Remove the guard and the policy; every named function is allowed again
    pub fn unguard(&mut self) {
        self.guard = None;
        self.policy = GuardPolicy::default();
    }

    /// Both gates as one predicate; permit-all when neither is set
    pub fn guard_fn(&self) -> Guard {
        let context = self.clone();
        let guard: Guard = Arc::new(move |name: &str, value: &Value, field: Option<&str>| {
            context.allows(name, value, field)
        });
        guard
    }

    pub fn is_guarded(&self) -> bool {
        self.guard.is_some() || !self.policy.is_empty()
    }

    /// Ask the policy and the guard whether `name` may run on `value` for `field`
    pub fn allows(&self, name: &str, value: &Value, field: Option<&str>) -> bool {
        let canonical = self.registry.canonical(name);
        self.policy.permits_resolved(name, canonical)
            && self
                .guard
                .as_ref()
                .map_or(true, |guard| guard(name, value, field))
    }

    /// New single-value transformer bound to this context
    pub fn transformer(
        &self,
        value: impl Into<Value>,
        chain: impl Into<ChainSpec>,
        name: Option<&str>,
    ) -> Transformer {
        Transformer::new(self.clone(), value, chain, name)
    }

    /// New batch transformer bound to this context
    pub fn data_transformer(&self, data: Map, rules: RuleMap) -> DataTransformer {
        DataTransformer::new(self.clone(), data, rules)
    }

    /// Transform one value through a chain
    pub fn transform(
        &self,
        value: impl Into<Value>,
        chain: impl Into<ChainSpec>,
        name: Option<&str>,
    ) -> Result<Value> {
        self.transformer(value, chain, name).transform()
    }

    /// Transform the addressed leaves of a data mapping
    pub fn transform_data(&self, data: Map, rules: RuleMap) -> Result<Map> {
        self.data_transformer(data, rules).transform()
    }
}

impl Default for TransformContext {
    fn default() -> Self {
        Self::new(FunctionRegistry::new())
    }
}

impl fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformContext")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// Declarative allow/deny lists for named functions
///
/// An empty allow list allows everything not denied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardPolicy {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

impl GuardPolicy {
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }

    /// Whether the policy lets `name` run
    pub fn permits(&self, name: &str) -> bool {
        self.permits_resolved(name, name)
    }

    /// Whether the policy lets a step run that is written as `name` and
    /// resolves to `canonical`
    ///
    /// Listing either name in `allow` allows it; listing either in `deny`
    /// denies it.
    pub fn permits_resolved(&self, name: &str, canonical: &str) -> bool {
        let listed = |names: &[String]| names.iter().any(|n| n == name || n == canonical);
        (self.allow.is_empty() || listed(self.allow.as_slice())) && !listed(self.deny.as_slice())
    }
}
