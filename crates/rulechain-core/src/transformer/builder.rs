//! Builder for transformation contexts
//!
//! This module provides a fluent builder API for assembling a function
//! registry and guard into a [`TransformContext`], validating the result.

use super::built_in;
use super::context::{Guard, GuardPolicy, TransformContext};
use super::registry::FunctionRegistry;
use super::types::Transformable;
use crate::value::Value;
use crate::Result;
use std::sync::Arc;

/// Builder for creating transformation contexts
#[derive(Default)]
pub struct TransformContextBuilder {
    registry: FunctionRegistry,
    aliases: Vec<(String, String)>,
    guard: Option<Guard>,
    policy: GuardPolicy,
}

impl TransformContextBuilder {
    /// Create a builder with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the built-in catalog
    ///
    /// Built-ins replace earlier registrations of the same name.
    pub fn with_builtins(mut self) -> Self {
        built_in::register_all(&mut self.registry);
        self
    }

    /// Add every entry of an existing registry
    ///
    /// Its entries replace earlier registrations of the same name.
    pub fn registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry.merge(registry);
        self
    }

    /// Register a function
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry.register_function(name, function);
        self
    }

    /// Register a type constructor
    pub fn type_constructor<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry.register_type(name, constructor);
        self
    }

    /// Register a named capability object
    pub fn transformable<T: Transformable + 'static>(mut self, name: impl Into<String>, transformable: T) -> Self {
        self.registry.register_transformable(name, transformable);
        self
    }

    /// Register an alias; the target is checked when building
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    /// Set the guard predicate
    pub fn guard<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &Value, Option<&str>) -> bool + Send + Sync + 'static,
    {
        let guard: Guard = Arc::new(predicate);
        self.guard = Some(guard);
        self
    }

    /// Only allow the listed function names
    pub fn allow<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.allow.extend(names.into_iter().map(Into::into));
        self
    }

    /// Reject the listed function names
    pub fn deny<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.deny.extend(names.into_iter().map(Into::into));
        self
    }

    /// Merge a declarative allow/deny policy
    pub fn policy(mut self, policy: GuardPolicy) -> Self {
        self.policy.allow.extend(policy.allow);
        self.policy.deny.extend(policy.deny);
        self
    }

    /// Build the context
    ///
    /// A guard predicate and a policy combine: both must allow a name.
    pub fn build(self) -> Result<TransformContext> {
        let mut registry = self.registry;
        for (alias, target) in self.aliases {
            registry.register_alias(alias, target)?;
        }

        let mut context = TransformContext::new(registry);
        context.set_guard(self.guard);
        context.set_policy(self.policy);
        Ok(context)
    }
}
