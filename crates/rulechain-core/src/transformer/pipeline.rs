//! Single-value transformation pipeline
//!
//! A [`Transformer`] walks a chain of steps over one value. Each step either
//! replaces the current value, stops the chain (`?` on a blank value, or a
//! closure returning [`Flow::Abort`]), or fails the whole transformation.

use super::context::TransformContext;
use super::parser::RuleParser;
use super::registry::Resolved;
use super::types::{Arg, ChainSpec, Flow, Step};
use crate::value::Value;
use crate::{Error, Result};
use tracing::{debug, trace, warn};

/// Applies a chain of steps to a single value
#[derive(Debug, Clone)]
pub struct Transformer {
    context: TransformContext,
    value: Value,
    steps: Vec<Step>,
    name: Option<String>,
}

impl Transformer {
    /// Create a transformer for `value`; `name` is handed to the guard
    pub fn new(
        context: TransformContext,
        value: impl Into<Value>,
        chain: impl Into<ChainSpec>,
        name: Option<&str>,
    ) -> Self {
        Self {
            context,
            value: value.into(),
            steps: RuleParser::expand(&chain.into()),
            name: name.map(str::to_string),
        }
    }

    /// Set the value to transform
    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = value.into();
        self
    }

    /// Set the chain to apply
    pub fn set_functions(&mut self, chain: impl Into<ChainSpec>) -> &mut Self {
        self.steps = RuleParser::expand(&chain.into());
        self
    }

    /// Set already parsed steps
    pub fn set_steps(&mut self, steps: Vec<Step>) -> &mut Self {
        self.steps = steps;
        self
    }

    /// Set the name of the value being transformed
    pub fn set_name(&mut self, name: Option<&str>) -> &mut Self {
        self.name = name.map(str::to_string);
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    /// Apply the chain to the value and return the result
    ///
    /// The result also becomes the transformer's current value.
    pub fn transform(&mut self) -> Result<Value> {
        let span = tracing::debug_span!(
            "transform",
            field = self.name.as_deref().unwrap_or(""),
            steps = self.steps.len()
        );
        let _enter = span.enter();

        for step in &self.steps {
            if let Step::BlankGuard = step {
                if self.value.is_blank() {
                    debug!("Blank value, skipping remaining steps");
                    break;
                }
                continue;
            }

            trace!(step = %step.name(), "Applying step");
            match self.call(step)? {
                Flow::Continue(value) => self.value = value,
                Flow::Abort => {
                    debug!(step = %step.name(), "Transformation aborted");
                    break;
                }
            }
        }

        Ok(self.value.clone())
    }

    fn call(&self, step: &Step) -> Result<Flow> {
        let value = &self.value;
        match step {
            Step::BlankGuard => Ok(Flow::Continue(value.clone())),
            Step::Delegate { method, args } => match value {
                Value::Object(receiver) => {
                    let args = prepare_arguments(value, args, false);
                    receiver.call_method(method, args).map(Flow::Continue)
                }
                // not an object: the marker stays part of the name
                _ => self.call_named(&step.name(), args),
            },
            Step::Named { name, args } => self.call_named(name, args),
            Step::Construct { constructor, .. } => constructor(value.clone()).map(Flow::Continue),
            Step::Transformable(transformable) => transformable.transform(value.clone()),
            Step::Closure(closure) => closure(value.clone()),
        }
    }

    fn call_named(&self, name: &str, args: &[Arg]) -> Result<Flow> {
        let value = &self.value;
        let resolved = self.context.registry().resolve(name).ok_or_else(|| Error::NotCallable {
            name: name.to_string(),
        })?;

        match resolved {
            Resolved::Constructor(constructor) => constructor(value.clone()).map(Flow::Continue),
            Resolved::Transformable(transformable) => transformable.transform(value.clone()),
            Resolved::Function(function) => {
                if !self.context.allows(name, value, self.name.as_deref()) {
                    warn!(function = name, field = ?self.name, "Function rejected by guard");
                    return Err(Error::ExecutionNotAllowed {
                        name: name.to_string(),
                        field: self.name.clone(),
                    });
                }
                function(prepare_arguments(value, args, true)).map(Flow::Continue)
            }
        }
    }
}

/// Build the argument list for a function or delegated method call
///
/// With `prepend_value` the current value leads the list. The first
/// placeholder token is replaced by the current value, which then no longer
/// leads; later placeholders stay literal text. Cast tokens are coerced.
pub fn prepare_arguments(value: &Value, args: &[Arg], prepend_value: bool) -> Vec<Value> {
    let mut parameters = Vec::with_capacity(args.len() + 1);
    if prepend_value {
        parameters.push(value.clone());
    }

    let mut substituted = false;
    for arg in args {
        parameters.push(match arg {
            Arg::Literal(literal) => literal.clone(),
            Arg::Placeholder(_) if !substituted => {
                substituted = true;
                value.clone()
            }
            Arg::Placeholder(raw) => Value::Str(raw.clone()),
            Arg::Cast { literal, to } => to.apply(literal),
        });
    }

    if substituted && prepend_value {
        parameters.remove(0);
    }

    parameters
}
