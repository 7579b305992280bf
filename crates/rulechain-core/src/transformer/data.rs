//! Batch transformation of data mappings
//!
//! Applies a [`RuleMap`] to a nested data mapping. Rule keys are dotted
//! paths, optionally with `*` wildcards; each resolved path that exists in
//! the data gets its value run through the chain and written back in place.

use super::context::TransformContext;
use super::parser::RuleParser;
use super::path;
use super::pipeline::Transformer;
use super::types::{ChainSpec, RuleMap, Step};
use crate::value::{Map, Value};
use crate::Result;

/// Transforms addressed leaves of a data mapping
#[derive(Debug, Clone)]
pub struct DataTransformer {
    context: TransformContext,
    data: Map,
    functions: RuleMap,
}

impl DataTransformer {
    pub fn new(context: TransformContext, data: Map, functions: RuleMap) -> Self {
        Self {
            context,
            data,
            functions,
        }
    }

    /// Shorthand for [`DataTransformer::new`]
    pub fn create(context: &TransformContext, data: Map, functions: RuleMap) -> Self {
        Self::new(context.clone(), data, functions)
    }

    /// Set the data to transform
    pub fn set_data(&mut self, data: Map) -> &mut Self {
        self.data = data;
        self
    }

    /// Set the rules to apply on the data
    pub fn set_functions(&mut self, functions: RuleMap) -> &mut Self {
        self.functions = functions;
        self
    }

    pub fn data(&self) -> &Map {
        &self.data
    }

    pub fn functions(&self) -> &RuleMap {
        &self.functions
    }

    /// Transform the data and return it
    ///
    /// Wildcards are resolved once against the data as it is before any
    /// rule runs. Errors from any key abort the whole call.
    pub fn transform(&mut self) -> Result<Map> {
        let exploded = RuleParser::new(&self.data).explode(&self.functions)?;
        log::debug!(
            "Applying {} rule(s) resolved to {} key(s)",
            self.functions.len(),
            exploded.len()
        );

        let mut transformer = Transformer::new(
            self.context.clone(),
            Value::Null,
            ChainSpec::default(),
            None,
        );
        for (key, steps) in exploded.rules {
            self.apply_transformers(&mut transformer, &key, steps)?;
        }

        Ok(self.data.clone())
    }

    fn apply_transformers(
        &mut self,
        transformer: &mut Transformer,
        key: &str,
        steps: Vec<Step>,
    ) -> Result<()> {
        let Some(value) = path::get(&self.data, key) else {
            log::debug!("Skipping '{}': not present in data", key);
            return Ok(());
        };

        transformer
            .set_value(value.clone())
            .set_steps(steps)
            .set_name(Some(key));

        let transformed = transformer.transform()?;
        path::set(&mut self.data, key, transformed);
        Ok(())
    }
}
