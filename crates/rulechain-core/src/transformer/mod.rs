//! Rule-driven value transformation
//!
//! This module turns compact rule strings such as `?|trim|->format:m/d/Y`
//! into ordered steps and applies them to single values or to the leaves of
//! a nested data mapping.
//!
//! # Module Organization
//!
//! - [`types`] - Steps, argument tokens, rule specifications and [`Flow`]
//! - [`parser`] - Rule parsing and wildcard key expansion
//! - [`path`] - Dot-notation access into data mappings
//! - [`registry`] - Name to invocable resolution
//! - [`context`] - Registry plus guard for one session
//! - [`builder`] - Fluent builder for contexts
//! - [`pipeline`] - The single-value [`Transformer`]
//! - [`data`] - The batch [`DataTransformer`]
//! - [`built_in`] - Optional catalog of common functions and object types
//!
//! # Examples
//!
//! ```
//! use rulechain_core::{RuleMap, TransformContext, Value};
//! use serde_json::json;
//!
//! let context = TransformContext::with_builtins();
//!
//! let name = context.transform("   uncle bob  ", "trim|titlecase", None).unwrap();
//! assert_eq!(name, Value::from("Uncle Bob"));
//!
//! let data = match Value::from(json!({"first_name": "  jim ", "last_name": " thompson"})) {
//!     Value::Map(map) => map,
//!     _ => unreachable!(),
//! };
//! let rules = RuleMap::new().rule("*name", "trim|capitalize");
//! let data = context.transform_data(data, rules).unwrap();
//! assert_eq!(data["last_name"], Value::from("Thompson"));
//! ```

pub mod builder;
pub mod built_in;
pub mod context;
pub mod data;
pub mod parser;
pub mod path;
pub mod pipeline;
pub mod registry;
pub mod types;


pub use builder::TransformContextBuilder;
pub use context::{Guard, GuardPolicy, TransformContext};
pub use data::DataTransformer;
pub use parser::{ExplodedRules, RuleParser};
pub use pipeline::Transformer;
pub use registry::{FunctionRegistry, NativeFn, Resolved};
pub use types::{
    Arg, CastType, ChainSpec, ConstructorFn, Flow, RuleMap, Step, StepFn, StepSpec, Transformable,
};
