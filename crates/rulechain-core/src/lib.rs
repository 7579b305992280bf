//! rulechain core - rule-driven value transformation
//!
//! Given a value (or a nested mapping of values) and a chain of steps written
//! as a compact rule string or a structured list, the engine applies each
//! step in order and returns the final value.
//!
//! # Main Components
//!
//! - **Error Handling**: [`Error`] using `thiserror`, with `anyhow` causes
//! - **Values**: the dynamically-typed [`Value`] and the [`Receiver`]
//!   capability for delegated method calls
//! - **Transformation**: rule parsing, the single-value [`Transformer`],
//!   the batch [`DataTransformer`] and the guarded [`TransformContext`]
//!
//! # Rule grammar
//!
//! `step1:arg1,arg2|step2|->method:arg`
//!
//! - `|` separates steps; the first `:` splits a step name from its
//!   comma-separated arguments
//! - `->name` calls a method on the current value when it is an object
//! - `literal@int` (also `str`, `float`, `bool`, `array`, `object`) casts
//! - `?` stops the chain when the current value is blank
//! - `:value:` places the current value at that argument position
//!
//! # Example
//!
//! ```
//! use rulechain_core::{TransformContext, Value};
//!
//! let context = TransformContext::with_builtins();
//! let result = context
//!     .transform("2020-05-24", "trim|Date|->addDays:1|->format:m/d/Y", None)
//!     .unwrap();
//! assert_eq!(result, Value::from("05/25/2020"));
//! ```

pub mod error;
pub mod transformer;
pub mod value;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use transformer::{
    ChainSpec, DataTransformer, Flow, FunctionRegistry, GuardPolicy, RuleMap, RuleParser, Step,
    StepSpec, TransformContext, TransformContextBuilder, Transformable, Transformer,
};
pub use value::{Map, Receiver, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
