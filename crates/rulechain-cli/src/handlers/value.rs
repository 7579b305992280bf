//! Value command handler

use super::utils::build_context;
use crate::cli::ValueArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use anyhow::Context;
use rulechain_core::Value;
use tracing::instrument;

/// Handle the value command
#[instrument(skip(args, config, output), fields(chain = %args.chain))]
pub fn handle_value(args: ValueArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let result = transform_value(&args, config)?;
    output.data(&result)
}

/// Run the single value named by `args` through its chain
pub fn transform_value(args: &ValueArgs, config: &Config) -> Result<Value> {
    let value = if args.json {
        let parsed: serde_json::Value = serde_json::from_str(&args.value)
            .with_context(|| format!("Value '{}' is not valid JSON", args.value))?;
        Value::from(parsed)
    } else {
        Value::from(args.value.as_str())
    };

    let context = build_context(config, &args.allow, &args.deny)?;
    Ok(context.transform(value, args.chain.as_str(), args.field.as_deref())?)
}
