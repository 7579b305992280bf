//! Apply command handler

use super::utils::{build_context, load_data, load_rules, parse_inline_rule, write_document};
use crate::cli::ApplyArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use rulechain_core::{Map, RuleMap};
use tracing::{debug, info, instrument};

/// Handle the apply command
#[instrument(skip(args, config, output), fields(data = %args.data.display()))]
pub fn handle_apply(args: ApplyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("apply_command", &args.data.display().to_string());
    output.info(&format!("Transforming {}", args.data.display()))?;

    let transformed = apply(&args, config)?;

    if let Some(path) = &args.save_to {
        write_document(path, &transformed)?;
        output.success(&format!("✓ Output saved to {}", path.display()))?;
        return Ok(());
    }

    output.data(&transformed)
}

/// Load the inputs named by `args` and run the rules over the data
pub fn apply(args: &ApplyArgs, config: &Config) -> Result<Map> {
    let rules = collect_rules(args)?;
    if rules.is_empty() {
        return Err(Error::invalid_args(
            "No rules given; pass --rules FILE or --rule KEY=CHAIN",
        ));
    }

    let data = load_data(&args.data)?;
    debug!(keys = data.len(), rules = rules.len(), "Inputs loaded");

    let context = build_context(config, &args.allow, &args.deny)?;
    let transformed = context.transform_data(data, rules)?;
    info!("Data transformed");

    Ok(transformed)
}

fn collect_rules(args: &ApplyArgs) -> Result<RuleMap> {
    let mut rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => RuleMap::new(),
    };

    for inline in &args.inline_rules {
        let (key, chain) = parse_inline_rule(inline)?;
        rules.insert(key, chain);
    }

    Ok(rules)
}
