//! Functions command handler

use crate::cli::{FunctionsArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use rulechain_core::FunctionRegistry;
use serde::Serialize;

/// One listed registry entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionEntry {
    pub name: String,
    pub kind: String,
    pub allowed: bool,
}

/// Handle the functions command
pub fn handle_functions(args: FunctionsArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let entries = list_functions(&FunctionRegistry::with_builtins(), config, args.filter.as_deref());

    if output.format() != OutputFormat::Human {
        return output.data(&entries);
    }

    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.name.clone(),
                entry.kind.clone(),
                if entry.allowed { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    output.table(&["NAME", "KIND", "ALLOWED"], rows)
}

/// Registry entries, with whether the configured guard lets each run
///
/// Types and capability objects are never guarded.
pub fn list_functions(registry: &FunctionRegistry, config: &Config, filter: Option<&str>) -> Vec<FunctionEntry> {
    registry
        .describe()
        .into_iter()
        .filter(|(name, _)| filter.map_or(true, |needle| name.contains(needle)))
        .map(|(name, kind)| {
            let guarded = kind == "function" || kind.starts_with("alias");
            let allowed = !guarded || config.guard.permits_resolved(&name, registry.canonical(&name));
            FunctionEntry { name, kind, allowed }
        })
        .collect()
}
