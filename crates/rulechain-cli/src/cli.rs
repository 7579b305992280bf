//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rulechain CLI - Apply transformation rule chains to values and data files
///
/// Rules are written as `step1|step2:arg1,arg2|->method` chains and applied
/// to a single value or to the (optionally wildcarded) keys of a data file.
#[derive(Parser, Debug)]
#[command(
    name = "rulechain",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "RULECHAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a rule file to a data file
    Apply(ApplyArgs),

    /// Run a single value through a rule chain
    Value(ValueArgs),

    /// List the functions, types and aliases rules can call
    Functions(FunctionsArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Data file to transform (JSON, YAML or TOML; `-` reads JSON from stdin)
    #[arg(value_name = "DATA_FILE")]
    pub data: PathBuf,

    /// Rule file mapping key patterns to chains (JSON, YAML or TOML)
    #[arg(short, long, value_name = "RULES_FILE")]
    pub rules: Option<PathBuf>,

    /// Inline rule as KEY=CHAIN, applied after the rule file
    #[arg(long = "rule", value_name = "KEY=CHAIN")]
    pub inline_rules: Vec<String>,

    /// Only allow these functions to run
    #[arg(long, value_delimiter = ',')]
    pub allow: Vec<String>,

    /// Never allow these functions to run
    #[arg(long, value_delimiter = ',')]
    pub deny: Vec<String>,

    /// Output file path (format taken from its extension)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the value command
#[derive(Parser, Debug)]
pub struct ValueArgs {
    /// The value to transform
    pub value: String,

    /// The rule chain, e.g. `trim|titlecase`
    pub chain: String,

    /// Parse the value as JSON instead of taking it as a string
    #[arg(long)]
    pub json: bool,

    /// Field name handed to the guard
    #[arg(long)]
    pub field: Option<String>,

    /// Only allow these functions to run
    #[arg(long, value_delimiter = ',')]
    pub allow: Vec<String>,

    /// Never allow these functions to run
    #[arg(long, value_delimiter = ',')]
    pub deny: Vec<String>,
}

/// Arguments for the functions command
#[derive(Parser, Debug)]
pub struct FunctionsArgs {
    /// Only list names containing this text
    #[arg(long)]
    pub filter: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// List the locations searched for configuration files
    Paths,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config location)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["rulechain", "-vv", "value", "x", "trim"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["rulechain", "--quiet", "value", "x", "trim"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_apply_arguments() {
        let cli = Cli::parse_from([
            "rulechain",
            "-o",
            "json-pretty",
            "apply",
            "data.json",
            "--rules",
            "rules.yaml",
            "--rule",
            "first_name=trim|ucfirst",
            "--allow",
            "trim,ucfirst",
        ]);
        assert_eq!(cli.output, Some(OutputFormat::JsonPretty));

        let Commands::Apply(args) = cli.command else {
            panic!("expected apply command");
        };
        assert_eq!(args.data, PathBuf::from("data.json"));
        assert_eq!(args.rules, Some(PathBuf::from("rules.yaml")));
        assert_eq!(args.inline_rules, vec!["first_name=trim|ucfirst"]);
        assert_eq!(args.allow, vec!["trim", "ucfirst"]);
        assert!(args.deny.is_empty());
    }
}
