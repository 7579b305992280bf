//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod apply;
mod completions;
mod config;
mod functions;
mod utils;
mod value;

pub use apply::handle_apply;
pub use completions::handle_completions;
pub use config::handle_config;
pub use functions::handle_functions;
pub use value::handle_value;
