// cocolabel-cli/src/lib.rs
//
// Library portion of the cocolabel CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, FilterArgs, ManifestArgs, PrepareArgs};
pub use commands::filter::run_filter_command;
pub use commands::manifest::run_manifest_command;
pub use commands::prepare::run_prepare;
pub use error::{CliErrorContext, CliResult, suggestion_for};
