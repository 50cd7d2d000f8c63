//! Command-line tooling: one-shot subcommands and the interactive shell.

pub mod cli;
pub mod shell;

pub use cli::{Cli, CliContext, Commands};
