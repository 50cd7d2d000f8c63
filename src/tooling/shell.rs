//! Interactive shell
//!
//! Runs CLI commands against one long-lived session, so retrieved content stays
//! in memory and can be downloaded later. A failed command prints its error and
//! the shell keeps going.

use super::cli::{CliContext, Commands};
use crate::error::ApiError;
use clap::Parser;
use std::io::IsTerminal;

/// One shell line, parsed with the same subcommands as the CLI.
#[derive(Parser, Debug)]
#[command(name = "drive", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

/// What the shell should do with an input line.
#[derive(Debug, PartialEq)]
pub(crate) enum ShellAction {
    Skip,
    Quit,
    Run(Commands),
    /// Parse failure or help text, printed as-is.
    Print(String),
}

/// Split a line into words. Double quotes group words containing spaces.
pub(crate) fn split_words(line: &str) -> Result<Vec<String>, ApiError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if in_quotes {
        return Err(ApiError::ConfigError("Unterminated quote".to_string()));
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

pub(crate) fn parse_line(line: &str) -> ShellAction {
    let words = match split_words(line) {
        Ok(words) => words,
        Err(e) => return ShellAction::Print(format!("Error: {}", e)),
    };
    match words.first().map(String::as_str) {
        None => ShellAction::Skip,
        Some("quit") | Some("exit") => ShellAction::Quit,
        Some(_) => match ShellLine::try_parse_from(&words) {
            Ok(ShellLine {
                command: Commands::Shell,
            }) => ShellAction::Print("Already in the shell.".to_string()),
            Ok(parsed) => ShellAction::Run(parsed.command),
            Err(e) => ShellAction::Print(e.to_string()),
        },
    }
}

fn read_line(interactive: bool) -> Result<Option<String>, ApiError> {
    if interactive {
        let line = dialoguer::Input::<String>::new()
            .with_prompt("drive")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ApiError::ConfigError(format!("Failed to read input: {}", e)))?;
        return Ok(Some(line));
    }
    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Run the shell until `quit`, `exit` or end of input.
pub fn run(context: &CliContext) -> Result<String, ApiError> {
    let interactive = std::io::stdin().is_terminal();
    tracing::info!(interactive, "Shell started");
    if interactive {
        println!("Type a command (list, upload, retrieve, download, ...), 'help' or 'quit'.");
    }

    while let Some(line) = read_line(interactive)? {
        match parse_line(&line) {
            ShellAction::Skip => {}
            ShellAction::Quit => break,
            ShellAction::Print(text) => println!("{}", text.trim_end()),
            ShellAction::Run(command) => match context.execute(&command) {
                Ok(output) => println!("{}", output),
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }
    Ok("Bye.".to_string())
}
