//! CLI support for sprig-lang
//!
//! The `sprig` binary is a thin clap front-end over these functions, so
//! the same behavior is available to tools embedding the language.

mod check;
mod inspect;

pub use check::{CheckOptions, CheckResult, execute_check, parse_entry};
pub use inspect::{dump_ast, dump_tokens};

use std::io;

use thiserror::Error;

use crate::error::{RegistryError, ResolutionError, SyntaxError};

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Invalid entry '{0}', expected name=JSON")]
    InvalidEntry(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
