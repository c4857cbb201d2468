//! Execute sprig queries against JSON input

use std::sync::Arc;

use super::CliError;
use crate::{Entries, Evaluator, Limits, Value, parse_with_limits};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to execute
    pub query: String,
    /// JSON data context
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// Constant global functions as `name=JSON`
    pub entries: Vec<String>,
    pub limits: Limits,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed successfully with JSON output
    Success(serde_json::Value),
}

/// Split `name=JSON` into the entry name and its value.
pub fn parse_entry(entry: &str) -> Result<(String, Value), CliError> {
    let (name, json) = entry
        .split_once('=')
        .ok_or_else(|| CliError::InvalidEntry(entry.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidEntry(entry.to_string()));
    }
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok((name.to_string(), Value::from(value)))
}

/// Execute a sprig check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let node = parse_with_limits(&options.query, &options.limits)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let context: serde_json::Value = serde_json::from_str(json_str)?;

    let entries = Entries::new();
    for entry in &options.entries {
        let (name, value) = parse_entry(entry)?;
        entries.register_value(name, value)?;
    }
    entries.freeze();

    let result = Evaluator::with_entries(Arc::new(entries)).evaluate(&node, Value::from(context))?;
    Ok(CheckResult::Success(result.to_json()))
}
