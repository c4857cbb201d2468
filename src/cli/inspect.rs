//! Debugging views of the tokenizer and parser output

use std::fmt::Write;

use super::CliError;
use crate::{Limits, parse_with_limits, tokenize};

/// One line per token: position, kind and lexeme.
pub fn dump_tokens(query: &str, limits: &Limits) -> Result<String, CliError> {
    limits.check_length(query)?;

    let mut out = String::new();
    for token in tokenize(query)? {
        let _ = writeln!(
            out,
            "{:>4}  {:<16} {:?}",
            token.position,
            format!("{:?}", token.kind),
            token.lexeme
        );
    }
    Ok(out)
}

/// Pretty `Debug` rendering of the parsed tree.
pub fn dump_ast(query: &str, limits: &Limits) -> Result<String, CliError> {
    let node = parse_with_limits(query, limits)?;
    Ok(format!("{:#?}", node))
}
