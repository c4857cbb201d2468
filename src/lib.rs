//! Sprig: an embeddable expression language for resolving values out of a
//! runtime data context.
//!
//! ```
//! use sprig_lang::{query, Value};
//!
//! let context = Value::from(serde_json::json!({
//!     "page": {"title": "Home", "author": null}
//! }));
//!
//! let title = query("page.title ?? 'untitled'", context.clone()).unwrap();
//! assert_eq!(title, Value::from("Home"));
//!
//! let author = query("page.author?.name ?? 'anonymous'", context).unwrap();
//! assert_eq!(author, Value::from("anonymous"));
//! ```
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compare;
pub mod entries;
pub mod error;
pub mod evaluator;
pub mod host;
mod methods;
pub mod parser;
pub mod tokenizer;
pub mod value;

pub use ast::{
    ArgumentList, ArithmeticOp, ClosureNode, ComparisonOp, Literal, LogicalOp, Node, Token,
    TokenType,
};
pub use entries::{Entries, register_entry};
pub use error::{AccessKind, Error, RegistryError, ResolutionError, SyntaxError};
pub use evaluator::{EvalContext, Evaluator};
pub use host::{HostObject, Record};
pub use parser::{Limits, Parser, parse, parse_with_limits};
pub use tokenizer::{Tokenizer, tokenize};
pub use value::{Closure, Function, Value};

/// Evaluate a parsed query against `context`, using the process-wide entry
/// registry.
pub fn evaluate(node: &Node, context: Value) -> Result<Value, ResolutionError> {
    Evaluator::new().evaluate(node, context)
}

/// Parse and evaluate in one step.
pub fn query(query: &str, context: Value) -> Result<Value, Error> {
    let node = parse(query)?;
    Ok(evaluate(&node, context)?)
}
