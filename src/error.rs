//! Error types for tokenizing, parsing, evaluating and registering entries.

use std::fmt;

use thiserror::Error;

/// Raised when a query cannot be tokenized or does not match the grammar.
///
/// Positions are character offsets into the query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("Invalid character \"{character}\" in query at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("Invalid number \"{lexeme}\" at position {position}")]
    InvalidNumber { lexeme: String, position: usize },

    #[error("{message}, found {found} at position {position}")]
    Expected {
        message: String,
        found: String,
        position: usize,
    },

    #[error("Unexpected token \"{lexeme}\" at position {position}, expected end of query")]
    TrailingTokens { lexeme: String, position: usize },

    #[error("Query is {length} bytes long, the limit is {limit}")]
    QueryTooLong { length: usize, limit: usize },

    #[error("Query nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// What kind of member an access was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Property,
    Method,
    MethodOrProperty,
}

impl AccessKind {
    /// Method when arguments were supplied, otherwise `fallback`.
    pub fn for_arguments(has_arguments: bool, fallback: AccessKind) -> Self {
        if has_arguments {
            AccessKind::Method
        } else {
            fallback
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessKind::Property => "property",
            AccessKind::Method => "method",
            AccessKind::MethodOrProperty => "method/property",
        })
    }
}

/// Raised when evaluation hits an illegal access or operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Access to non-existing {kind} \"{name}\" on {on}")]
    NotFound {
        kind: AccessKind,
        name: String,
        on: String,
    },

    #[error("Cannot access \"{name}\" on {on} with arguments")]
    ArgumentsNotAccepted { name: String, on: String },

    #[error("Unknown global function \"{0}\"")]
    UnknownFunction(String),

    #[error("Value of type {on} is not callable")]
    NotCallable { on: String },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Host(String),
}

impl ResolutionError {
    pub fn not_found(kind: AccessKind, name: impl Into<String>, on: impl Into<String>) -> Self {
        ResolutionError::NotFound {
            kind,
            name: name.into(),
            on: on.into(),
        }
    }
}

/// Raised by the entry registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Entry \"{0}\" is already registered")]
    AlreadyRegistered(String),

    #[error("Cannot register entry \"{0}\": the registry is frozen")]
    Frozen(String),
}

/// Either family, for callers that parse and evaluate in one go.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),
}
