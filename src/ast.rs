//! # Sprig Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) of the
//! Sprig query language, a compact expression language used by templates
//! and configuration to resolve values out of a runtime data context.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the tokenizer
//! - **[nodes]** - Expression nodes built by the parser
//! - **[operators]** - Arithmetic, comparison and logical operators
//!
//! ## Quick Start
//!
//! ```text
//! user.isAdmin && user.hasPermission("edit")
//! ```
//!
//! ## Precedence
//!
//! From lowest to highest:
//!
//! 1. Ternary `a ? b : c` and elvis `a ?: b`
//! 2. Coalesce `a ?? b`
//! 3. Logical `&&`, `AND`, `||`, `OR` (one tier, left to right)
//! 4. Comparison `== === != !== < <= > >=`
//! 5. Additive `+ -`
//! 6. Multiplicative `* / %`
//! 7. Member chains `a.b`, `a?.b`, `a[b]`, `a.b(c)`
//! 8. Atoms: literals, arrays, variables, global calls, groups, closures
//!
//! ## Examples
//!
//! ### Null-safe chain with fallback
//!
//! ```text
//! page?.author?.name ?? "anonymous"
//! ```
//!
//! ### Closure passed to a method
//!
//! ```text
//! site.children.filter((child) => child.isListed).count
//! ```
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{ArgumentList, ClosureNode, Node};
pub use operators::{ArithmeticOp, ComparisonOp, LogicalOp};
pub use tokens::{Literal, Token, TokenType};
