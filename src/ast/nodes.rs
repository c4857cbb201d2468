use std::sync::Arc;

use crate::ast::{ArithmeticOp, ComparisonOp, Literal, LogicalOp};

/// Abstract Syntax Tree node representing a parsed query.
///
/// Nodes are built once by the parser and never mutated afterwards, so a
/// parsed tree can be cached and evaluated repeatedly (also from several
/// threads) against different data contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Scalar literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1.5
    /// "hello"
    /// TRUE
    /// ```
    Literal(Literal),

    /// Lookup of a name in the data context
    ///
    /// # Example
    /// ```text
    /// user
    /// ```
    Variable(String),

    /// Property read, method call or subscript
    ///
    /// `member` is a string literal for `.name` and an arbitrary
    /// expression for `[expr]`.
    ///
    /// # Examples
    /// ```text
    /// user.name
    /// user?.profile
    /// user.hasPermission("edit")
    /// user[page.id]
    /// ```
    MemberAccess {
        object: Box<Node>,
        member: Box<Node>,
        arguments: Option<ArgumentList>,
        null_safe: bool,
    },

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, user.name, "x"]
    /// ```
    ArrayList(Vec<Node>),

    /// `+ - * / %`
    Arithmetic {
        left: Box<Node>,
        op: ArithmeticOp,
        right: Box<Node>,
    },

    /// `== === != !== < <= > >=`
    Comparison {
        left: Box<Node>,
        op: ComparisonOp,
        right: Box<Node>,
    },

    /// `&& AND || OR`, short-circuiting
    Logical {
        left: Box<Node>,
        op: LogicalOp,
        right: Box<Node>,
    },

    /// `left ?? right`
    Coalesce { left: Box<Node>, right: Box<Node> },

    /// `condition ? if_true : if_false`, or the elvis form
    /// `condition ?: if_false` when `if_true` is `None`.
    Ternary {
        condition: Box<Node>,
        if_true: Option<Box<Node>>,
        if_false: Box<Node>,
    },

    /// Deferred computation
    ///
    /// # Example
    /// ```text
    /// (page, index) => page.isListed && index < 3
    /// ```
    Closure(ClosureNode),

    /// Call of a registered entry or of a callable in the context
    ///
    /// # Example
    /// ```text
    /// t("welcome", "en")
    /// ```
    GlobalFunction { name: String, arguments: ArgumentList },
}

/// Ordered call arguments, evaluated left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentList(pub Vec<Node>);

impl ArgumentList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }
}

/// Parameter names plus body. The body sits behind an `Arc` so closure
/// values can hold on to it without copying the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureNode {
    pub params: Vec<String>,
    pub body: Arc<Node>,
}

impl Node {
    /// True for the elvis shorthand `a ?: b`.
    pub fn is_elvis(&self) -> bool {
        matches!(self, Node::Ternary { if_true: None, .. })
    }
}
