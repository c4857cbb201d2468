use std::fmt;

/// Lexical category of a [`Token`].
///
/// The set is closed: the tokenizer never produces anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Literals
    /// Field, variable or function name
    ///
    /// # Examples
    /// ```text
    /// user
    /// isAdmin
    /// größe
    /// ```
    Identifier,

    /// Single- or double-quoted string
    String,

    /// Integer with optional leading minus
    Integer,

    /// Float with optional leading minus (`-?\d+\.\d+`)
    Float,

    /// `true`, case-insensitive
    True,

    /// `false`, case-insensitive
    False,

    /// `null`, case-insensitive
    Null,

    // Structural
    /// Member access (`.`)
    Dot,
    /// Ternary separator (`:`)
    Colon,
    /// Ternary condition (`?`)
    Question,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    /// Closure arrow (`=>`)
    Arrow,

    // Question-mark compounds
    /// Elvis shorthand (`?:`)
    Elvis,
    /// Null-safe member access (`?.`)
    NullSafe,
    /// Coalesce (`??`)
    Coalesce,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    /// Loose equality (`==`)
    Equal,
    /// Strict equality (`===`)
    Identical,
    /// Loose inequality (`!=`)
    NotEqual,
    /// Strict inequality (`!==`)
    NotIdentical,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical
    /// `&&` or `AND`
    And,
    /// `||` or `OR`
    Or,

    /// Skipped before the parser ever sees it
    Whitespace,

    /// End of the token stream
    Eof,
}

impl TokenType {
    /// True for tokens that end an operand, after which a `-` is a
    /// subtraction rather than the sign of a number.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenType::Identifier
                | TokenType::String
                | TokenType::Integer
                | TokenType::Float
                | TokenType::True
                | TokenType::False
                | TokenType::Null
                | TokenType::RParen
                | TokenType::RBracket
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Identifier => "identifier",
            TokenType::String => "string",
            TokenType::Integer => "integer",
            TokenType::Float => "float",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Null => "null",
            TokenType::Dot => "\".\"",
            TokenType::Colon => "\":\"",
            TokenType::Question => "\"?\"",
            TokenType::LParen => "\"(\"",
            TokenType::RParen => "\")\"",
            TokenType::LBracket => "\"[\"",
            TokenType::RBracket => "\"]\"",
            TokenType::Comma => "\",\"",
            TokenType::Arrow => "\"=>\"",
            TokenType::Elvis => "\"?:\"",
            TokenType::NullSafe => "\"?.\"",
            TokenType::Coalesce => "\"??\"",
            TokenType::Plus => "\"+\"",
            TokenType::Minus => "\"-\"",
            TokenType::Star => "\"*\"",
            TokenType::Slash => "\"/\"",
            TokenType::Percent => "\"%\"",
            TokenType::Equal => "\"==\"",
            TokenType::Identical => "\"===\"",
            TokenType::NotEqual => "\"!=\"",
            TokenType::NotIdentical => "\"!==\"",
            TokenType::Less => "\"<\"",
            TokenType::LessEqual => "\"<=\"",
            TokenType::Greater => "\">\"",
            TokenType::GreaterEqual => "\">=\"",
            TokenType::And => "\"&&\"",
            TokenType::Or => "\"||\"",
            TokenType::Whitespace => "whitespace",
            TokenType::Eof => "end of query",
        };
        f.write_str(name)
    }
}

/// Decoded scalar carried by literal tokens and literal nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A classified lexical unit.
///
/// `position` is the character offset of the first character of the
/// lexeme in the original query.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenType, lexeme: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            position,
        }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn eof(position: usize) -> Self {
        Token::new(TokenType::Eof, "", position)
    }

    /// Human-readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenType::Eof => "end of query".to_string(),
            _ => format!("\"{}\"", self.lexeme),
        }
    }
}
