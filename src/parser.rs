use std::sync::Arc;

use tracing::debug;

use crate::{
    ast::{
        ArgumentList, ArithmeticOp, ClosureNode, ComparisonOp, Literal, LogicalOp, Node, Token,
        TokenType,
    },
    error::SyntaxError,
    tokenizer::Tokenizer,
};

/// Bounds applied before and during parsing.
///
/// Parser and evaluator recursion both follow the depth of the tree, so
/// hosts accepting untrusted queries should keep both limits finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum query length in bytes
    pub max_length: usize,
    /// Maximum depth of the parsed tree. Every operator and chain link
    /// counts, as do nested sub-expressions (groups, arguments,
    /// subscripts, branches, closure bodies).
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_length: 65_536,
            max_depth: 64,
        }
    }
}

impl Limits {
    pub fn check_length(&self, query: &str) -> Result<(), SyntaxError> {
        if query.len() > self.max_length {
            return Err(SyntaxError::QueryTooLong {
                length: query.len(),
                limit: self.max_length,
            });
        }
        Ok(())
    }
}

/// A subtree plus its height, counted in nodes.
struct Parsed {
    node: Node,
    height: usize,
}

impl Parsed {
    fn leaf(node: Node) -> Self {
        Parsed { node, height: 1 }
    }
}

/// Precedence-climbing recursive-descent parser.
///
/// Consumes a whitespace-free token stream (see [`Tokenizer::tokens`])
/// and builds a [`Node`] tree. There is no error recovery: the first
/// failure aborts the parse.
pub struct Parser<I>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    tokens: I,
    current_token: Token,
    limits: Limits,
    depth: usize,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token, SyntaxError>>,
{
    pub fn new(tokens: I) -> Result<Self, SyntaxError> {
        Self::with_limits(tokens, Limits::default())
    }

    pub fn with_limits(mut tokens: I, limits: Limits) -> Result<Self, SyntaxError> {
        let current_token = tokens.next().transpose()?.unwrap_or_else(|| Token::eof(0));
        Ok(Parser {
            tokens,
            current_token,
            limits,
            depth: 0,
        })
    }

    /// Parse one full expression and require the stream to end there.
    pub fn parse(&mut self) -> Result<Node, SyntaxError> {
        let node = self.parse_expression()?;
        if !self.check(TokenType::Eof) {
            return Err(SyntaxError::TrailingTokens {
                lexeme: self.current_token.lexeme.clone(),
                position: self.current_token.position,
            });
        }
        Ok(node)
    }

    /// Move to the next token and hand back the one just passed.
    fn advance(&mut self) -> Result<Token, SyntaxError> {
        let position = self.current_token.position + self.current_token.lexeme.chars().count();
        let next = match self.tokens.next().transpose()? {
            Some(token) => token,
            None => Token::eof(position),
        };
        Ok(std::mem::replace(&mut self.current_token, next))
    }

    fn check(&self, kind: TokenType) -> bool {
        self.current_token.kind == kind
    }

    /// Consume the current token if it has the given kind.
    fn matches(&mut self, kind: TokenType) -> Result<bool, SyntaxError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenType, message: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError::Expected {
            message: message.to_string(),
            found: self.current_token.describe(),
            position: self.current_token.position,
        }
    }

    /// Reject a node whose subtree would be deeper than `max_depth`.
    fn build(&self, node: Node, height: usize) -> Result<Parsed, SyntaxError> {
        if height > self.limits.max_depth {
            return Err(SyntaxError::NestingTooDeep {
                limit: self.limits.max_depth,
            });
        }
        Ok(Parsed { node, height })
    }

    fn binary(
        &self,
        left: Parsed,
        right: Parsed,
        make: impl FnOnce(Box<Node>, Box<Node>) -> Node,
    ) -> Result<Parsed, SyntaxError> {
        let height = left.height.max(right.height) + 1;
        self.build(make(Box::new(left.node), Box::new(right.node)), height)
    }

    pub fn parse_expression(&mut self) -> Result<Node, SyntaxError> {
        self.expression().map(|parsed| parsed.node)
    }

    fn expression(&mut self) -> Result<Parsed, SyntaxError> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(SyntaxError::NestingTooDeep {
                limit: self.limits.max_depth,
            });
        }
        let parsed = self.parse_ternary();
        self.depth -= 1;
        parsed
    }

    fn parse_ternary(&mut self) -> Result<Parsed, SyntaxError> {
        let condition = self.parse_coalesce()?;

        if self.matches(TokenType::Question)? {
            let if_true = self.expression()?;
            self.expect(
                TokenType::Colon,
                "Incomplete ternary: expect \":\" after true branch",
            )?;
            let if_false = self.expression()?;
            let height = condition.height.max(if_true.height).max(if_false.height) + 1;
            return self.build(
                Node::Ternary {
                    condition: Box::new(condition.node),
                    if_true: Some(Box::new(if_true.node)),
                    if_false: Box::new(if_false.node),
                },
                height,
            );
        }

        if self.matches(TokenType::Elvis)? {
            let if_false = self.expression()?;
            let height = condition.height.max(if_false.height) + 1;
            return self.build(
                Node::Ternary {
                    condition: Box::new(condition.node),
                    if_true: None,
                    if_false: Box::new(if_false.node),
                },
                height,
            );
        }

        Ok(condition)
    }

    fn parse_coalesce(&mut self) -> Result<Parsed, SyntaxError> {
        let mut left = self.parse_logical()?;

        while self.matches(TokenType::Coalesce)? {
            let right = self.parse_logical()?;
            left = self.binary(left, right, |left, right| Node::Coalesce { left, right })?;
        }
        Ok(left)
    }

    fn parse_logical(&mut self) -> Result<Parsed, SyntaxError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.current_token.kind {
                TokenType::And => LogicalOp::And,
                TokenType::Or => LogicalOp::Or,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_comparison()?;
            left = self.binary(left, right, |left, right| Node::Logical { left, op, right })?;
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Parsed, SyntaxError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token.kind {
                TokenType::Equal => ComparisonOp::Equal,
                TokenType::Identical => ComparisonOp::Identical,
                TokenType::NotEqual => ComparisonOp::NotEqual,
                TokenType::NotIdentical => ComparisonOp::NotIdentical,
                TokenType::Less => ComparisonOp::LessThan,
                TokenType::LessEqual => ComparisonOp::LessEqual,
                TokenType::Greater => ComparisonOp::GreaterThan,
                TokenType::GreaterEqual => ComparisonOp::GreaterEqual,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_additive()?;
            left = self.binary(left, right, |left, right| Node::Comparison { left, op, right })?;
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Parsed, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token.kind {
                TokenType::Plus => ArithmeticOp::Add,
                TokenType::Minus => ArithmeticOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = self.binary(left, right, |left, right| Node::Arithmetic { left, op, right })?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Parsed, SyntaxError> {
        let mut left = self.parse_chain()?;

        loop {
            let op = match self.current_token.kind {
                TokenType::Star => ArithmeticOp::Multiply,
                TokenType::Slash => ArithmeticOp::Divide,
                TokenType::Percent => ArithmeticOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_chain()?;
            left = self.binary(left, right, |left, right| Node::Arithmetic { left, op, right })?;
        }
        Ok(left)
    }

    /// Member chains: `.name`, `?.name`, `[expr]`, each optionally
    /// followed by call arguments.
    fn parse_chain(&mut self) -> Result<Parsed, SyntaxError> {
        let mut object = self.parse_atomic()?;

        loop {
            let (member, null_safe) = match self.current_token.kind {
                TokenType::Dot | TokenType::NullSafe => {
                    let null_safe = self.check(TokenType::NullSafe);
                    self.advance()?;

                    let name = self.parse_member_name(null_safe)?;
                    (Parsed::leaf(Node::Literal(Literal::String(name))), null_safe)
                }
                TokenType::LBracket => {
                    self.advance()?;
                    let member = self.expression()?;
                    self.expect(TokenType::RBracket, "Expect \"]\" after subscript")?;
                    (member, false)
                }
                _ => break,
            };

            let mut height = object.height.max(member.height) + 1;
            let arguments = if self.matches(TokenType::LParen)? {
                let (arguments, arguments_height) = self.parse_list(TokenType::RParen)?;
                height = height.max(arguments_height + 1);
                Some(ArgumentList(arguments))
            } else {
                None
            };

            object = self.build(
                Node::MemberAccess {
                    object: Box::new(object.node),
                    member: Box::new(member.node),
                    arguments,
                    null_safe,
                },
                height,
            )?;
        }
        Ok(object)
    }

    /// Identifiers, plus keyword lexemes so `page.null` stays reachable.
    fn parse_member_name(&mut self, null_safe: bool) -> Result<String, SyntaxError> {
        match self.current_token.kind {
            TokenType::Identifier | TokenType::True | TokenType::False | TokenType::Null => {
                Ok(self.advance()?.lexeme)
            }
            _ if null_safe => Err(self.error("Expect property name after \"?.\"")),
            _ => Err(self.error("Expect property name after \".\"")),
        }
    }

    fn parse_atomic(&mut self) -> Result<Parsed, SyntaxError> {
        match self.current_token.kind {
            TokenType::String
            | TokenType::Integer
            | TokenType::Float
            | TokenType::True
            | TokenType::False
            | TokenType::Null => {
                let token = self.advance()?;
                Ok(Parsed::leaf(Node::Literal(
                    token.literal.unwrap_or(Literal::Null),
                )))
            }
            TokenType::LBracket => {
                self.advance()?;
                let (elements, height) = self.parse_list(TokenType::RBracket)?;
                self.build(Node::ArrayList(elements), height + 1)
            }
            TokenType::Identifier => {
                let name = self.advance()?.lexeme;
                if self.matches(TokenType::LParen)? {
                    let (arguments, height) = self.parse_list(TokenType::RParen)?;
                    self.build(
                        Node::GlobalFunction {
                            name,
                            arguments: ArgumentList(arguments),
                        },
                        height + 1,
                    )
                } else {
                    Ok(Parsed::leaf(Node::Variable(name)))
                }
            }
            TokenType::LParen => {
                self.advance()?;
                self.parse_grouping_or_closure()
            }
            _ => Err(self.error("Expect expression")),
        }
    }

    /// `(expr)` is a plain grouping; `(a, b) => body` is a closure.
    fn parse_grouping_or_closure(&mut self) -> Result<Parsed, SyntaxError> {
        let (elements, height) = self.parse_list(TokenType::RParen)?;

        if self.check(TokenType::Arrow) {
            let params = elements
                .into_iter()
                .map(|element| match element {
                    Node::Variable(name) => Ok(name),
                    _ => Err(self.error("Expecting only variables in closure argument list")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.advance()?;

            let body = self.expression()?;
            return self.build(
                Node::Closure(ClosureNode {
                    params,
                    body: Arc::new(body.node),
                }),
                body.height + 1,
            );
        }

        match <[Node; 1]>::try_from(elements) {
            Ok([node]) => Ok(Parsed { node, height }),
            Err(_) => Err(self.error("Expecting \"=>\" after closure argument list")),
        }
    }

    /// Comma-separated expressions up to and including `closing`, with the
    /// height of the tallest one. A trailing comma is accepted.
    fn parse_list(&mut self, closing: TokenType) -> Result<(Vec<Node>, usize), SyntaxError> {
        let mut elements = vec![];
        let mut height = 0;

        while !self.check(closing) {
            let element = self.expression()?;
            height = height.max(element.height);
            elements.push(element.node);

            if !self.matches(TokenType::Comma)? {
                break;
            }
        }

        self.expect(closing, "Expect closing bracket after list")?;
        Ok((elements, height))
    }
}

/// Parse a query with default [`Limits`].
pub fn parse(query: &str) -> Result<Node, SyntaxError> {
    parse_with_limits(query, &Limits::default())
}

/// Parse a query, rejecting it early if it exceeds `limits`.
pub fn parse_with_limits(query: &str, limits: &Limits) -> Result<Node, SyntaxError> {
    limits.check_length(query)?;

    let mut parser = Parser::with_limits(Tokenizer::new(query).tokens(), *limits)?;
    let node = parser.parse()?;
    debug!(query, "parsed query");
    Ok(node)
}
