use std::iter::FusedIterator;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::ast::{Literal, Token, TokenType};
use crate::error::SyntaxError;

struct Rule {
    kind: TokenType,
    pattern: Regex,
}

/// Anchored patterns, tried in order at every offset. Keywords come before
/// identifiers, floats before integers and longer operators before their
/// prefixes.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        (TokenType::Whitespace, r"^\s+"),
        (TokenType::True, r"(?i)^true\b"),
        (TokenType::False, r"(?i)^false\b"),
        (TokenType::Null, r"(?i)^null\b"),
        (TokenType::String, r#"(?s)^"(?:[^"\\]|\\.)*""#),
        (TokenType::String, r"(?s)^'(?:[^'\\]|\\.)*'"),
        (TokenType::Float, r"^-?[0-9]+\.[0-9]+"),
        (TokenType::Integer, r"^-?[0-9]+"),
        (TokenType::Identical, r"^==="),
        (TokenType::NotIdentical, r"^!=="),
        (TokenType::Coalesce, r"^\?\?"),
        (TokenType::NullSafe, r"^\?\."),
        (TokenType::Elvis, r"^\?:"),
        (TokenType::Arrow, r"^=>"),
        (TokenType::LessEqual, r"^<="),
        (TokenType::GreaterEqual, r"^>="),
        (TokenType::Equal, r"^=="),
        (TokenType::NotEqual, r"^!="),
        (TokenType::And, r"^(?:&&|AND\b)"),
        (TokenType::Or, r"^(?:\|\||OR\b)"),
        (TokenType::Dot, r"^\."),
        (TokenType::Colon, r"^:"),
        (TokenType::Question, r"^\?"),
        (TokenType::LParen, r"^\("),
        (TokenType::RParen, r"^\)"),
        (TokenType::LBracket, r"^\["),
        (TokenType::RBracket, r"^\]"),
        (TokenType::Comma, r"^,"),
        (TokenType::Plus, r"^\+"),
        (TokenType::Minus, r"^-"),
        (TokenType::Star, r"^\*"),
        (TokenType::Slash, r"^/"),
        (TokenType::Percent, r"^%"),
        (TokenType::Less, r"^<"),
        (TokenType::Greater, r"^>"),
        (TokenType::Identifier, r"^[\p{L}_][\p{L}\p{N}_]*"),
    ]
    .into_iter()
    .map(|(kind, pattern)| Rule {
        kind,
        pattern: Regex::new(pattern).expect("token patterns are valid regular expressions"),
    })
    .collect()
});

/// Single forward pass over a query string.
///
/// Yields every token including whitespace and a final [`TokenType::Eof`];
/// use [`Tokenizer::tokens`] for the stream the parser consumes. After an
/// error the iterator is exhausted.
pub struct Tokenizer<'a> {
    query: &'a str,
    /// Byte offset into `query`
    offset: usize,
    /// Character offset into `query`
    position: usize,
    previous: Option<TokenType>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(query: &'a str) -> Self {
        Tokenizer {
            query,
            offset: 0,
            position: 0,
            previous: None,
            finished: false,
        }
    }

    /// The token stream without whitespace.
    pub fn tokens(self) -> Tokens<'a> {
        Tokens { inner: self }
    }

    fn scan(&mut self) -> Result<Token, SyntaxError> {
        let rest = &self.query[self.offset..];
        // A leading minus belongs to the number unless it follows an operand.
        let signed_allowed = !self.previous.is_some_and(TokenType::ends_operand);

        for rule in RULES.iter() {
            let Some(found) = rule.pattern.find(rest) else {
                continue;
            };
            let lexeme = found.as_str();
            if matches!(rule.kind, TokenType::Integer | TokenType::Float)
                && lexeme.starts_with('-')
                && !signed_allowed
            {
                continue;
            }

            let token = self.build(rule.kind, lexeme)?;
            self.offset += lexeme.len();
            self.position += lexeme.chars().count();
            return Ok(token);
        }

        match rest.chars().next() {
            Some('"') | Some('\'') => Err(SyntaxError::UnterminatedString {
                position: self.position,
            }),
            Some(character) => Err(SyntaxError::UnexpectedCharacter {
                character,
                position: self.position,
            }),
            None => Ok(Token::eof(self.position)),
        }
    }

    fn build(&self, kind: TokenType, lexeme: &str) -> Result<Token, SyntaxError> {
        let token = Token::new(kind, lexeme, self.position);
        let literal = match kind {
            TokenType::True => Literal::Boolean(true),
            TokenType::False => Literal::Boolean(false),
            TokenType::Null => Literal::Null,
            TokenType::String => Literal::String(unescape(&lexeme[1..lexeme.len() - 1])),
            TokenType::Integer => {
                Literal::Integer(lexeme.parse().map_err(|_| self.invalid_number(lexeme))?)
            }
            TokenType::Float => {
                Literal::Float(lexeme.parse().map_err(|_| self.invalid_number(lexeme))?)
            }
            _ => return Ok(token),
        };
        Ok(token.with_literal(literal))
    }

    fn invalid_number(&self, lexeme: &str) -> SyntaxError {
        SyntaxError::InvalidNumber {
            lexeme: lexeme.to_string(),
            position: self.position,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.offset >= self.query.len() {
            self.finished = true;
            return Some(Ok(Token::eof(self.position)));
        }

        let result = self.scan();
        match &result {
            Ok(token) => {
                trace!(kind = ?token.kind, lexeme = %token.lexeme, position = token.position, "token");
                if token.kind != TokenType::Whitespace {
                    self.previous = Some(token.kind);
                }
            }
            Err(_) => self.finished = true,
        }
        Some(result)
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Whitespace-free view of a [`Tokenizer`].
pub struct Tokens<'a> {
    inner: Tokenizer<'a>,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find(|item| !matches!(item, Ok(token) if token.kind == TokenType::Whitespace))
    }
}

impl FusedIterator for Tokens<'_> {}

/// Tokenize a whole query, whitespace removed, ending with `Eof`.
pub fn tokenize(query: &str) -> Result<Vec<Token>, SyntaxError> {
    Tokenizer::new(query).tokens().collect()
}

/// Resolve backslash escapes. `\n`, `\t` and `\r` map to control
/// characters; any other escaped character stands for itself.
fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

#[test]
fn test_keywords() {
    let kinds: Vec<TokenType> = tokenize("true FALSE Null AND OR")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenType::True,
            TokenType::False,
            TokenType::Null,
            TokenType::And,
            TokenType::Or,
            TokenType::Eof
        ]
    );
}

#[test]
fn test_whitespace_is_yielded_then_filtered() {
    let raw: Vec<TokenType> = Tokenizer::new("a  b")
        .map(|t| t.unwrap().kind)
        .collect();
    assert_eq!(
        raw,
        vec![
            TokenType::Identifier,
            TokenType::Whitespace,
            TokenType::Identifier,
            TokenType::Eof
        ]
    );
    assert_eq!(tokenize("a  b").unwrap().len(), 3);
}

#[test]
fn test_unescape() {
    assert_eq!(unescape(r#"say \"hi\"\n"#), "say \"hi\"\n");
    assert_eq!(unescape(r"it\'s"), "it's");
    assert_eq!(unescape(r"\$x"), "$x");
}
