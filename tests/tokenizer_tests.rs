// tests/tokenizer_tests.rs

use sprig_lang::ast::{Literal, TokenType};
use sprig_lang::error::SyntaxError;
use sprig_lang::tokenizer::{Tokenizer, tokenize};

fn kinds(query: &str) -> Vec<TokenType> {
    tokenize(query)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn literals(query: &str) -> Vec<Literal> {
    tokenize(query)
        .unwrap()
        .into_iter()
        .filter_map(|t| t.literal)
        .collect()
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(
        literals("42 3.14 -7 -0.5"),
        vec![
            Literal::Integer(42),
            Literal::Float(3.14),
            Literal::Integer(-7),
            Literal::Float(-0.5),
        ]
    );
}

#[test]
fn test_float_is_not_truncated() {
    assert_eq!(kinds("1.25"), vec![TokenType::Float, TokenType::Eof]);
}

#[test]
fn test_minus_after_operand_is_subtraction() {
    assert_eq!(
        kinds("a-1"),
        vec![
            TokenType::Identifier,
            TokenType::Minus,
            TokenType::Integer,
            TokenType::Eof
        ]
    );
    assert_eq!(literals("a-1"), vec![Literal::Integer(1)]);

    assert_eq!(literals("(2)-1"), vec![Literal::Integer(2), Literal::Integer(1)]);
    assert_eq!(literals("a - -1"), vec![Literal::Integer(-1)]);
    assert_eq!(literals("[-1]"), vec![Literal::Integer(-1)]);
}

#[test]
fn test_integer_overflow_is_rejected() {
    let err = tokenize("99999999999999999999").unwrap_err();
    assert!(matches!(err, SyntaxError::InvalidNumber { position: 0, .. }));
}

#[test]
fn test_strings() {
    assert_eq!(
        literals(r#""double" 'single'"#),
        vec![
            Literal::String("double".to_string()),
            Literal::String("single".to_string())
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        literals(r#""say \"hi\"" 'it\'s' "tab\there""#),
        vec![
            Literal::String("say \"hi\"".to_string()),
            Literal::String("it's".to_string()),
            Literal::String("tab\there".to_string()),
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    for query in ["true", "TRUE", "True", "tRuE"] {
        assert_eq!(literals(query), vec![Literal::Boolean(true)], "{}", query);
    }
    assert_eq!(literals("NULL"), vec![Literal::Null]);
    assert_eq!(literals("False"), vec![Literal::Boolean(false)]);
}

#[test]
fn test_keyword_prefix_is_an_identifier() {
    assert_eq!(kinds("trueish"), vec![TokenType::Identifier, TokenType::Eof]);
    assert_eq!(kinds("null_value"), vec![TokenType::Identifier, TokenType::Eof]);
}

// ============================================================================
// Operators and punctuation
// ============================================================================

#[test]
fn test_compound_operators() {
    assert_eq!(
        kinds("=== !== ?? ?. ?: => <= >= == != && || AND OR"),
        vec![
            TokenType::Identical,
            TokenType::NotIdentical,
            TokenType::Coalesce,
            TokenType::NullSafe,
            TokenType::Elvis,
            TokenType::Arrow,
            TokenType::LessEqual,
            TokenType::GreaterEqual,
            TokenType::Equal,
            TokenType::NotEqual,
            TokenType::And,
            TokenType::Or,
            TokenType::And,
            TokenType::Or,
            TokenType::Eof,
        ]
    );
}

#[test]
fn test_single_character_tokens() {
    assert_eq!(
        kinds(". : ? ( ) [ ] , + - * / % < >"),
        vec![
            TokenType::Dot,
            TokenType::Colon,
            TokenType::Question,
            TokenType::LParen,
            TokenType::RParen,
            TokenType::LBracket,
            TokenType::RBracket,
            TokenType::Comma,
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Star,
            TokenType::Slash,
            TokenType::Percent,
            TokenType::Less,
            TokenType::Greater,
            TokenType::Eof,
        ]
    );
}

#[test]
fn test_lowercase_and_is_an_identifier() {
    assert_eq!(
        kinds("a and b"),
        vec![
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Identifier,
            TokenType::Eof
        ]
    );
}

#[test]
fn test_member_chain() {
    let tokens = tokenize("user?.name").unwrap();
    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    assert_eq!(lexemes, vec!["user", "?.", "name", ""]);
}

// ============================================================================
// Identifiers and positions
// ============================================================================

#[test]
fn test_unicode_identifiers() {
    let tokens = tokenize("straße.größe_2").unwrap();
    assert_eq!(tokens[0].lexeme, "straße");
    assert_eq!(tokens[2].lexeme, "größe_2");
    assert_eq!(tokens[2].kind, TokenType::Identifier);
}

#[test]
fn test_positions_are_character_offsets() {
    let tokens = tokenize("ä + b").unwrap();
    let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![0, 2, 4, 5]);
}

#[test]
fn test_whitespace_is_filtered_for_the_parser() {
    let raw = Tokenizer::new(" a ").count();
    assert_eq!(raw, 4);
    assert_eq!(kinds(" a "), vec![TokenType::Identifier, TokenType::Eof]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_character() {
    let err = tokenize("a # b").unwrap_err();
    assert_eq!(
        err,
        SyntaxError::UnexpectedCharacter {
            character: '#',
            position: 2
        }
    );
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("x == 'abc").unwrap_err();
    assert_eq!(err, SyntaxError::UnterminatedString { position: 5 });
}

#[test]
fn test_tokenizer_stops_after_error() {
    let mut tokenizer = Tokenizer::new("@a");
    assert!(tokenizer.next().unwrap().is_err());
    assert!(tokenizer.next().is_none());
}
