// tests/comparison_tests.rs
//
// Fixed coercion table for `==`, `===` and ordering between scalar pairs.

use std::cmp::Ordering;

use serde_json::json;
use sprig_lang::compare::{compare, loose_eq, strict_eq};
use sprig_lang::error::{Error, ResolutionError};
use sprig_lang::{Value, query};

fn scalars() -> Vec<(&'static str, Value)> {
    vec![
        ("null", Value::Null),
        ("true", Value::Boolean(true)),
        ("false", Value::Boolean(false)),
        ("0", Value::Integer(0)),
        ("1", Value::Integer(1)),
        ("-1", Value::Integer(-1)),
        ("0.0", Value::Float(0.0)),
        ("1.5", Value::Float(1.5)),
        ("\"\"", Value::from("")),
        ("\"0\"", Value::from("0")),
        ("\"1\"", Value::from("1")),
        ("\"1.0\"", Value::from("1.0")),
        ("\"abc\"", Value::from("abc")),
        ("\"1.5\"", Value::from("1.5")),
    ]
}

/// Unordered pairs of distinct scalars that are loosely equal.
const LOOSE_EQUAL: &[(&str, &str)] = &[
    ("null", "false"),
    ("null", "0"),
    ("null", "0.0"),
    ("null", "\"\""),
    ("true", "1"),
    ("true", "-1"),
    ("true", "1.5"),
    ("true", "\"1\""),
    ("true", "\"1.0\""),
    ("true", "\"abc\""),
    ("true", "\"1.5\""),
    ("false", "0"),
    ("false", "0.0"),
    ("false", "\"\""),
    ("false", "\"0\""),
    ("0", "0.0"),
    ("0", "\"0\""),
    ("1", "\"1\""),
    ("1", "\"1.0\""),
    ("0.0", "\"0\""),
    ("1.5", "\"1.5\""),
    ("\"1\"", "\"1.0\""),
];

fn expected_loose(a: &str, b: &str) -> bool {
    a == b
        || LOOSE_EQUAL
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

fn eval(query_str: &str) -> Value {
    query(query_str, Value::from(json!({}))).unwrap_or_else(|e| panic!("{}: {}", query_str, e))
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_loose_equality_table() {
    let values = scalars();
    for (left_label, left) in &values {
        for (right_label, right) in &values {
            assert_eq!(
                loose_eq(left, right),
                expected_loose(left_label, right_label),
                "{} == {}",
                left_label,
                right_label
            );
        }
    }
}

#[test]
fn test_strict_equality_table() {
    let values = scalars();
    for (left_label, left) in &values {
        for (right_label, right) in &values {
            assert_eq!(
                strict_eq(left, right),
                left_label == right_label,
                "{} === {}",
                left_label,
                right_label
            );
        }
    }
}

#[test]
fn test_operators_match_the_table() {
    assert_eq!(eval("1 == '1.0'"), Value::Boolean(true));
    assert_eq!(eval("1 === '1'"), Value::Boolean(false));
    assert_eq!(eval("1 !== 1.0"), Value::Boolean(true));
    assert_eq!(eval("null != ''"), Value::Boolean(false));
    assert_eq!(eval("0 == 'abc'"), Value::Boolean(false));
}

#[test]
fn test_collections() {
    assert_eq!(eval("[1, '2'] == ['1', 2]"), Value::Boolean(true));
    assert_eq!(eval("[1, '2'] === ['1', 2]"), Value::Boolean(false));
    assert_eq!(eval("[1, 2] === [1, 2]"), Value::Boolean(true));
    assert_eq!(eval("[1] == [1, 1]"), Value::Boolean(false));

    let a = Value::from(json!({"x": 1, "y": "2"}));
    let b = Value::from(json!({"y": 2, "x": "1"}));
    assert!(loose_eq(&a, &b));
    assert!(!strict_eq(&a, &b));
}

#[test]
fn test_callables_compare_by_identity() {
    let f = Value::function("f", |_| Ok(Value::Null));
    let g = Value::function("f", |_| Ok(Value::Null));
    assert!(loose_eq(&f, &f.clone()));
    assert!(!loose_eq(&f, &g));
    assert!(strict_eq(&f, &f.clone()));
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_numeric_ordering() {
    assert_eq!(eval("1 < 1.5"), Value::Boolean(true));
    assert_eq!(eval("'10' > '9'"), Value::Boolean(true));
    assert_eq!(eval("10 >= '10.0'"), Value::Boolean(true));
    assert_eq!(eval("-1 <= -1"), Value::Boolean(true));
}

#[test]
fn test_string_ordering() {
    assert_eq!(eval("'abc' < 'abd'"), Value::Boolean(true));
    assert_eq!(eval("'abc' > 1"), Value::Boolean(true));
    assert_eq!(eval("null < 'a'"), Value::Boolean(true));
    assert_eq!(eval("null < ''"), Value::Boolean(false));
}

#[test]
fn test_boolean_and_null_ordering() {
    assert_eq!(eval("true > false"), Value::Boolean(true));
    assert_eq!(eval("null < 1"), Value::Boolean(true));
    assert_eq!(eval("null >= 0"), Value::Boolean(true));
    assert_eq!(eval("false < -1"), Value::Boolean(true));
}

#[test]
fn test_array_ordering() {
    assert_eq!(eval("[1, 2] < [1, 3]"), Value::Boolean(true));
    assert_eq!(eval("[1, 2, 3] > [9]"), Value::Boolean(true));
    assert_eq!(
        compare(&Value::from(json!([1, 2])), &Value::from(json!([1, 2]))).unwrap(),
        Some(Ordering::Equal)
    );
}

#[test]
fn test_nan_never_compares() {
    let nan = Value::Float(f64::NAN);
    assert_eq!(compare(&nan, &Value::Float(1.0)).unwrap(), None);
    assert!(!loose_eq(&nan, &Value::Float(f64::NAN)));
}

#[test]
fn test_incomparable_pair() {
    let err = query("obj < 1", Value::from(json!({"obj": {"a": 1}}))).unwrap_err();
    assert_eq!(
        err,
        Error::Resolution(ResolutionError::Type(
            "Cannot compare object with integer".to_string()
        ))
    );
}
