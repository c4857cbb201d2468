//! Equality and ordering between runtime values.
//!
//! Loose equality (`==`) and ordering coerce scalars the way PHP 8 does:
//! numeric strings compare as numbers, booleans and null compare by
//! truthiness, and `null == ""`. Strict equality (`===`) never coerces.

use std::cmp::Ordering;

use crate::ast::ComparisonOp;
use crate::error::ResolutionError;
use crate::value::{Number, Value, parse_numeric};

/// Apply a comparison operator.
pub fn apply_comparison(
    op: ComparisonOp,
    left: &Value,
    right: &Value,
) -> Result<Value, ResolutionError> {
    let result = match op {
        ComparisonOp::Equal => loose_eq(left, right),
        ComparisonOp::NotEqual => !loose_eq(left, right),
        ComparisonOp::Identical => strict_eq(left, right),
        ComparisonOp::NotIdentical => !strict_eq(left, right),
        ComparisonOp::LessThan => compare(left, right)? == Some(Ordering::Less),
        ComparisonOp::LessEqual => matches!(
            compare(left, right)?,
            Some(Ordering::Less | Ordering::Equal)
        ),
        ComparisonOp::GreaterThan => compare(left, right)? == Some(Ordering::Greater),
        ComparisonOp::GreaterEqual => matches!(
            compare(left, right)?,
            Some(Ordering::Greater | Ordering::Equal)
        ),
    };
    Ok(Value::Boolean(result))
}

/// `==`
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    use Value::*;
    match (left, right) {
        (Null, Null) => true,
        (Null, String(s)) | (String(s), Null) => s.is_empty(),
        (Boolean(b), other) | (other, Boolean(b)) => *b == other.is_truthy(),
        (Null, other) | (other, Null) => !other.is_truthy(),
        (String(a), String(b)) => match (parse_numeric(a), parse_numeric(b)) {
            (Some(x), Some(y)) => numbers_equal(x, y),
            _ => a == b,
        },
        (Array(a), Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Object(a), Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| loose_eq(x, y)))
        }
        (Integer(_) | Float(_), String(s)) => number_string_eq(left, s),
        (String(s), Integer(_) | Float(_)) => number_string_eq(right, s),
        (a, b) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => numbers_equal(x, y),
            _ => a == b,
        },
    }
}

/// `===`
pub fn strict_eq(left: &Value, right: &Value) -> bool {
    use Value::*;
    match (left, right) {
        (Array(a), Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_eq(x, y))
        }
        (Object(a), Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| strict_eq(x, y)))
        }
        (a, b) => a == b,
    }
}

/// Ordering for `< <= > >=`. `Ok(None)` means unordered (NaN).
pub fn compare(left: &Value, right: &Value) -> Result<Option<Ordering>, ResolutionError> {
    use Value::*;
    let ordering: Option<Ordering> = match (left, right) {
        (Null, String(s)) => "".cmp(s.as_str()).into(),
        (String(s), Null) => s.as_str().cmp("").into(),
        (Boolean(_) | Null, _) | (_, Boolean(_) | Null) => {
            left.is_truthy().cmp(&right.is_truthy()).into()
        }
        (String(a), String(b)) => match (parse_numeric(a), parse_numeric(b)) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => a.cmp(b).into(),
        },
        (Integer(_) | Float(_), String(s)) => match (left.as_number(), parse_numeric(s)) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => left.as_string().cmp(s).into(),
        },
        (String(s), Integer(_) | Float(_)) => match (parse_numeric(s), right.as_number()) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => s.cmp(&right.as_string()).into(),
        },
        (Integer(_) | Float(_), Integer(_) | Float(_)) => {
            match (left.as_number(), right.as_number()) {
                (Some(x), Some(y)) => compare_numbers(x, y),
                _ => None,
            }
        }
        (Array(a), Array(b)) => {
            if a.len() != b.len() {
                return Ok(Some(a.len().cmp(&b.len())));
            }
            for (x, y) in a.iter().zip(b) {
                match compare(x, y)? {
                    Some(Ordering::Equal) => continue,
                    other => return Ok(other),
                }
            }
            Some(Ordering::Equal)
        }
        (a, b) => {
            return Err(ResolutionError::Type(format!(
                "Cannot compare {} with {}",
                a.type_name(),
                b.type_name()
            )));
        }
    };
    Ok(ordering)
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Integer(x), Number::Integer(y)) => x == y,
        (x, y) => x.as_f64() == y.as_f64(),
    }
}

fn compare_numbers(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Integer(x), Number::Integer(y)) => Some(x.cmp(&y)),
        (x, y) => x.as_f64().partial_cmp(&y.as_f64()),
    }
}

/// Number against string: numerically when the string is numeric,
/// otherwise by string form.
fn number_string_eq(number: &Value, s: &str) -> bool {
    match (number.as_number(), parse_numeric(s)) {
        (Some(x), Some(y)) => numbers_equal(x, y),
        _ => number.as_string() == s,
    }
}
