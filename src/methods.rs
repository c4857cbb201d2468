//! Builtin members of lists and strings.
//!
//! Each member can be read like a property (`items.count`) or called
//! (`items.count()`). Callbacks are closures or native functions and
//! receive `(item, index)`.

use std::cmp::Ordering;

use regex::Regex;

use crate::{
    ast::ArithmeticOp,
    compare::{compare, loose_eq, strict_eq},
    error::ResolutionError,
    evaluator::apply_arithmetic,
    value::Value,
};

/// Resolve a list member. `Ok(None)` means there is no such member.
pub(crate) fn list_member(
    items: &[Value],
    name: &str,
    args: Option<&[Value]>,
) -> Result<Option<Value>, ResolutionError> {
    let value = match name {
        "count" => Value::Integer(items.len() as i64),
        "first" => items.first().cloned().unwrap_or(Value::Null),
        "last" => items.last().cloned().unwrap_or(Value::Null),
        "isEmpty" => Value::Boolean(items.is_empty()),
        "isNotEmpty" => Value::Boolean(!items.is_empty()),
        "sum" => list_sum(items)?,
        "avg" => list_avg(items)?,
        "min" => list_extreme(items, Ordering::Less)?,
        "max" => list_extreme(items, Ordering::Greater)?,
        "unique" => list_unique(items),
        "reverse" => Value::Array(items.iter().rev().cloned().collect()),
        "sort" => list_sort(items, args)?,
        "join" => {
            let separator = match args.and_then(|a| a.first()) {
                Some(sep) => sep.as_string(),
                None => String::new(),
            };
            let parts: Vec<String> = items.iter().map(Value::as_string).collect();
            Value::String(parts.join(&separator))
        }
        "contains" => {
            let needle = argument(name, args, 0)?;
            Value::Boolean(items.iter().any(|item| loose_eq(item, needle)))
        }
        "nth" => {
            let index = match argument(name, args, 0)? {
                Value::Integer(n) => *n,
                other => {
                    return Err(ResolutionError::Type(format!(
                        ".nth() requires an integer index, got {}",
                        other.type_name()
                    )));
                }
            };
            index_of(items, index).cloned().unwrap_or(Value::Null)
        }
        "pluck" => {
            let key = argument(name, args, 0)?.as_string();
            Value::Array(items.iter().map(|item| pluck(item, &key)).collect())
        }
        "filter" => {
            let callback = callback(name, args)?;
            let mut result = Vec::new();
            for (index, item) in items.iter().enumerate() {
                if invoke(callback, item, index)?.is_truthy() {
                    result.push(item.clone());
                }
            }
            Value::Array(result)
        }
        "map" => {
            let callback = callback(name, args)?;
            let mut result = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                result.push(invoke(callback, item, index)?);
            }
            Value::Array(result)
        }
        "find" => {
            let callback = callback(name, args)?;
            let mut found = Value::Null;
            for (index, item) in items.iter().enumerate() {
                if invoke(callback, item, index)?.is_truthy() {
                    found = item.clone();
                    break;
                }
            }
            found
        }
        "any" => {
            let callback = callback(name, args)?;
            let mut result = false;
            for (index, item) in items.iter().enumerate() {
                if invoke(callback, item, index)?.is_truthy() {
                    result = true;
                    break;
                }
            }
            Value::Boolean(result)
        }
        "all" => {
            let callback = callback(name, args)?;
            let mut result = true;
            for (index, item) in items.iter().enumerate() {
                if !invoke(callback, item, index)?.is_truthy() {
                    result = false;
                    break;
                }
            }
            Value::Boolean(result)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Resolve a string member. `Ok(None)` means there is no such member.
pub(crate) fn string_member(
    s: &str,
    name: &str,
    args: Option<&[Value]>,
) -> Result<Option<Value>, ResolutionError> {
    let value = match name {
        "length" => Value::Integer(s.chars().count() as i64),
        "upper" => Value::String(s.to_uppercase()),
        "lower" => Value::String(s.to_lowercase()),
        "trim" => Value::String(s.trim().to_string()),
        "split" => {
            let separator = string_argument(name, args, 0)?;
            let parts: Vec<Value> = if separator.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            };
            Value::Array(parts)
        }
        "contains" => Value::Boolean(s.contains(string_argument(name, args, 0)?.as_str())),
        "startsWith" => Value::Boolean(s.starts_with(string_argument(name, args, 0)?.as_str())),
        "endsWith" => Value::Boolean(s.ends_with(string_argument(name, args, 0)?.as_str())),
        "replace" => {
            let from = string_argument(name, args, 0)?;
            let to = string_argument(name, args, 1)?;
            Value::String(s.replace(from.as_str(), to))
        }
        "matches" => {
            let pattern = string_argument(name, args, 0)?;
            let re = Regex::new(pattern).map_err(|e| {
                ResolutionError::Type(format!(".matches() invalid regex pattern: {}", e))
            })?;
            Value::Boolean(re.is_match(s))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Positional lookup; negative indices count from the end.
pub(crate) fn index_of(items: &[Value], index: i64) -> Option<&Value> {
    let position = if index < 0 {
        let from_end = usize::try_from(index.unsigned_abs()).ok()?;
        items.len().checked_sub(from_end)?
    } else {
        usize::try_from(index).ok()?
    };
    items.get(position)
}

fn argument<'a>(
    member: &str,
    args: Option<&'a [Value]>,
    index: usize,
) -> Result<&'a Value, ResolutionError> {
    args.and_then(|a| a.get(index)).ok_or_else(|| {
        ResolutionError::Type(format!(
            ".{}() requires at least {} argument(s)",
            member,
            index + 1
        ))
    })
}

fn string_argument<'a>(
    member: &str,
    args: Option<&'a [Value]>,
    index: usize,
) -> Result<&'a String, ResolutionError> {
    match argument(member, args, index)? {
        Value::String(s) => Ok(s),
        other => Err(ResolutionError::Type(format!(
            ".{}() argument must be string, got {}",
            member,
            other.type_name()
        ))),
    }
}

fn callback<'a>(member: &str, args: Option<&'a [Value]>) -> Result<&'a Value, ResolutionError> {
    let callback = argument(member, args, 0)?;
    if !callback.is_callable() {
        return Err(ResolutionError::Type(format!(
            ".{}() requires a closure, got {}",
            member,
            callback.type_name()
        )));
    }
    Ok(callback)
}

fn invoke(callback: &Value, item: &Value, index: usize) -> Result<Value, ResolutionError> {
    callback.call(&[item.clone(), Value::Integer(index as i64)])
}

fn pluck(item: &Value, key: &str) -> Value {
    match item {
        Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Null),
        Value::Host(host) => host.get(key).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn list_sum(items: &[Value]) -> Result<Value, ResolutionError> {
    items.iter().try_fold(Value::Integer(0), |acc, item| {
        apply_arithmetic(ArithmeticOp::Add, &acc, item)
    })
}

fn list_avg(items: &[Value]) -> Result<Value, ResolutionError> {
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let sum = list_sum(items)?;
    apply_arithmetic(ArithmeticOp::Divide, &sum, &Value::Integer(items.len() as i64))
}

/// Smallest (`Less`) or largest (`Greater`) element, null when empty.
fn list_extreme(items: &[Value], wanted: Ordering) -> Result<Value, ResolutionError> {
    let mut best: Option<&Value> = None;
    for item in items {
        best = match best {
            Some(current) if compare(item, current)? != Some(wanted) => Some(current),
            _ => Some(item),
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn list_unique(items: &[Value]) -> Value {
    let mut result: Vec<Value> = Vec::new();
    for item in items {
        if !result.iter().any(|seen| strict_eq(seen, item)) {
            result.push(item.clone());
        }
    }
    Value::Array(result)
}

/// Ascending sort, optionally by the key a callback extracts.
fn list_sort(items: &[Value], args: Option<&[Value]>) -> Result<Value, ResolutionError> {
    let key_fn = args.and_then(|a| a.first());
    let mut keyed: Vec<(Value, Value)> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let key = match key_fn {
            Some(callback) => invoke(callback, item, index)?,
            None => item.clone(),
        };
        keyed.push((item.clone(), key));
    }

    let mut failure = None;
    keyed.sort_by(|(_, a), (_, b)| match compare(a, b) {
        Ok(ordering) => ordering.unwrap_or(Ordering::Equal),
        Err(e) => {
            failure.get_or_insert(e);
            Ordering::Equal
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    Ok(Value::Array(keyed.into_iter().map(|(item, _)| item).collect()))
}
