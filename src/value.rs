use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::ast::{Literal, Node};
use crate::entries::Entries;
use crate::error::ResolutionError;
use crate::evaluator::{EvalContext, Evaluator};
use crate::host::HostObject;

/// A runtime value: data context content and evaluation results.
///
/// Data variants mirror JSON with integers kept apart from floats. On top
/// of that a value can be a host object with its own properties and
/// methods, a closure created by the query, or a native host function.
///
/// # Examples
///
/// ```
/// use sprig_lang::Value;
/// use std::collections::HashMap;
///
/// let integer = Value::Integer(42);
/// let string = Value::from("hello");
/// let array = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
///
/// let mut obj = HashMap::new();
/// obj.insert("key".to_string(), Value::from("value"));
/// let object = Value::Object(obj);
///
/// assert!(object.is_truthy());
/// assert!(!Value::from("0").is_truthy());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Null, also the result of a short-circuited null-safe chain
    Null,

    Boolean(bool),

    Integer(i64),

    Float(f64),

    /// UTF-8 string
    String(String),

    /// Ordered list
    Array(Vec<Value>),

    /// Mapping with string keys
    Object(HashMap<String, Value>),

    /// Host object resolved through [`HostObject`]
    Host(Arc<dyn HostObject>),

    /// Closure created by a `(params) => body` expression
    Closure(Closure),

    /// Native callable supplied by the host
    Function(Function),
}

impl Value {
    /// Wrap a host object.
    pub fn host(object: impl HostObject + 'static) -> Self {
        Value::Host(Arc::new(object))
    }

    /// Wrap a native function.
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ResolutionError> + Send + Sync + 'static,
    {
        Value::Function(Function::new(name, func))
    }

    /// Human-readable type name used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Host(host) => host.type_name(),
            Value::Closure(_) => "closure",
            Value::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Function(_))
    }

    /// Truthiness for conditions, ternaries and logical operators.
    ///
    /// `null`, `false`, `0`, `0.0`, `""`, `"0"` and empty collections are
    /// falsy. Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty() && s != "0",
            Value::Array(arr) => !arr.is_empty(),
            Value::Object(obj) => !obj.is_empty(),
            Value::Host(_) | Value::Closure(_) | Value::Function(_) => true,
        }
    }

    /// String conversion used by comparisons and string helpers
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(true) => "1".to_string(),
            Value::Boolean(false) => String::new(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => "Array".to_string(),
            other => other.type_name().to_string(),
        }
    }

    /// Numeric view of integers, floats and numeric strings
    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Value::Integer(n) => Some(Number::Integer(*n)),
            Value::Float(n) => Some(Number::Float(*n)),
            Value::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// Invoke a closure or native function.
    pub fn call(&self, args: &[Value]) -> Result<Value, ResolutionError> {
        match self {
            Value::Closure(closure) => closure.call(args),
            Value::Function(function) => function.call(args),
            other => Err(ResolutionError::NotCallable {
                on: other.type_name().to_string(),
            }),
        }
    }

    /// Project onto JSON. Closures, functions and host objects become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Host(_) | Value::Closure(_) | Value::Function(_) => serde_json::Value::Null,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality for data, identity for hosts and callables.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Host(a), Value::Host(b)) => Arc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Arc::ptr_eq(&a.body, &b.body),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(&a.func, &b.func),
            _ => false,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

/// A closure value: parameter names, the body and the scope it was
/// created in. Calling it binds the parameters in a child of that scope.
#[derive(Clone)]
pub struct Closure {
    params: Arc<[String]>,
    body: Arc<Node>,
    scope: EvalContext,
    entries: Arc<Entries>,
}

impl Closure {
    pub(crate) fn new(
        params: &[String],
        body: Arc<Node>,
        scope: EvalContext,
        entries: Arc<Entries>,
    ) -> Self {
        Closure {
            params: params.into(),
            body,
            scope,
            entries,
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Evaluate the body with `args` bound to the parameters. Missing
    /// arguments bind to null, extra ones are ignored.
    pub fn call(&self, args: &[Value]) -> Result<Value, ResolutionError> {
        let scope = self.scope.with_bindings(&self.params, args);
        Evaluator::with_entries(Arc::clone(&self.entries)).eval_in(&self.body, &scope)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, ResolutionError> + Send + Sync;

/// Named native callable.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ResolutionError> + Send + Sync + 'static,
    {
        Function {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, ResolutionError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(n) => n,
        }
    }
}

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?\s*$")
        .expect("numeric string pattern is a valid regular expression")
});

/// Parse a numeric string (`"42"`, `" 1.5 "`, `"1e3"`).
pub(crate) fn parse_numeric(s: &str) -> Option<Number> {
    if !NUMERIC.is_match(s) {
        return None;
    }
    let trimmed = s.trim();
    if !trimmed.contains(['.', 'e', 'E'])
        && let Ok(n) = trimmed.parse::<i64>()
    {
        return Some(Number::Integer(n));
    }
    trimmed.parse::<f64>().ok().map(Number::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(Value::from("0.0").is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(Value::function("f", |_| Ok(Value::Null)).is_truthy());
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("42"), Some(Number::Integer(42)));
        assert_eq!(parse_numeric(" -7 "), Some(Number::Integer(-7)));
        assert_eq!(parse_numeric("1.5"), Some(Number::Float(1.5)));
        assert_eq!(parse_numeric("1e3"), Some(Number::Float(1000.0)));
        assert_eq!(parse_numeric(".5"), Some(Number::Float(0.5)));
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("12abc"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_json_round_trip_of_nested_document() {
        let json = serde_json::json!({"user": {"name": "Ada", "tags": [1, 2.5, null, true]}});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_as_string() {
        assert_eq!(Value::Boolean(true).as_string(), "1");
        assert_eq!(Value::Boolean(false).as_string(), "");
        assert_eq!(Value::Float(2.0).as_string(), "2");
        assert_eq!(Value::Float(0.5).as_string(), "0.5");
    }
}
