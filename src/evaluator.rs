use std::{collections::HashMap, sync::Arc};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use tracing::trace;

use crate::{
    ast::{ArgumentList, ArithmeticOp, LogicalOp, Node},
    compare::apply_comparison,
    entries::Entries,
    error::{AccessKind, ResolutionError},
    host::HostObject,
    methods::{index_of, list_member, string_member},
    value::{Closure, Function, Number, Value},
};

/// Evaluation scope: the data context plus closure parameter bindings.
///
/// Cloning is cheap for the data context, which is shared.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// The data context supplied by the caller
    pub root: Arc<Value>,
    /// Closure parameters bound in this scope
    pub locals: HashMap<String, Value>,
}

impl EvalContext {
    pub fn new(root: Value) -> Self {
        EvalContext {
            root: Arc::new(root),
            locals: HashMap::new(),
        }
    }

    /// A child scope with `names` bound to `args`. The parent is untouched.
    pub fn with_bindings(&self, names: &[String], args: &[Value]) -> Self {
        let mut locals = self.locals.clone();
        for (index, name) in names.iter().enumerate() {
            locals.insert(name.clone(), args.get(index).cloned().unwrap_or(Value::Null));
        }
        EvalContext {
            root: Arc::clone(&self.root),
            locals,
        }
    }
}

/// Tree-walking evaluator.
///
/// Holds no per-query state, so one evaluator (and one parsed tree) can be
/// reused for any number of evaluations.
#[derive(Debug, Clone)]
pub struct Evaluator {
    entries: Arc<Entries>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            entries: Entries::global(),
        }
    }
}

/// What a global call resolved to.
enum Callee {
    Value(Value),
    /// A declared method or dynamic dispatch on the host root
    Host(Arc<dyn HostObject>),
    Entry(Function),
}

impl Evaluator {
    /// An evaluator backed by the process-wide entry registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator backed by a private entry registry.
    pub fn with_entries(entries: Arc<Entries>) -> Self {
        Evaluator { entries }
    }

    /// Evaluates a parsed query against a data context.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprig_lang::{parse, Evaluator, Value};
    ///
    /// let node = parse("price * 2").unwrap();
    /// let context = Value::from(serde_json::json!({"price": 21}));
    ///
    /// let result = Evaluator::new().evaluate(&node, context).unwrap();
    /// assert_eq!(result, Value::Integer(42));
    /// ```
    pub fn evaluate(&self, node: &Node, context: Value) -> Result<Value, ResolutionError> {
        let ctx = EvalContext::new(context);
        self.eval_in(node, &ctx)
    }

    /// Evaluates a node inside an existing scope.
    pub fn eval_in(&self, node: &Node, ctx: &EvalContext) -> Result<Value, ResolutionError> {
        trace!(?node, "evaluating");
        match node {
            Node::Literal(literal) => Ok(Value::from(literal)),
            Node::Variable(name) => self.resolve_variable(name, ctx),
            Node::MemberAccess { .. } => Ok(self.eval_chain(node, ctx)?.unwrap_or(Value::Null)),
            Node::ArrayList(elements) => {
                let mut arr = Vec::with_capacity(elements.len());
                for element in elements {
                    arr.push(self.eval_in(element, ctx)?);
                }
                Ok(Value::Array(arr))
            }
            Node::Arithmetic { left, op, right } => {
                let left_val = self.eval_in(left, ctx)?;
                let right_val = self.eval_in(right, ctx)?;
                apply_arithmetic(*op, &left_val, &right_val)
            }
            Node::Comparison { left, op, right } => {
                let left_val = self.eval_in(left, ctx)?;
                let right_val = self.eval_in(right, ctx)?;
                apply_comparison(*op, &left_val, &right_val)
            }
            Node::Logical { left, op, right } => {
                let left_truthy = self.eval_in(left, ctx)?.is_truthy();
                let result = match op {
                    LogicalOp::And => left_truthy && self.eval_in(right, ctx)?.is_truthy(),
                    LogicalOp::Or => left_truthy || self.eval_in(right, ctx)?.is_truthy(),
                };
                Ok(Value::Boolean(result))
            }
            Node::Coalesce { left, right } => {
                let left_val = self.eval_in(left, ctx)?;
                if left_val.is_null() {
                    self.eval_in(right, ctx)
                } else {
                    Ok(left_val)
                }
            }
            Node::Ternary {
                condition,
                if_true,
                if_false,
            } => {
                let condition_val = self.eval_in(condition, ctx)?;
                if !condition_val.is_truthy() {
                    return self.eval_in(if_false, ctx);
                }
                match if_true {
                    Some(branch) => self.eval_in(branch, ctx),
                    None => Ok(condition_val),
                }
            }
            Node::Closure(closure) => Ok(Value::Closure(Closure::new(
                &closure.params,
                Arc::clone(&closure.body),
                ctx.clone(),
                Arc::clone(&self.entries),
            ))),
            Node::GlobalFunction { name, arguments } => self.call_global(name, arguments, ctx),
        }
    }

    /// Evaluates a member chain. `None` means a null-safe link
    /// short-circuited; nothing after it was evaluated.
    fn eval_chain(&self, node: &Node, ctx: &EvalContext) -> Result<Option<Value>, ResolutionError> {
        let Node::MemberAccess {
            object,
            member,
            arguments,
            null_safe,
        } = node
        else {
            return self.eval_in(node, ctx).map(Some);
        };

        let base = match object.as_ref() {
            // A missing root behind `?.` short-circuits like null
            Node::Variable(name) if *null_safe => self.lookup_variable(name, ctx)?,
            _ => self.eval_chain(object, ctx)?,
        };
        let Some(base) = base else {
            return Ok(None);
        };
        if *null_safe && base.is_null() {
            return Ok(None);
        }

        let key = self.eval_in(member, ctx)?;
        let args = match arguments {
            Some(arguments) => Some(self.eval_arguments(arguments, ctx)?),
            None => None,
        };
        self.access(&base, &key, args, *null_safe)
    }

    fn eval_arguments(
        &self,
        arguments: &ArgumentList,
        ctx: &EvalContext,
    ) -> Result<Vec<Value>, ResolutionError> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments.iter() {
            values.push(self.eval_in(argument, ctx)?);
        }
        Ok(values)
    }

    fn resolve_variable(&self, name: &str, ctx: &EvalContext) -> Result<Value, ResolutionError> {
        self.lookup_variable(name, ctx)?.ok_or_else(|| {
            ResolutionError::not_found(AccessKind::Property, name, ctx.root.type_name())
        })
    }

    /// Locals, then the data context, then registered entries, then the
    /// dynamic fallbacks of a host root. `None` when nothing answers.
    fn lookup_variable(
        &self,
        name: &str,
        ctx: &EvalContext,
    ) -> Result<Option<Value>, ResolutionError> {
        if let Some(value) = ctx.locals.get(name) {
            return Ok(Some(value.clone()));
        }

        match ctx.root.as_ref() {
            Value::Object(map) => {
                if let Some(value) = map.get(name) {
                    return read_stored(value).map(Some);
                }
            }
            Value::Host(host) => {
                if host.has_method(name) {
                    return host.call(name, &[]).map(Some);
                }
                if let Some(value) = host.get(name) {
                    return Ok(Some(value));
                }
            }
            _ => {}
        }

        if let Some(entry) = self.entries.get(name) {
            return entry.call(&[]).map(Some);
        }

        match ctx.root.as_ref() {
            Value::Host(host) if host.handles_dynamic_calls() => host.call(name, &[]).map(Some),
            Value::Host(host) if host.handles_dynamic_properties() => Ok(Some(Value::Null)),
            _ => Ok(None),
        }
    }

    /// `name(args)`: a callable in scope wins over a registered entry.
    fn call_global(
        &self,
        name: &str,
        arguments: &ArgumentList,
        ctx: &EvalContext,
    ) -> Result<Value, ResolutionError> {
        let Some(callee) = self.find_callee(name, ctx) else {
            return Err(ResolutionError::UnknownFunction(name.to_string()));
        };

        let args = self.eval_arguments(arguments, ctx)?;
        match callee {
            Callee::Value(value) => value.call(&args),
            Callee::Host(host) => host.call(name, &args),
            Callee::Entry(entry) => entry.call(&args),
        }
    }

    fn find_callee(&self, name: &str, ctx: &EvalContext) -> Option<Callee> {
        if let Some(value) = ctx.locals.get(name) {
            return Some(Callee::Value(value.clone()));
        }

        match ctx.root.as_ref() {
            Value::Object(map) => {
                if let Some(value) = map.get(name) {
                    return Some(Callee::Value(value.clone()));
                }
            }
            Value::Host(host) => {
                if host.has_method(name) {
                    return Some(Callee::Host(Arc::clone(host)));
                }
                if let Some(value) = host.get(name) {
                    return Some(Callee::Value(value));
                }
            }
            _ => {}
        }

        if let Some(entry) = self.entries.get(name) {
            return Some(Callee::Entry(entry));
        }

        match ctx.root.as_ref() {
            Value::Host(host) if host.handles_dynamic_calls() => {
                Some(Callee::Host(Arc::clone(host)))
            }
            _ => None,
        }
    }

    /// Resolve `key` on `base`. `Ok(None)` only for a null-safe link whose
    /// member does not exist.
    fn access(
        &self,
        base: &Value,
        key: &Value,
        args: Option<Vec<Value>>,
        null_safe: bool,
    ) -> Result<Option<Value>, ResolutionError> {
        let name = key.as_string();
        let has_args = args.is_some();
        let missing = |kind: AccessKind| -> Result<Option<Value>, ResolutionError> {
            if null_safe {
                Ok(None)
            } else {
                Err(ResolutionError::not_found(kind, name.as_str(), base.type_name()))
            }
        };

        match base {
            Value::Object(map) => match map.get(&name) {
                Some(item) => invoke_member(item, &name, base, args).map(Some),
                None => missing(AccessKind::for_arguments(has_args, AccessKind::Property)),
            },
            Value::Array(items) => {
                if let Value::Integer(index) = key {
                    if has_args {
                        return Err(ResolutionError::ArgumentsNotAccepted {
                            name: name.clone(),
                            on: base.type_name().to_string(),
                        });
                    }
                    return match index_of(items, *index) {
                        Some(item) => Ok(Some(item.clone())),
                        None => missing(AccessKind::Property),
                    };
                }
                match list_member(items, &name, args.as_deref())? {
                    Some(value) => Ok(Some(value)),
                    None => missing(AccessKind::for_arguments(
                        has_args,
                        AccessKind::MethodOrProperty,
                    )),
                }
            }
            Value::String(s) => match string_member(s, &name, args.as_deref())? {
                Some(value) => Ok(Some(value)),
                None => missing(AccessKind::for_arguments(
                    has_args,
                    AccessKind::MethodOrProperty,
                )),
            },
            Value::Host(host) => {
                if host.has_method(&name) {
                    return host.call(&name, args.as_deref().unwrap_or(&[])).map(Some);
                }
                if let Some(args) = &args {
                    if host.handles_dynamic_calls() {
                        return host.call(&name, args).map(Some);
                    }
                    return missing(AccessKind::Method);
                }
                if let Some(value) = host.get(&name) {
                    return Ok(Some(value));
                }
                if host.handles_dynamic_calls() {
                    return host.call(&name, &[]).map(Some);
                }
                if host.handles_dynamic_properties() {
                    return Ok(Some(Value::Null));
                }
                missing(AccessKind::MethodOrProperty)
            }
            _ => Err(ResolutionError::not_found(
                AccessKind::for_arguments(has_args, AccessKind::MethodOrProperty),
                name.as_str(),
                base.type_name(),
            )),
        }
    }
}

/// A stored native function is invoked on plain reads; everything else is
/// returned as is.
fn read_stored(value: &Value) -> Result<Value, ResolutionError> {
    match value {
        Value::Function(function) => function.call(&[]),
        other => Ok(other.clone()),
    }
}

/// Read or call a mapping element.
fn invoke_member(
    item: &Value,
    name: &str,
    base: &Value,
    args: Option<Vec<Value>>,
) -> Result<Value, ResolutionError> {
    match args {
        Some(args) if item.is_callable() => item.call(&args),
        Some(_) => Err(ResolutionError::ArgumentsNotAccepted {
            name: name.to_string(),
            on: base.type_name().to_string(),
        }),
        None => read_stored(item),
    }
}

/// Numeric view of an arithmetic operand: booleans and null count as
/// integers, numeric strings as their number.
fn operand(value: &Value) -> Option<Number> {
    match value {
        Value::Null => Some(Number::Integer(0)),
        Value::Boolean(b) => Some(Number::Integer(i64::from(*b))),
        other => other.as_number(),
    }
}

/// Apply an arithmetic operator.
///
/// Integer operations stay integers (promoting to float on overflow or an
/// inexact division). Anything involving a float goes through `Decimal`
/// so `0.1 + 0.2` yields `0.3`.
pub(crate) fn apply_arithmetic(
    op: ArithmeticOp,
    left: &Value,
    right: &Value,
) -> Result<Value, ResolutionError> {
    let (Some(a), Some(b)) = (operand(left), operand(right)) else {
        return Err(ResolutionError::Type(format!(
            "Unsupported operand types: {} {} {}",
            left.type_name(),
            op,
            right.type_name()
        )));
    };

    match (a, b) {
        (Number::Integer(a), Number::Integer(b)) => integer_arithmetic(op, a, b),
        (a, b) => float_arithmetic(op, a.as_f64(), b.as_f64()),
    }
}

fn integer_arithmetic(op: ArithmeticOp, a: i64, b: i64) -> Result<Value, ResolutionError> {
    let (a_f, b_f) = (a as f64, b as f64);
    let result = match op {
        ArithmeticOp::Add => a
            .checked_add(b)
            .map_or(Value::Float(a_f + b_f), Value::Integer),
        ArithmeticOp::Subtract => a
            .checked_sub(b)
            .map_or(Value::Float(a_f - b_f), Value::Integer),
        ArithmeticOp::Multiply => a
            .checked_mul(b)
            .map_or(Value::Float(a_f * b_f), Value::Integer),
        ArithmeticOp::Divide => {
            if b == 0 {
                return Err(ResolutionError::DivisionByZero);
            }
            // Exact division stays an integer
            match (a.checked_rem(b), a.checked_div(b)) {
                (Some(0), Some(quotient)) => Value::Integer(quotient),
                _ => Value::Float(a_f / b_f),
            }
        }
        ArithmeticOp::Modulo => {
            if b == 0 {
                return Err(ResolutionError::DivisionByZero);
            }
            Value::Integer(a.checked_rem(b).unwrap_or(0))
        }
    };
    Ok(result)
}

fn float_arithmetic(op: ArithmeticOp, a: f64, b: f64) -> Result<Value, ResolutionError> {
    if matches!(op, ArithmeticOp::Divide | ArithmeticOp::Modulo) && b == 0.0 {
        return Err(ResolutionError::DivisionByZero);
    }

    let exact = Decimal::from_f64(a)
        .zip(Decimal::from_f64(b))
        .and_then(|(ad, bd)| match op {
            ArithmeticOp::Add => ad.checked_add(bd),
            ArithmeticOp::Subtract => ad.checked_sub(bd),
            ArithmeticOp::Multiply => ad.checked_mul(bd),
            ArithmeticOp::Divide => ad.checked_div(bd),
            ArithmeticOp::Modulo => ad.checked_rem(bd),
        })
        .and_then(|rd| rd.to_f64());

    let result = exact.unwrap_or(match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Subtract => a - b,
        ArithmeticOp::Multiply => a * b,
        ArithmeticOp::Divide => a / b,
        ArithmeticOp::Modulo => a % b,
    });
    Ok(Value::Float(result))
}
