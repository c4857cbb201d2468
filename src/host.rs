//! Dynamic dispatch on host objects.
//!
//! Queries read properties and call methods by name. Host values expose
//! that capability through [`HostObject`] instead of reflection. [`Record`]
//! is a ready-made implementation for struct-like data.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{AccessKind, ResolutionError};
use crate::value::{Function, Value};

/// Capability interface a host object offers to the evaluator.
///
/// Member resolution for `object.name(args?)`:
///
/// 1. a declared method is called, with or without arguments;
/// 2. with arguments and no such method, dynamic call dispatch is used if
///    the object supports it, otherwise it is a `method` access error;
/// 3. without arguments the property is read; if there is none, dynamic
///    calls are tried, then dynamic properties (which read as null),
///    otherwise it is a `method/property` access error.
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Name used in error messages, e.g. `Page`.
    fn type_name(&self) -> &str;

    /// Read a property.
    fn get(&self, name: &str) -> Option<Value>;

    /// Whether `name` is a declared method.
    fn has_method(&self, _name: &str) -> bool {
        false
    }

    /// Call a method.
    fn call(&self, name: &str, _args: &[Value]) -> Result<Value, ResolutionError> {
        Err(ResolutionError::not_found(
            AccessKind::Method,
            name,
            self.type_name(),
        ))
    }

    /// Whether [`HostObject::call`] accepts any method name.
    fn handles_dynamic_calls(&self) -> bool {
        false
    }

    /// Whether unknown properties read as null instead of failing.
    fn handles_dynamic_properties(&self) -> bool {
        false
    }
}

type Fallback = dyn Fn(&str, &[Value]) -> Result<Value, ResolutionError> + Send + Sync;

/// Struct/record adapter: a named bag of properties and native methods.
///
/// # Examples
///
/// ```
/// use sprig_lang::{query, Record, Value};
/// use std::collections::HashMap;
///
/// let user = Record::new("User")
///     .property("name", "Ada")
///     .method("hasPermission", |args| {
///         Ok(Value::Boolean(args.first() == Some(&Value::from("edit"))))
///     });
///
/// let mut context = HashMap::new();
/// context.insert("user".to_string(), Value::from(user));
///
/// let result = query(r#"user.hasPermission("edit")"#, Value::Object(context)).unwrap();
/// assert_eq!(result, Value::Boolean(true));
/// ```
#[derive(Clone)]
pub struct Record {
    type_name: String,
    properties: HashMap<String, Value>,
    methods: HashMap<String, Function>,
    fallback: Option<Arc<Fallback>>,
    dynamic_properties: bool,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Record {
            type_name: type_name.into(),
            properties: HashMap::new(),
            methods: HashMap::new(),
            fallback: None,
            dynamic_properties: false,
        }
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ResolutionError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.methods.insert(name.clone(), Function::new(name, func));
        self
    }

    /// Accept any method name, routing unknown ones to `handler`.
    pub fn dynamic_calls<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Value, ResolutionError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Read unknown properties as null.
    pub fn dynamic_properties(mut self, enabled: bool) -> Self {
        self.dynamic_properties = enabled;
        self
    }
}

impl HostObject for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, ResolutionError> {
        if let Some(method) = self.methods.get(name) {
            return method.call(args);
        }
        match &self.fallback {
            Some(handler) => handler(name, args),
            None => Err(ResolutionError::not_found(
                AccessKind::Method,
                name,
                &self.type_name,
            )),
        }
    }

    fn handles_dynamic_calls(&self) -> bool {
        self.fallback.is_some()
    }

    fn handles_dynamic_properties(&self) -> bool {
        self.dynamic_properties
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("Record")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .field("methods", &methods)
            .finish_non_exhaustive()
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::host(record)
    }
}
