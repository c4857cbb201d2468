// tests/host_object_tests.rs

use std::collections::HashMap;

use sprig_lang::error::{AccessKind, Error, ResolutionError};
use sprig_lang::{HostObject, Record, Value, query};

/// A hand-written host type, as an embedding application would provide.
#[derive(Debug)]
struct Page {
    title: String,
    children: Vec<Page>,
    listed: bool,
}

impl Page {
    fn new(title: &str, listed: bool) -> Self {
        Page {
            title: title.to_string(),
            children: Vec::new(),
            listed,
        }
    }
}

impl HostObject for Page {
    fn type_name(&self) -> &str {
        "Page"
    }

    fn get(&self, name: &str) -> Option<Value> {
        match name {
            "title" => Some(Value::from(self.title.as_str())),
            "isListed" => Some(Value::Boolean(self.listed)),
            _ => None,
        }
    }

    fn has_method(&self, name: &str) -> bool {
        matches!(name, "children" | "slug")
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, ResolutionError> {
        match name {
            "children" => Ok(Value::Array(
                self.children
                    .iter()
                    .map(|child| Value::host(Page::new(&child.title, child.listed)))
                    .collect(),
            )),
            "slug" => {
                let separator = args.first().map(Value::as_string).unwrap_or_else(|| "-".to_string());
                Ok(Value::from(
                    self.title.to_lowercase().replace(' ', &separator),
                ))
            }
            _ => Err(ResolutionError::not_found(AccessKind::Method, name, "Page")),
        }
    }
}

fn site() -> Value {
    let mut home = Page::new("Home Page", true);
    home.children = vec![
        Page::new("About Us", true),
        Page::new("Drafts", false),
        Page::new("Contact", true),
    ];
    Value::host(home)
}

fn context(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn resolution_error(query_str: &str, context: Value) -> ResolutionError {
    match query(query_str, context) {
        Err(Error::Resolution(e)) => e,
        other => panic!("Expected resolution error for {:?}, got {:?}", query_str, other),
    }
}

// ============================================================================
// Custom host objects
// ============================================================================

#[test]
fn test_property_read() {
    let ctx = context(vec![("page", site())]);
    assert_eq!(query("page.title", ctx).unwrap(), Value::from("Home Page"));
}

#[test]
fn test_method_without_arguments() {
    let ctx = context(vec![("page", site())]);
    assert_eq!(query("page.slug", ctx.clone()).unwrap(), Value::from("home-page"));
    assert_eq!(query("page.slug()", ctx).unwrap(), Value::from("home-page"));
}

#[test]
fn test_method_with_arguments() {
    let ctx = context(vec![("page", site())]);
    assert_eq!(query("page.slug('_')", ctx).unwrap(), Value::from("home_page"));
}

#[test]
fn test_closure_over_host_children() {
    let ctx = context(vec![("page", site())]);
    assert_eq!(
        query("page.children.filter((child) => child.isListed).count", ctx.clone()).unwrap(),
        Value::Integer(2)
    );
    assert_eq!(
        query("page.children.pluck('title').join(', ')", ctx).unwrap(),
        Value::from("About Us, Drafts, Contact")
    );
}

#[test]
fn test_host_as_root_context() {
    assert_eq!(query("title", site()).unwrap(), Value::from("Home Page"));
    assert_eq!(query("slug", site()).unwrap(), Value::from("home-page"));
    assert_eq!(query("slug('+')", site()).unwrap(), Value::from("home+page"));
}

#[test]
fn test_missing_root_member_names_host_type() {
    let err = resolution_error("author", site());
    assert_eq!(
        err,
        ResolutionError::not_found(AccessKind::Property, "author", "Page")
    );
}

#[test]
fn test_unknown_property() {
    let ctx = context(vec![("page", site())]);
    let err = resolution_error("page.author", ctx);
    assert_eq!(
        err.to_string(),
        "Access to non-existing method/property \"author\" on Page"
    );
}

#[test]
fn test_unknown_method() {
    let ctx = context(vec![("page", site())]);
    let err = resolution_error("page.author(1)", ctx);
    assert_eq!(
        err.to_string(),
        "Access to non-existing method \"author\" on Page"
    );
}

#[test]
fn test_property_called_with_arguments() {
    let ctx = context(vec![("page", site())]);
    let err = resolution_error("page.title(1)", ctx);
    assert_eq!(
        err,
        ResolutionError::not_found(AccessKind::Method, "title", "Page")
    );
}

#[test]
fn test_null_safe_on_host_member() {
    let ctx = context(vec![("page", site())]);
    assert_eq!(
        query("page?.author ?? 'nobody'", ctx).unwrap(),
        Value::from("nobody")
    );
}

// ============================================================================
// Record adapter
// ============================================================================

#[test]
fn test_record_properties_and_methods() {
    let user = Record::new("User")
        .property("name", "Ada")
        .property("age", 36i64)
        .method("hasPermission", |args| {
            Ok(Value::Boolean(args.first() == Some(&Value::from("edit"))))
        });
    let ctx = context(vec![("user", Value::from(user))]);

    assert_eq!(query("user.name", ctx.clone()).unwrap(), Value::from("Ada"));
    assert_eq!(
        query("user.age >= 18 && user.hasPermission('edit')", ctx.clone()).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        query("user.hasPermission('delete')", ctx).unwrap(),
        Value::Boolean(false)
    );
}

#[test]
fn test_record_dynamic_calls() {
    let config = Record::new("Config").dynamic_calls(|name, args| {
        Ok(Value::from(format!("{}:{}", name, args.len())))
    });
    let ctx = context(vec![("config", Value::from(config))]);

    assert_eq!(
        query("config.anything(1, 2)", ctx.clone()).unwrap(),
        Value::from("anything:2")
    );
    assert_eq!(query("config.other", ctx).unwrap(), Value::from("other:0"));
}

#[test]
fn test_dynamic_calls_on_root_context() {
    let config = Value::from(
        Record::new("Config")
            .property("name", "site")
            .dynamic_calls(|name, args| Ok(Value::from(format!("{}:{}", name, args.len())))),
    );

    // A bare name resolves the way `root.name` does
    assert_eq!(query("anything", config.clone()).unwrap(), Value::from("anything:0"));
    assert_eq!(
        query("anything(1, 2)", config.clone()).unwrap(),
        Value::from("anything:2")
    );
    assert_eq!(query("name", config).unwrap(), Value::from("site"));
}

#[test]
fn test_dynamic_properties_on_root_context() {
    let meta = Value::from(Record::new("Meta").dynamic_properties(true));
    assert_eq!(query("unknown", meta.clone()).unwrap(), Value::Null);
    assert_eq!(
        query("unknown(1)", meta).unwrap_err(),
        Error::Resolution(ResolutionError::UnknownFunction("unknown".to_string()))
    );
}

#[test]
fn test_record_dynamic_properties() {
    let meta = Record::new("Meta")
        .property("known", 1i64)
        .dynamic_properties(true);
    let ctx = context(vec![("meta", Value::from(meta))]);

    assert_eq!(query("meta.known", ctx.clone()).unwrap(), Value::Integer(1));
    assert_eq!(query("meta.unknown", ctx.clone()).unwrap(), Value::Null);

    // Dynamic properties do not make arbitrary calls valid
    let err = resolution_error("meta.unknown(1)", ctx);
    assert_eq!(
        err,
        ResolutionError::not_found(AccessKind::Method, "unknown", "Meta")
    );
}

#[test]
fn test_record_method_errors_propagate() {
    let api = Record::new("Api").method("fail", |_| {
        Err(ResolutionError::Host("backend unavailable".to_string()))
    });
    let ctx = context(vec![("api", Value::from(api))]);

    let err = resolution_error("api.fail()", ctx);
    assert_eq!(err.to_string(), "backend unavailable");
}

#[test]
fn test_host_values_are_truthy_and_project_to_null() {
    let record = Value::from(Record::new("Empty"));
    assert!(record.is_truthy());
    assert_eq!(record.type_name(), "Empty");
    assert_eq!(record.to_json(), serde_json::Value::Null);
}
