//! Core types for schema definitions and serializer input.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Computes an attribute value from the source object.
pub type AttributeFn = dyn Fn(&Value) -> Value + Send + Sync;

/// Computes an id from a value and, for relationships, the owning object.
///
/// The second argument is `None` when resolving a primary resource id.
pub type IdFn = dyn Fn(&Value, Option<&Value>) -> Value + Send + Sync;

/// Where a value comes from: a field of the object or a computation.
pub enum FieldRef<F: ?Sized> {
    /// Read this field from the object.
    Named(String),
    /// Call this function.
    Computed(Arc<F>),
}

/// Source of an attribute value.
pub type AttributeSource = FieldRef<AttributeFn>;

/// Source of a primary or related resource id.
pub type IdSource = FieldRef<IdFn>;

impl<F: ?Sized> FieldRef<F> {
    /// Create a reference to a named field.
    pub fn named(field: impl Into<String>) -> Self {
        FieldRef::Named(field.into())
    }

    /// The field name, if this reads a field.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            FieldRef::Named(name) => Some(name),
            FieldRef::Computed(_) => None,
        }
    }
}

impl FieldRef<AttributeFn> {
    /// Create an attribute source computed from the object.
    pub fn computed(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        FieldRef::Computed(Arc::new(f))
    }
}

impl FieldRef<IdFn> {
    /// Create an id source computed from the value and its optional parent.
    pub fn computed(f: impl Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static) -> Self {
        FieldRef::Computed(Arc::new(f))
    }
}

impl<F: ?Sized> Clone for FieldRef<F> {
    fn clone(&self) -> Self {
        match self {
            FieldRef::Named(name) => FieldRef::Named(name.clone()),
            FieldRef::Computed(f) => FieldRef::Computed(Arc::clone(f)),
        }
    }
}

impl<F: ?Sized> fmt::Debug for FieldRef<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            FieldRef::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<F: ?Sized> From<&str> for FieldRef<F> {
    fn from(field: &str) -> Self {
        FieldRef::Named(field.to_string())
    }
}

impl<F: ?Sized> From<String> for FieldRef<F> {
    fn from(field: String) -> Self {
        FieldRef::Named(field)
    }
}

/// Input to [`SchemaSerializer::serialize`](crate::SchemaSerializer::serialize).
///
/// A JSON array converts to `Many`, any other value to `One`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input<'a> {
    One(&'a Value),
    Many(&'a [Value]),
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Input::Many(items),
            other => Input::One(other),
        }
    }
}

impl<'a> From<&'a [Value]> for Input<'a> {
    fn from(items: &'a [Value]) -> Self {
        Input::Many(items)
    }
}

impl<'a> From<&'a Vec<Value>> for Input<'a> {
    fn from(items: &'a Vec<Value>) -> Self {
        Input::Many(items)
    }
}

/// Returns the JSON type name for messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
