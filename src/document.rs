//! Output shapes: documents, resource objects and resource identifiers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A value that serializes bare when there is exactly one, as an array otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Collapse a single-element vector into `One`; keep anything else as `Many`.
    pub fn collapse(mut items: Vec<T>) -> Self {
        if items.len() == 1 {
            if let Some(item) = items.pop() {
                return OneOrMany::One(item);
            }
        }
        OneOrMany::Many(items)
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the single item, if collapsed.
    pub fn as_one(&self) -> Option<&T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(_) => None,
        }
    }

    /// Returns the items, if not collapsed.
    pub fn as_many(&self) -> Option<&[T]> {
        match self {
            OneOrMany::One(_) => None,
            OneOrMany::Many(items) => Some(items),
        }
    }

    /// Iterate over all items regardless of shape.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }
}

/// Top-level document produced by a serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Always empty.
    pub links: Map<String, Value>,
    pub data: OneOrMany<ResourceObject>,
}

impl Document {
    pub(crate) fn new(resources: Vec<ResourceObject>) -> Self {
        Self {
            links: Map::new(),
            data: OneOrMany::collapse(resources),
        }
    }

    /// Convert to a `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One serialized domain object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<IndexMap<String, RelationshipEntry>>,
}

/// Linkage of one named relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub data: OneOrMany<ResourceIdentifier>,
}

/// Minimal `{type, id}` reference to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl ResourceIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
        }
    }
}
