//! The serialization engine.
//!
//! Projects plain objects onto JSON:API resource objects according to a
//! [`SchemaDefinition`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::definition::{RelationshipDefinition, SchemaDefinition, DEFAULT_ID_FIELD};
use crate::document::{Document, OneOrMany, RelationshipEntry, ResourceIdentifier, ResourceObject};
use crate::error::{ConfigurationError, LoadError, SerializeError};
use crate::naming::hyphenate;
use crate::types::{AttributeSource, FieldRef, IdSource, Input};

/// A definition with every default filled in.
#[derive(Debug, Clone)]
pub struct EffectiveDefinition {
    pub kind: Option<String>,
    pub id: IdSource,
    pub attributes: IndexMap<String, AttributeSource>,
    pub relationships: IndexMap<String, RelationshipDefinition>,
}

impl From<SchemaDefinition> for EffectiveDefinition {
    fn from(definition: SchemaDefinition) -> Self {
        Self {
            kind: definition.kind,
            id: definition.id.unwrap_or_else(|| IdSource::named(DEFAULT_ID_FIELD)),
            attributes: definition.attributes.unwrap_or_default(),
            relationships: definition.relationships.unwrap_or_default(),
        }
    }
}

/// Serializes objects into JSON:API documents.
///
/// Built once and reused; serialization never mutates it, so a serializer can
/// be shared across threads.
///
/// By default serialization is permissive: a missing type, id or attribute
/// field is left out of the output. With [`strict`](Self::strict) enabled,
/// [`try_serialize`](Self::try_serialize) reports those instead.
#[derive(Debug, Clone)]
pub struct SchemaSerializer {
    definition: Arc<EffectiveDefinition>,
    strict: bool,
}

impl SchemaSerializer {
    /// Create a serializer from a definition.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDefinition` when `definition` is `None`.
    pub fn new(definition: Option<SchemaDefinition>) -> Result<Self, ConfigurationError> {
        let definition = definition.ok_or(ConfigurationError::MissingDefinition)?;
        let definition = EffectiveDefinition::from(definition);

        tracing::debug!(
            kind = definition.kind.as_deref().unwrap_or("<none>"),
            attributes = definition.attributes.len(),
            relationships = definition.relationships.len(),
            "schema serializer constructed"
        );

        Ok(Self {
            definition: Arc::new(definition),
            strict: false,
        })
    }

    /// Create a serializer from a declarative JSON definition.
    ///
    /// # Errors
    ///
    /// See [`SchemaDefinition::from_json`].
    pub fn from_json(definition: &Value) -> Result<Self, LoadError> {
        let definition = SchemaDefinition::from_json(definition)?;
        Ok(Self::new(Some(definition))?)
    }

    /// Set strict mode for [`try_serialize`](Self::try_serialize).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The definition in effect, defaults included.
    pub fn definition(&self) -> &EffectiveDefinition {
        &self.definition
    }

    /// Serialize one object or a collection of objects.
    ///
    /// A single resulting resource is emitted bare; zero or several are
    /// emitted as an array. Never fails: irregular input yields omitted values.
    pub fn serialize<'a>(&self, input: impl Into<Input<'a>>) -> Document {
        let resources = match input.into() {
            Input::One(obj) => vec![self.serialize_object(obj)],
            Input::Many(objs) => objs.iter().map(|obj| self.serialize_object(obj)).collect(),
        };
        tracing::debug!(resources = resources.len(), "serialized document");
        Document::new(resources)
    }

    /// Serialize, honoring strict mode.
    ///
    /// In permissive mode this is [`serialize`](Self::serialize) and never fails.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first `SerializeError` found: a schema
    /// without type, a resource without id, a named attribute field missing
    /// from the object, or a relationship identifier without id.
    pub fn try_serialize<'a>(&self, input: impl Into<Input<'a>>) -> Result<Document, SerializeError> {
        let input = input.into();
        let document = self.serialize(input);
        if self.strict {
            let objects = match input {
                Input::One(obj) => std::slice::from_ref(obj),
                Input::Many(objs) => objs,
            };
            let resources = document.data.iter();
            for (index, (obj, resource)) in objects.iter().zip(resources).enumerate() {
                self.check(index, obj, resource)?;
            }
        }
        Ok(document)
    }

    /// Serialize any `serde` value, honoring strict mode.
    ///
    /// Values serializing to a JSON array are treated as collections.
    ///
    /// # Errors
    ///
    /// Returns `SerializeError::InvalidInput` when the value cannot be
    /// represented as JSON, otherwise as [`try_serialize`](Self::try_serialize).
    pub fn serialize_typed<T: Serialize + ?Sized>(&self, input: &T) -> Result<Document, SerializeError> {
        let value = serde_json::to_value(input).map_err(|source| SerializeError::InvalidInput { source })?;
        self.try_serialize(&value)
    }

    fn serialize_object(&self, obj: &Value) -> ResourceObject {
        let relationships = if self.definition.relationships.is_empty() {
            None
        } else {
            Some(self.project_relationships(obj))
        };

        ResourceObject {
            kind: self.definition.kind.clone(),
            id: resolve_id(&self.definition.id, obj, None),
            attributes: self.project_attributes(obj),
            relationships,
        }
    }

    fn project_attributes(&self, obj: &Value) -> Map<String, Value> {
        let mut attributes = Map::new();
        for (name, source) in &self.definition.attributes {
            let value = match source {
                FieldRef::Named(field) => obj.get(field).cloned(),
                FieldRef::Computed(f) => Some(f(obj)),
            };
            if let Some(value) = value {
                attributes.insert(hyphenate(name), value);
            }
        }
        attributes
    }

    fn project_relationships(&self, obj: &Value) -> IndexMap<String, RelationshipEntry> {
        self.definition
            .relationships
            .iter()
            .map(|(name, relationship)| {
                let raw = obj.get(name.as_str());
                let mut identifiers: Vec<ResourceIdentifier> = match raw {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|related| identifier(relationship, related, obj))
                        .collect(),
                    None | Some(Value::Null) => Vec::new(),
                    Some(related) => vec![identifier(relationship, related, obj)],
                };

                // Absent related value: a resolver may still derive the id
                // from the parent alone.
                if identifiers.is_empty() && matches!(raw, None | Some(Value::Null)) {
                    let fallback = identifier(relationship, &Value::Null, obj);
                    if fallback.id.is_some() {
                        tracing::trace!(relationship = %name, "id resolved without related value");
                        identifiers.push(fallback);
                    }
                }

                let entry = RelationshipEntry {
                    data: OneOrMany::collapse(identifiers),
                };
                (name.clone(), entry)
            })
            .collect()
    }

    fn check(&self, index: usize, obj: &Value, resource: &ResourceObject) -> Result<(), SerializeError> {
        if resource.kind.is_none() {
            return Err(SerializeError::MissingType);
        }
        if resource.id.is_none() {
            return Err(SerializeError::MissingId { index });
        }
        for (attribute, source) in &self.definition.attributes {
            if let FieldRef::Named(field) = source {
                if obj.get(field).is_none() {
                    return Err(SerializeError::MissingAttribute {
                        index,
                        attribute: attribute.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        for (name, entry) in resource.relationships.iter().flatten() {
            if entry.data.iter().any(|identifier| identifier.id.is_none()) {
                return Err(SerializeError::MissingRelationshipId {
                    index,
                    relationship: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Resolve an id from a field or a computation.
///
/// `parent` is passed through to computed sources and ignored for named
/// fields. A `null` result counts as no id.
pub fn resolve_id(source: &IdSource, obj: &Value, parent: Option<&Value>) -> Option<Value> {
    let id = match source {
        FieldRef::Named(field) => obj.get(field).cloned(),
        FieldRef::Computed(f) => Some(f(obj, parent)),
    };
    id.filter(|id| !id.is_null())
}

fn identifier(relationship: &RelationshipDefinition, related: &Value, parent: &Value) -> ResourceIdentifier {
    ResourceIdentifier {
        kind: relationship.kind.clone(),
        id: resolve_id(&relationship.id, related, Some(parent)),
    }
}
