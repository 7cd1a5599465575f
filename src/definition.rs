//! Schema definitions, in code or as declarative JSON.
//!
//! A definition built in code can use arbitrary closures for ids and
//! attributes. A declarative definition is plain JSON and supports a fixed
//! set of source forms:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `"field"` | Read `field` from the object |
//! | `{"pointer": "/a/b"}` | JSON Pointer into the object |
//! | `{"self": true}` | The value itself |
//! | `{"parent": "field"}` | Read `field` from the owning object (relationships only) |

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::error::{ConfigurationError, DefinitionIssue, LoadError};
use crate::types::{json_type_name, AttributeSource, FieldRef, IdSource};

/// Field read for the primary id when the definition names none.
pub const DEFAULT_ID_FIELD: &str = "id";

/// How to project objects onto resource objects.
///
/// Every field is optional; [`SchemaSerializer`](crate::SchemaSerializer)
/// fills in defaults at construction.
#[derive(Debug, Clone, Default)]
pub struct SchemaDefinition {
    pub kind: Option<String>,
    pub id: Option<IdSource>,
    pub attributes: Option<IndexMap<String, AttributeSource>>,
    pub relationships: Option<IndexMap<String, RelationshipDefinition>>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource type.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set the primary id source.
    pub fn id(mut self, id: impl Into<IdSource>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add an attribute. `name` is the output name before hyphenation.
    pub fn attribute(mut self, name: impl Into<String>, source: impl Into<AttributeSource>) -> Self {
        self.attributes
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), source.into());
        self
    }

    /// Add a relationship read from the field `name`.
    pub fn relationship(mut self, name: impl Into<String>, definition: RelationshipDefinition) -> Self {
        self.relationships
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), definition);
        self
    }

    /// Parse a declarative JSON definition.
    ///
    /// `null` counts as an absent definition. Unknown source forms are
    /// accepted and resolve to nothing; use [`check_definition`] to reject them.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Configuration` for `null`, or
    /// `LoadError::InvalidDefinition` when the structure is not a definition.
    pub fn from_json(value: &Value) -> Result<Self, LoadError> {
        let map = match value {
            Value::Null => return Err(ConfigurationError::MissingDefinition.into()),
            Value::Object(map) => map,
            other => {
                return Err(invalid("", format!("expected object, got {}", json_type_name(other))))
            }
        };

        let mut definition = SchemaDefinition::new();

        match map.get("type") {
            None | Some(Value::Null) => {}
            Some(Value::String(kind)) => definition.kind = Some(kind.clone()),
            Some(other) => {
                tracing::warn!(
                    actual = json_type_name(other),
                    "ignoring non-string resource type"
                );
            }
        }

        match map.get("id") {
            None | Some(Value::Null) => {}
            Some(id) => definition.id = Some(id_source(id, "/id")),
        }

        match map.get("attributes") {
            None | Some(Value::Null) => {}
            Some(attributes) => {
                let attributes = expect_object(attributes, "/attributes")?;
                let mut parsed = IndexMap::with_capacity(attributes.len());
                for (name, source) in attributes {
                    let path = format!("/attributes/{}", escape_pointer(name));
                    parsed.insert(name.clone(), attribute_source(source, &path));
                }
                definition.attributes = Some(parsed);
            }
        }

        match map.get("relationships") {
            None | Some(Value::Null) => {}
            Some(relationships) => {
                let relationships = expect_object(relationships, "/relationships")?;
                let mut parsed = IndexMap::with_capacity(relationships.len());
                for (name, relationship) in relationships {
                    let path = format!("/relationships/{}", escape_pointer(name));
                    parsed.insert(name.clone(), RelationshipDefinition::from_json(relationship, &path)?);
                }
                definition.relationships = Some(parsed);
            }
        }

        Ok(definition)
    }
}

/// A relationship to resources of another type.
#[derive(Debug, Clone)]
pub struct RelationshipDefinition {
    /// Type of the related resources.
    pub kind: String,
    /// Resolves each related resource's id. Computed sources receive the
    /// owning object as their second argument.
    pub id: IdSource,
}

impl RelationshipDefinition {
    pub fn new(kind: impl Into<String>, id: impl Into<IdSource>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    fn from_json(value: &Value, path: &str) -> Result<Self, LoadError> {
        let map = expect_object(value, path)?;
        let kind = match map.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(invalid(
                    &format!("{}/type", path),
                    format!("expected string, got {}", json_type_name(other)),
                ))
            }
            None => return Err(invalid(path, "missing relationship type".to_string())),
        };
        let id = match map.get("id") {
            None | Some(Value::Null) => IdSource::named(DEFAULT_ID_FIELD),
            Some(id) => id_source(id, &format!("{}/id", path)),
        };
        Ok(Self { kind, id })
    }
}

/// Declarative source form shared by ids and attributes.
enum Declared {
    Field(String),
    Pointer(String),
    Itself,
    Parent(String),
    Unknown,
}

fn declared(value: &Value, path: &str) -> Declared {
    match value {
        Value::String(field) => return Declared::Field(field.clone()),
        Value::Object(map) if map.len() == 1 => {
            match (map.get("pointer"), map.get("self"), map.get("parent")) {
                (Some(Value::String(pointer)), _, _) => return Declared::Pointer(pointer.clone()),
                (_, Some(Value::Bool(true)), _) => return Declared::Itself,
                (_, _, Some(Value::String(field))) => return Declared::Parent(field.clone()),
                _ => {}
            }
        }
        _ => {}
    }
    tracing::warn!(path, actual = json_type_name(value), "unrecognized source resolves to nothing");
    Declared::Unknown
}

fn id_source(value: &Value, path: &str) -> IdSource {
    match declared(value, path) {
        Declared::Field(field) => FieldRef::Named(field),
        Declared::Pointer(pointer) => {
            IdSource::computed(move |v, _| v.pointer(&pointer).cloned().unwrap_or(Value::Null))
        }
        Declared::Itself => IdSource::computed(|v, _| v.clone()),
        Declared::Parent(field) => IdSource::computed(move |_, parent| {
            parent
                .and_then(|p| p.get(&field))
                .cloned()
                .unwrap_or(Value::Null)
        }),
        Declared::Unknown => IdSource::computed(|_, _| Value::Null),
    }
}

fn attribute_source(value: &Value, path: &str) -> AttributeSource {
    match declared(value, path) {
        Declared::Field(field) => FieldRef::Named(field),
        Declared::Pointer(pointer) => {
            AttributeSource::computed(move |v| v.pointer(&pointer).cloned().unwrap_or(Value::Null))
        }
        Declared::Itself => AttributeSource::computed(|v| v.clone()),
        Declared::Parent(_) | Declared::Unknown => AttributeSource::computed(|_| Value::Null),
    }
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, LoadError> {
    value.as_object().ok_or_else(|| {
        invalid(path, format!("expected object, got {}", json_type_name(value)))
    })
}

fn invalid(path: &str, message: String) -> LoadError {
    LoadError::InvalidDefinition {
        issues: vec![DefinitionIssue {
            path: path.to_string(),
            message,
        }],
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn definition_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "required": ["type"],
            "additionalProperties": false,
            "properties": {
                "type": { "type": "string", "minLength": 1 },
                "id": { "$ref": "#/$defs/source" },
                "attributes": {
                    "type": "object",
                    "additionalProperties": { "$ref": "#/$defs/source" }
                },
                "relationships": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "object",
                        "required": ["type", "id"],
                        "additionalProperties": false,
                        "properties": {
                            "type": { "type": "string", "minLength": 1 },
                            "id": { "$ref": "#/$defs/source" }
                        }
                    }
                }
            },
            "$defs": {
                "source": {
                    "oneOf": [
                        { "type": "string" },
                        {
                            "type": "object",
                            "required": ["pointer"],
                            "additionalProperties": false,
                            "properties": { "pointer": { "type": "string" } }
                        },
                        {
                            "type": "object",
                            "required": ["self"],
                            "additionalProperties": false,
                            "properties": { "self": { "const": true } }
                        },
                        {
                            "type": "object",
                            "required": ["parent"],
                            "additionalProperties": false,
                            "properties": { "parent": { "type": "string" } }
                        }
                    ]
                }
            }
        })
    })
}

/// Check a declarative definition strictly.
///
/// Unlike [`SchemaDefinition::from_json`], this rejects a missing resource
/// type, relationships without an id source and unrecognized source forms.
/// All issues are collected.
///
/// # Errors
///
/// Returns `LoadError::Configuration` for `null`, or
/// `LoadError::InvalidDefinition` listing every issue.
pub fn check_definition(value: &Value) -> Result<(), LoadError> {
    if value.is_null() {
        return Err(ConfigurationError::MissingDefinition.into());
    }

    let validator = jsonschema::validator_for(definition_schema()).map_err(|e| {
        LoadError::InvalidDefinition {
            issues: vec![DefinitionIssue {
                path: String::new(),
                message: format!("internal definition schema rejected: {}", e),
            }],
        }
    })?;

    let issues: Vec<DefinitionIssue> = validator
        .iter_errors(value)
        .map(|e| DefinitionIssue {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(LoadError::InvalidDefinition { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(source: &IdSource, value: &Value, parent: Option<&Value>) -> Value {
        match source {
            FieldRef::Named(field) => value.get(field).cloned().unwrap_or(Value::Null),
            FieldRef::Computed(f) => f(value, parent),
        }
    }

    #[test]
    fn builder_collects_in_order() {
        let definition = SchemaDefinition::new()
            .kind("articles")
            .attribute("title", "title")
            .attribute("createdAt", "created_at");

        let names: Vec<_> = definition.attributes.unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["title", "createdAt"]);
        assert_eq!(definition.kind.as_deref(), Some("articles"));
        assert!(definition.id.is_none());
    }

    #[test]
    fn from_json_null_is_missing_definition() {
        let result = SchemaDefinition::from_json(&Value::Null);
        assert!(matches!(
            result,
            Err(LoadError::Configuration(ConfigurationError::MissingDefinition))
        ));
    }

    #[test]
    fn from_json_empty_object() {
        let definition = SchemaDefinition::from_json(&json!({})).unwrap();
        assert!(definition.kind.is_none());
        assert!(definition.id.is_none());
        assert!(definition.attributes.is_none());
        assert!(definition.relationships.is_none());
    }

    #[test]
    fn from_json_null_members_use_defaults() {
        let definition = SchemaDefinition::from_json(&json!({
            "type": "objs",
            "id": null,
            "attributes": null,
            "relationships": null
        }))
        .unwrap();
        assert_eq!(definition.kind.as_deref(), Some("objs"));
        assert!(definition.id.is_none());
        assert!(definition.attributes.is_none());
        assert!(definition.relationships.is_none());

        let definition = SchemaDefinition::from_json(&json!({
            "relationships": { "author": { "type": "people", "id": null } }
        }))
        .unwrap();
        assert_eq!(definition.relationships.unwrap()["author"].id.field_name(), Some("id"));
    }

    #[test]
    fn null_id_serializes_with_default_id_field() {
        let serializer =
            crate::SchemaSerializer::from_json(&json!({ "type": "objs", "id": null })).unwrap();
        let document = serializer.serialize(&json!({ "id": "5" })).to_value();
        assert_eq!(document["data"]["id"], json!("5"));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let result = SchemaDefinition::from_json(&json!("objs"));
        match result {
            Err(LoadError::InvalidDefinition { issues }) => {
                assert_eq!(issues[0].path, "");
                assert!(issues[0].message.contains("string"));
            }
            other => panic!("expected InvalidDefinition, got {:?}", other),
        }
    }

    #[test]
    fn from_json_relationship_requires_type() {
        let result = SchemaDefinition::from_json(&json!({
            "relationships": { "author": { "id": "id" } }
        }));
        match result {
            Err(LoadError::InvalidDefinition { issues }) => {
                assert_eq!(issues[0].path, "/relationships/author");
            }
            other => panic!("expected InvalidDefinition, got {:?}", other),
        }
    }

    #[test]
    fn from_json_relationship_id_defaults_to_id_field() {
        let definition = SchemaDefinition::from_json(&json!({
            "relationships": { "author": { "type": "people" } }
        }))
        .unwrap();
        let relationships = definition.relationships.unwrap();
        assert_eq!(relationships["author"].id.field_name(), Some("id"));
    }

    #[test]
    fn declared_sources() {
        let definition = SchemaDefinition::from_json(&json!({
            "type": "objs",
            "id": { "pointer": "/meta/key" },
            "relationships": {
                "tags": { "type": "tags", "id": { "self": true } },
                "owner": { "type": "people", "id": { "parent": "ownerId" } }
            }
        }))
        .unwrap();

        let obj = json!({ "meta": { "key": 42 }, "ownerId": "u1" });
        assert_eq!(resolve(definition.id.as_ref().unwrap(), &obj, None), json!(42));

        let relationships = definition.relationships.unwrap();
        assert_eq!(resolve(&relationships["tags"].id, &json!("red"), Some(&obj)), json!("red"));
        assert_eq!(resolve(&relationships["owner"].id, &Value::Null, Some(&obj)), json!("u1"));
        assert_eq!(resolve(&relationships["owner"].id, &Value::Null, None), Value::Null);
    }

    #[test]
    fn unknown_source_resolves_to_null() {
        let definition = SchemaDefinition::from_json(&json!({ "id": 7 })).unwrap();
        assert_eq!(
            resolve(definition.id.as_ref().unwrap(), &json!({ "7": "x" }), None),
            Value::Null
        );
    }

    #[test]
    fn check_accepts_complete_definition() {
        let value = json!({
            "type": "objs",
            "id": "ID",
            "attributes": { "name": "NaMe", "total": { "pointer": "/stats/total" } },
            "relationships": {
                "mountains": { "type": "mountains", "id": { "self": true } }
            }
        });
        assert!(check_definition(&value).is_ok());
    }

    #[test]
    fn check_collects_every_issue() {
        let value = json!({
            "attributes": { "name": 5 },
            "relationships": { "mountains": { "type": "mountains" } }
        });
        match check_definition(&value) {
            Err(LoadError::InvalidDefinition { issues }) => {
                let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
                assert!(paths.contains(&""), "missing type reported at root: {:?}", paths);
                assert!(paths.contains(&"/attributes/name"));
                assert!(paths.contains(&"/relationships/mountains"));
            }
            other => panic!("expected InvalidDefinition, got {:?}", other),
        }
    }

    #[test]
    fn check_null_is_missing_definition() {
        assert!(matches!(
            check_definition(&Value::Null),
            Err(LoadError::Configuration(_))
        ));
    }

    #[test]
    fn pointer_escaping() {
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
    }
}
