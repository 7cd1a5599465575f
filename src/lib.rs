//! JSON:API Schema Serializer
//!
//! Projects plain objects onto JSON:API resource objects according to a
//! declarative schema.
//!
//! A schema names the resource type, where the id comes from, which fields
//! become attributes (keys are hyphenated, `createdAt` becomes `created-at`)
//! and which fields hold related resources.
//!
//! # Example
//!
//! ```
//! use jsonapi_schema::{IdSource, RelationshipDefinition, SchemaDefinition, SchemaSerializer};
//! use serde_json::json;
//!
//! let serializer = SchemaSerializer::new(Some(
//!     SchemaDefinition::new()
//!         .kind("objs")
//!         .id("ID")
//!         .attribute("name", "NaMe")
//!         .relationship(
//!             "mountains",
//!             RelationshipDefinition::new("mountains", IdSource::computed(|el, _| el.clone())),
//!         ),
//! ))
//! .unwrap();
//!
//! let document = serializer.serialize(&json!({ "ID": "5", "NaMe": "Hello", "mountains": [3, 7] }));
//!
//! assert_eq!(document.to_value(), json!({
//!     "links": {},
//!     "data": {
//!         "type": "objs",
//!         "id": "5",
//!         "attributes": { "name": "Hello" },
//!         "relationships": {
//!             "mountains": {
//!                 "data": [
//!                     { "type": "mountains", "id": 3 },
//!                     { "type": "mountains", "id": 7 }
//!                 ]
//!             }
//!         }
//!     }
//! }));
//! ```
//!
//! # Cardinality
//!
//! | Resources / identifiers | `data` |
//! |-------------------------|--------|
//! | 0 | `[]` |
//! | 1 | bare object |
//! | 2+ | array |
//!
//! The same rule applies to the top-level `data` and to each relationship.
//!
//! # Declarative definitions
//!
//! Definitions can also be plain JSON, see [`SchemaDefinition::from_json`]:
//! ```json
//! {
//!   "type": "objs",
//!   "id": "ID",
//!   "attributes": { "name": "NaMe" },
//!   "relationships": { "mountains": { "type": "mountains", "id": { "self": true } } }
//! }
//! ```

mod definition;
mod document;
mod error;
mod loader;
mod naming;
mod serializer;
mod types;

pub use definition::{check_definition, RelationshipDefinition, SchemaDefinition, DEFAULT_ID_FIELD};
pub use document::{Document, OneOrMany, RelationshipEntry, ResourceIdentifier, ResourceObject};
pub use error::{ConfigurationError, DefinitionIssue, LoadError, SerializeError};
pub use loader::{is_url, load_definition, load_json, load_json_auto, load_json_str};
pub use naming::hyphenate;
pub use serializer::{resolve_id, EffectiveDefinition, SchemaSerializer};
pub use types::{json_type_name, AttributeFn, AttributeSource, FieldRef, IdFn, IdSource, Input};

#[cfg(feature = "remote")]
pub use loader::load_json_url;
