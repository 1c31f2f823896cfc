//! Minimal references used to declare relationships.
//!
//! A reference names its target by exactly one identifier, a guid or a
//! qualifiedName, and carries the save semantic that decides how the edge is
//! merged into the target's existing relationships.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;

/// Type name of glossary terms, the targets of `meanings`.
pub const GLOSSARY_TERM_TYPE: &str = "AtlasGlossaryTerm";

const APPEND_RELATIONSHIPS: &str = "appendRelationshipAttributes";
const REMOVE_RELATIONSHIPS: &str = "removeRelationshipAttributes";

/// Merge policy for a relationship edge at persistence time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveSemantic {
    #[default]
    Replace,
    Append,
    Remove,
}

impl SaveSemantic {
    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueAttributes {
    #[serde(default)]
    pub qualified_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceKey {
    Guid(String),
    QualifiedName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawReference", into = "RawReference")]
pub struct Reference {
    pub type_name: String,
    pub key: ReferenceKey,
    pub semantic: SaveSemantic,
}

impl Reference {
    pub fn by_guid(type_name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key: ReferenceKey::Guid(guid.into()),
            semantic: SaveSemantic::Replace,
        }
    }

    pub fn by_qualified_name(type_name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key: ReferenceKey::QualifiedName(qualified_name.into()),
            semantic: SaveSemantic::Replace,
        }
    }

    pub fn term_by_guid(guid: impl Into<String>) -> Self {
        Self::by_guid(GLOSSARY_TERM_TYPE, guid)
    }

    pub fn term_by_qualified_name(qualified_name: impl Into<String>) -> Self {
        Self::by_qualified_name(GLOSSARY_TERM_TYPE, qualified_name)
    }

    pub fn with_semantic(mut self, semantic: SaveSemantic) -> Self {
        self.semantic = semantic;
        self
    }

    pub fn guid(&self) -> Option<&str> {
        match &self.key {
            ReferenceKey::Guid(guid) => Some(guid),
            ReferenceKey::QualifiedName(_) => None,
        }
    }

    pub fn qualified_name(&self) -> Option<&str> {
        match &self.key {
            ReferenceKey::QualifiedName(qn) => Some(qn),
            ReferenceKey::Guid(_) => None,
        }
    }

    /// The identifying value, whichever kind it is.
    pub fn identity(&self) -> &str {
        match &self.key {
            ReferenceKey::Guid(value) | ReferenceKey::QualifiedName(value) => value,
        }
    }
}

/// Wire shape of a reference. The service may send more (displayText,
/// attributes), which is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReference {
    type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unique_attributes: Option<UniqueAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    semantic: Option<SaveSemantic>,
}

impl TryFrom<RawReference> for Reference {
    type Error = CatalogError;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        let key = match (raw.guid, raw.unique_attributes) {
            (Some(guid), _) if !guid.is_empty() => ReferenceKey::Guid(guid),
            (_, Some(unique)) if !unique.qualified_name.is_empty() => {
                ReferenceKey::QualifiedName(unique.qualified_name)
            }
            _ => return Err(CatalogError::missing_relationship(&raw.type_name, &["guid", "qualifiedName"])),
        };
        Ok(Self {
            type_name: raw.type_name,
            key,
            semantic: raw.semantic.unwrap_or_default(),
        })
    }
}

impl From<Reference> for RawReference {
    fn from(reference: Reference) -> Self {
        let (guid, unique_attributes) = match reference.key {
            ReferenceKey::Guid(guid) => (Some(guid), None),
            ReferenceKey::QualifiedName(qualified_name) => {
                (None, Some(UniqueAttributes { qualified_name }))
            }
        };
        Self {
            type_name: reference.type_name,
            guid,
            unique_attributes,
            semantic: (!reference.semantic.is_replace()).then_some(reference.semantic),
        }
    }
}

/// Move APPEND and REMOVE references out of `attributes` into the
/// `appendRelationshipAttributes` / `removeRelationshipAttributes` sections of
/// an entity payload, stripping the semantic marker as it goes.
pub fn shape_relationships(entity: &mut Value) {
    let Some(attributes) = entity.get_mut("attributes").and_then(Value::as_object_mut) else {
        return;
    };

    let mut append = Map::new();
    let mut remove = Map::new();
    for (key, value) in std::mem::take(attributes) {
        let (keep, appended, removed) = split_by_semantic(value);
        if let Some(value) = keep {
            attributes.insert(key.clone(), value);
        }
        if let Some(value) = appended {
            append.insert(key.clone(), value);
        }
        if let Some(value) = removed {
            remove.insert(key, value);
        }
    }

    if let Some(entity) = entity.as_object_mut() {
        if !append.is_empty() {
            entity.insert(APPEND_RELATIONSHIPS.to_string(), Value::Object(append));
        }
        if !remove.is_empty() {
            entity.insert(REMOVE_RELATIONSHIPS.to_string(), Value::Object(remove));
        }
    }
}

type Split = (Option<Value>, Option<Value>, Option<Value>);

fn split_by_semantic(value: Value) -> Split {
    match value {
        Value::Object(mut reference) => match take_semantic(&mut reference) {
            SaveSemantic::Replace => (Some(Value::Object(reference)), None, None),
            SaveSemantic::Append => (None, Some(Value::Object(reference)), None),
            SaveSemantic::Remove => (None, None, Some(Value::Object(reference))),
        },
        Value::Array(items) if items.iter().any(carries_semantic) => {
            let mut keep = Vec::new();
            let mut append = Vec::new();
            let mut remove = Vec::new();
            for item in items {
                match item {
                    Value::Object(mut reference) => match take_semantic(&mut reference) {
                        SaveSemantic::Replace => keep.push(Value::Object(reference)),
                        SaveSemantic::Append => append.push(Value::Object(reference)),
                        SaveSemantic::Remove => remove.push(Value::Object(reference)),
                    },
                    other => keep.push(other),
                }
            }
            let non_empty = |items: Vec<Value>| (!items.is_empty()).then_some(Value::Array(items));
            (non_empty(keep), non_empty(append), non_empty(remove))
        }
        other => (Some(other), None, None),
    }
}

fn carries_semantic(value: &Value) -> bool {
    value
        .as_object()
        .map_or(false, |object| object.contains_key("typeName") && object.contains_key("semantic"))
}

fn take_semantic(object: &mut Map<String, Value>) -> SaveSemantic {
    if !object.contains_key("typeName") {
        return SaveSemantic::Replace;
    }
    object
        .remove("semantic")
        .and_then(|semantic| serde_json::from_value(semantic).ok())
        .unwrap_or_default()
}
