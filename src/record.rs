//! `AssetRecord`: any entity the service can hand back, tagged by kind.
//!
//! Decoding dispatches on `typeName`; types without a dedicated kind land in
//! `Other` with their attributes kept as raw JSON. Callers recover a concrete
//! kind by pattern matching or through `AssetRecord::into_asset`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::asset::{Asset, AssetKind, EntityStatus};
use crate::error::{CatalogError, Result};
use crate::model::{
    AirflowDagAttributes, AirflowTaskAttributes, ConnectionAttributes, DatabaseAttributes,
    DbtTagAttributes, GenericAsset, PowerBIPageAttributes, PowerBIReportAttributes,
    PowerBIWorkspaceAttributes, ProcessAttributes, SchemaAttributes, TableAttributes,
};

/// Borrowed identity of a record, whatever its kind.
struct Header<'a> {
    type_name: &'a str,
    guid: Option<&'a str>,
    qualified_name: Option<&'a str>,
    name: Option<&'a str>,
    status: Option<EntityStatus>,
}

impl<'a> Header<'a> {
    fn of<K>(asset: &'a Asset<K>) -> Self {
        Self {
            type_name: &asset.type_name,
            guid: asset.guid.as_deref(),
            qualified_name: asset.attributes.qualified_name.as_deref(),
            name: asset.attributes.name.as_deref(),
            status: asset.status,
        }
    }
}

/// The service returns relationships in a separate `relationshipAttributes`
/// object; kinds model them as ordinary attributes. Null and empty entries are
/// skipped, and a value already present under `attributes` wins.
fn merge_relationship_attributes(entity: &mut Value) {
    let Some(object) = entity.as_object_mut() else {
        return;
    };
    let Some(Value::Object(relationships)) = object.remove("relationshipAttributes") else {
        return;
    };
    let attributes = object
        .entry("attributes")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(attributes) = attributes.as_object_mut() else {
        return;
    };
    for (key, value) in relationships {
        let empty = match &value {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if empty || attributes.get(&key).is_some_and(|existing| !existing.is_null()) {
            continue;
        }
        attributes.insert(key, value);
    }
}

// Variant names must equal the kind's TYPE_NAME; the derive relies on it.
macro_rules! asset_records {
    ($($variant:ident => $kind:ty),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum AssetRecord {
            $($variant(Asset<$kind>),)*
            Other(GenericAsset),
        }

        impl AssetRecord {
            fn header(&self) -> Header<'_> {
                match self {
                    $(Self::$variant(asset) => Header::of(asset),)*
                    Self::Other(asset) => Header::of(asset),
                }
            }

            /// Decode an entity JSON object by its `typeName`.
            pub fn from_value(mut value: Value) -> Result<Self> {
                merge_relationship_attributes(&mut value);
                let type_name = value
                    .get("typeName")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| CatalogError::InvalidRequest("entity without typeName".into()))?;
                $(
                    if type_name == <$kind as AssetKind>::TYPE_NAME {
                        return Ok(Self::$variant(serde_json::from_value(value)?));
                    }
                )*
                Ok(Self::Other(serde_json::from_value(value)?))
            }

            pub fn to_value(&self) -> Result<Value> {
                let value = match self {
                    $(Self::$variant(asset) => serde_json::to_value(asset)?,)*
                    Self::Other(asset) => serde_json::to_value(asset)?,
                };
                Ok(value)
            }
        }
    };
}

asset_records! {
    AirflowDag => AirflowDagAttributes,
    AirflowTask => AirflowTaskAttributes,
    Connection => ConnectionAttributes,
    Database => DatabaseAttributes,
    Schema => SchemaAttributes,
    Table => TableAttributes,
    PowerBIWorkspace => PowerBIWorkspaceAttributes,
    PowerBIReport => PowerBIReportAttributes,
    PowerBIPage => PowerBIPageAttributes,
    DbtTag => DbtTagAttributes,
    Process => ProcessAttributes,
}

impl AssetRecord {
    pub fn type_name(&self) -> &str {
        self.header().type_name
    }

    pub fn guid(&self) -> Option<&str> {
        self.header().guid
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.header().qualified_name
    }

    pub fn name(&self) -> Option<&str> {
        self.header().name
    }

    pub fn status(&self) -> Option<EntityStatus> {
        self.header().status
    }

    pub fn is_archived(&self) -> bool {
        self.status() == Some(EntityStatus::Deleted)
    }

    /// Unwrap as kind `K`, handing the record back if it is another kind.
    pub fn into_asset<K: AssetKind>(self) -> std::result::Result<Asset<K>, AssetRecord> {
        K::from_record(self)
    }
}

impl Serialize for AssetRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AssetRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
