//! The entity envelope shared by every asset kind.
//!
//! `Asset<K>` holds what all catalog entities have in common (type name,
//! guid, status, common attributes, tags, assigned terms) and flattens the
//! kind-specific detail struct `K` into the same `attributes` object on the
//! wire. Construction follows two paths:
//! - `creator` (defined per kind) derives the qualifiedName and hierarchy links
//! - `updater` targets an existing entity by qualifiedName and name only

use std::collections::BTreeSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use meta_catalog_macros::AssetKind;

use crate::capability::Capability;
use crate::error::{CatalogError, Result};
use crate::guid::GuidSource;
use crate::qualified_name;
use crate::record::AssetRecord;
use crate::reference::{shape_relationships, Reference, SaveSemantic, UniqueAttributes};

/// Implemented by every kind-specific detail struct, normally through
/// `#[derive(AssetKind)]`.
pub trait AssetKind:
    Clone + Default + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const TYPE_NAME: &'static str;
    const CAPABILITIES: &'static [Capability];

    /// Unwrap the matching record variant, handing any other variant back.
    fn from_record(record: AssetRecord) -> std::result::Result<Asset<Self>, AssetRecord>;

    fn into_record(asset: Asset<Self>) -> AssetRecord;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    /// Archived (soft-deleted); `restore` brings it back.
    Deleted,
    /// Hard-deleted; only seen in mutation and search results.
    Purged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Verified,
    Draft,
    Deprecated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    Information,
    Warning,
    Issue,
}

/// Propagation flags applied when tags are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPropagation {
    pub propagate: bool,
    pub remove_propagations_on_delete: bool,
    pub restrict_lineage_propagation: bool,
}

impl Default for TagPropagation {
    fn default() -> Self {
        Self {
            propagate: true,
            remove_propagations_on_delete: true,
            restrict_lineage_propagation: false,
        }
    }
}

/// A tag (classification) assigned to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlanTag {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_guid: Option<String>,
    #[serde(default)]
    pub propagate: bool,
    #[serde(default)]
    pub remove_propagations_on_entity_delete: bool,
    #[serde(default)]
    pub restrict_propagation_through_lineage: bool,
}

impl AtlanTag {
    pub fn new(type_name: impl Into<String>, propagation: TagPropagation) -> Self {
        Self {
            type_name: type_name.into(),
            entity_guid: None,
            propagate: propagation.propagate,
            remove_propagations_on_entity_delete: propagation.remove_propagations_on_delete,
            restrict_propagation_through_lineage: propagation.restrict_lineage_propagation,
        }
    }
}

/// Attributes common to every kind, with the kind's own detail flattened in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "K: Serialize", deserialize = "K: DeserializeOwned + Default")
)]
pub struct AssetAttributes<K> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_users: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_groups: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_status: Option<CertificateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_type: Option<AnnouncementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_message: Option<String>,
    /// Assigned glossary terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meanings: Option<Vec<Reference>>,
    #[serde(flatten)]
    pub detail: K,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "K: Serialize", deserialize = "K: DeserializeOwned + Default")
)]
pub struct Asset<K> {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default)]
    pub attributes: AssetAttributes<K>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications: Option<Vec<AtlanTag>>,
    /// Attributes to send as explicit nulls, which is how removal is expressed.
    #[serde(skip)]
    pub null_fields: BTreeSet<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl<K: AssetKind> Asset<K> {
    /// Empty shell carrying only the type name.
    pub fn new() -> Self {
        Self {
            type_name: K::TYPE_NAME.to_string(),
            guid: None,
            status: None,
            attributes: AssetAttributes::default(),
            unique_attributes: None,
            classifications: None,
            null_fields: BTreeSet::new(),
        }
    }

    /// Target an existing entity for a partial update. The qualifiedName is
    /// used verbatim, never re-derived.
    pub fn updater(qualified_name: impl Into<String>, name: impl Into<String>) -> Self {
        let mut asset = Self::new();
        asset.attributes.qualified_name = Some(qualified_name.into());
        asset.attributes.name = Some(name.into());
        asset
    }

    /// Starting point for a kind's `creator`: identity plus the connection
    /// the entity lives under.
    pub(crate) fn contained(
        qualified_name: String,
        name: impl Into<String>,
        connection_qualified_name: Option<String>,
    ) -> Self {
        let mut asset = Self::updater(qualified_name, name);
        asset.attributes.connector_name = connection_qualified_name
            .as_deref()
            .and_then(qualified_name::connector_name);
        asset.attributes.connection_qualified_name = connection_qualified_name;
        asset
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.attributes.qualified_name.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.name.as_deref()
    }

    pub fn connection_qualified_name(&self) -> Option<&str> {
        self.attributes.connection_qualified_name.as_deref()
    }

    pub fn detail(&self) -> &K {
        &self.attributes.detail
    }

    pub fn detail_mut(&mut self) -> &mut K {
        &mut self.attributes.detail
    }

    pub fn is_archived(&self) -> bool {
        self.status == Some(EntityStatus::Deleted)
    }

    // ── References ───────────────────────────────────────────────

    /// Minimal reference to this entity: guid, else qualifiedName, else the
    /// unique-attributes qualifiedName.
    pub fn trim_to_reference(&self) -> Result<Reference> {
        if let Some(guid) = non_empty(self.guid.as_deref()) {
            return Ok(Reference::by_guid(&self.type_name, guid));
        }
        if let Some(qn) = non_empty(self.qualified_name()) {
            return Ok(Reference::by_qualified_name(&self.type_name, qn));
        }
        if let Some(qn) = non_empty(
            self.unique_attributes
                .as_ref()
                .map(|unique| unique.qualified_name.as_str()),
        ) {
            return Ok(Reference::by_qualified_name(&self.type_name, qn));
        }
        Err(CatalogError::missing_relationship(
            &self.type_name,
            &["guid", "qualifiedName"],
        ))
    }

    /// Fresh updater carrying only the fields a save requires.
    pub fn trim_to_required(&self) -> Result<Self> {
        match (non_empty(self.qualified_name()), non_empty(self.name())) {
            (Some(qn), Some(name)) => Ok(Self::updater(qn, name)),
            _ => Err(CatalogError::missing_update(
                &self.type_name,
                &["qualifiedName", "name"],
            )),
        }
    }

    pub fn ref_by_guid(guid: impl Into<String>) -> Reference {
        Self::ref_by_guid_with(guid, SaveSemantic::Replace)
    }

    pub fn ref_by_guid_with(guid: impl Into<String>, semantic: SaveSemantic) -> Reference {
        Reference::by_guid(K::TYPE_NAME, guid).with_semantic(semantic)
    }

    pub fn ref_by_qualified_name(qualified_name: impl Into<String>) -> Reference {
        Self::ref_by_qualified_name_with(qualified_name, SaveSemantic::Replace)
    }

    pub fn ref_by_qualified_name_with(
        qualified_name: impl Into<String>,
        semantic: SaveSemantic,
    ) -> Reference {
        Reference::by_qualified_name(K::TYPE_NAME, qualified_name).with_semantic(semantic)
    }

    // ── Fluent setters ───────────────────────────────────────────

    pub fn with_temp_guid(mut self, guids: &dyn GuidSource) -> Self {
        self.guid = Some(guids.next_guid());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.description = Some(description.into());
        self
    }

    pub fn with_user_description(mut self, description: impl Into<String>) -> Self {
        self.attributes.user_description = Some(description.into());
        self
    }

    pub fn with_owner_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.owner_users = Some(users.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_owner_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.owner_groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_certificate(mut self, status: CertificateStatus, message: Option<&str>) -> Self {
        self.attributes.certificate_status = Some(status);
        self.attributes.certificate_status_message = message.map(str::to_string);
        self
    }

    pub fn with_announcement(
        mut self,
        announcement_type: AnnouncementType,
        title: impl Into<String>,
        message: Option<&str>,
    ) -> Self {
        self.attributes.announcement_type = Some(announcement_type);
        self.attributes.announcement_title = Some(title.into());
        self.attributes.announcement_message = message.map(str::to_string);
        self
    }

    pub fn with_meaning(mut self, term: Reference) -> Self {
        self.attributes.meanings.get_or_insert_with(Vec::new).push(term);
        self
    }

    pub fn with_atlan_tag(mut self, tag: AtlanTag) -> Self {
        self.classifications.get_or_insert_with(Vec::new).push(tag);
        self
    }

    /// Set kind-specific attributes in place.
    pub fn with_detail(mut self, apply: impl FnOnce(&mut K)) -> Self {
        apply(&mut self.attributes.detail);
        self
    }

    /// Send `field` (camelCase attribute name) as an explicit null.
    pub fn with_null_field(mut self, field: impl Into<String>) -> Self {
        self.null_fields.insert(field.into());
        self
    }

    // ── Wire form ────────────────────────────────────────────────

    /// Entity payload as sent to the service: explicit nulls applied and
    /// APPEND/REMOVE relationships moved to their own sections.
    pub fn to_payload(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if !self.null_fields.is_empty() {
            if let Some(attributes) = value.get_mut("attributes").and_then(Value::as_object_mut) {
                for field in &self.null_fields {
                    attributes.insert(field.clone(), Value::Null);
                }
            }
        }
        shape_relationships(&mut value);
        Ok(value)
    }

    pub fn into_record(self) -> AssetRecord {
        K::into_record(self)
    }
}
