//! Minimal-payload mutations.
//!
//! Every mutation starts from an `updater(qualifiedName, name)` shell and adds
//! only the field being changed, so the caller never fetches the full entity
//! and nothing else on it is overwritten. Removal is expressed as an explicit
//! null; term changes ride on the relationship save semantic.
//!
//! Append/remove of terms and appending tags take two round trips. If the
//! second call fails the error is returned as is; nothing is retried or
//! rolled back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::asset::{AnnouncementType, Asset, AssetKind, AtlanTag, CertificateStatus, TagPropagation};
use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::record::AssetRecord;
use crate::reference::{Reference, SaveSemantic};
use crate::retrieval::{classify_result, AssetId};

/// Entities to create or update in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub entities: Vec<Value>,
}

impl MutationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset<K: AssetKind>(mut self, asset: &Asset<K>) -> Result<Self> {
        self.entities.push(asset.to_payload()?);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutatedEntities {
    #[serde(rename = "CREATE", default, skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<AssetRecord>,
    #[serde(rename = "UPDATE", default, skip_serializing_if = "Vec::is_empty")]
    pub updated: Vec<AssetRecord>,
    #[serde(rename = "DELETE", default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<AssetRecord>,
}

/// What the service echoed back. Only fields it chose to return are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub mutated_entities: MutatedEntities,
    /// Temporary guid → assigned guid.
    #[serde(default)]
    pub guid_assignments: BTreeMap<String, String>,
}

impl MutationResponse {
    pub fn created(&self) -> &[AssetRecord] {
        &self.mutated_entities.created
    }

    pub fn updated(&self) -> &[AssetRecord] {
        &self.mutated_entities.updated
    }

    pub fn deleted(&self) -> &[AssetRecord] {
        &self.mutated_entities.deleted
    }

    /// First updated, else created, entity of kind `K`.
    pub fn first_mutated<K: AssetKind>(&self) -> Option<Asset<K>> {
        self.updated()
            .iter()
            .chain(self.created())
            .find_map(|record| record.clone().into_asset::<K>().ok())
    }

    pub fn assigned_guid(&self, temporary_guid: &str) -> Option<&str> {
        self.guid_assignments.get(temporary_guid).map(String::as_str)
    }
}

fn require_qualified_name(type_name: &str, qualified_name: &str) -> Result<()> {
    if qualified_name.is_empty() {
        return Err(CatalogError::missing_update(type_name, &["qualifiedName"]));
    }
    Ok(())
}

// ── Request builders ─────────────────────────────────────────────

impl<K: AssetKind> Asset<K> {
    pub fn removing_description(mut self) -> Self {
        self.attributes.description = None;
        self.with_null_field("description")
    }

    pub fn removing_user_description(mut self) -> Self {
        self.attributes.user_description = None;
        self.with_null_field("userDescription")
    }

    pub fn removing_owners(mut self) -> Self {
        self.attributes.owner_users = None;
        self.attributes.owner_groups = None;
        self.with_null_field("ownerUsers").with_null_field("ownerGroups")
    }

    pub fn removing_certificate(mut self) -> Self {
        self.attributes.certificate_status = None;
        self.attributes.certificate_status_message = None;
        self.with_null_field("certificateStatus")
            .with_null_field("certificateStatusMessage")
    }

    pub fn removing_announcement(mut self) -> Self {
        self.attributes.announcement_type = None;
        self.attributes.announcement_title = None;
        self.attributes.announcement_message = None;
        self.with_null_field("announcementType")
            .with_null_field("announcementTitle")
            .with_null_field("announcementMessage")
    }

    /// Replace every assigned term. An empty list clears them all.
    pub fn replacing_terms(mut self, terms: Vec<Reference>) -> Self {
        if terms.is_empty() {
            self.attributes.meanings = None;
            return self.with_null_field("meanings");
        }
        self.attributes.meanings = Some(
            terms
                .into_iter()
                .map(|term| term.with_semantic(SaveSemantic::Replace))
                .collect(),
        );
        self
    }

    pub fn appending_terms(self, terms: Vec<Reference>) -> Self {
        self.with_term_semantic(terms, SaveSemantic::Append)
    }

    pub fn removing_terms(self, terms: Vec<Reference>) -> Self {
        self.with_term_semantic(terms, SaveSemantic::Remove)
    }

    fn with_term_semantic(mut self, terms: Vec<Reference>, semantic: SaveSemantic) -> Self {
        let meanings = self.attributes.meanings.get_or_insert_with(Vec::new);
        meanings.extend(terms.into_iter().map(|term| term.with_semantic(semantic)));
        self
    }
}

// ── Operations ───────────────────────────────────────────────────

impl<K: AssetKind> Asset<K> {
    /// Submit this entity as is (creator or updater payload).
    pub async fn save(&self, client: &dyn CatalogClient) -> Result<MutationResponse> {
        let request = MutationRequest::new().with_asset(self)?;
        debug!(
            type_name = %self.type_name,
            qualified_name = ?self.qualified_name(),
            "saving asset"
        );
        client.save(&request).await
    }

    async fn submit(client: &dyn CatalogClient, request: Self) -> Result<Option<Self>> {
        // qualifiedName and name are the targeting key
        request.trim_to_required()?;
        let response = request.save(client).await?;
        Ok(response.first_mutated::<K>())
    }

    pub async fn remove_description(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> Result<Option<Self>> {
        Self::submit(client, Self::updater(qualified_name, name).removing_description()).await
    }

    pub async fn remove_user_description(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> Result<Option<Self>> {
        let request = Self::updater(qualified_name, name).removing_user_description();
        Self::submit(client, request).await
    }

    pub async fn remove_owners(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> Result<Option<Self>> {
        Self::submit(client, Self::updater(qualified_name, name).removing_owners()).await
    }

    pub async fn update_description(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<Self>> {
        let request = Self::updater(qualified_name, name).with_description(description);
        Self::submit(client, request).await
    }

    pub async fn update_user_description(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<Self>> {
        let request = Self::updater(qualified_name, name).with_user_description(description);
        Self::submit(client, request).await
    }

    /// Replace owners. An empty side is left untouched.
    pub async fn update_owners(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        owner_users: &[&str],
        owner_groups: &[&str],
    ) -> Result<Option<Self>> {
        let mut request = Self::updater(qualified_name, name);
        if !owner_users.is_empty() {
            request = request.with_owner_users(owner_users.iter().copied());
        }
        if !owner_groups.is_empty() {
            request = request.with_owner_groups(owner_groups.iter().copied());
        }
        Self::submit(client, request).await
    }

    pub async fn update_certificate(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        status: CertificateStatus,
        message: Option<&str>,
    ) -> Result<Option<Self>> {
        let request = Self::updater(qualified_name, name).with_certificate(status, message);
        Self::submit(client, request).await
    }

    pub async fn remove_certificate(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> Result<Option<Self>> {
        Self::submit(client, Self::updater(qualified_name, name).removing_certificate()).await
    }

    pub async fn update_announcement(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        announcement_type: AnnouncementType,
        title: &str,
        message: Option<&str>,
    ) -> Result<Option<Self>> {
        let request = Self::updater(qualified_name, name)
            .with_announcement(announcement_type, title, message);
        Self::submit(client, request).await
    }

    pub async fn remove_announcement(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> Result<Option<Self>> {
        Self::submit(client, Self::updater(qualified_name, name).removing_announcement()).await
    }

    pub async fn replace_terms(
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        terms: Vec<Reference>,
    ) -> Result<Option<Self>> {
        Self::submit(client, Self::updater(qualified_name, name).replacing_terms(terms)).await
    }

    /// Link further terms, keeping those already assigned.
    pub async fn append_terms(
        client: &dyn CatalogClient,
        qualified_name: &str,
        terms: Vec<Reference>,
    ) -> Result<Option<Self>> {
        let current = Self::current_identity(client, qualified_name).await?;
        Self::submit(client, current.appending_terms(terms)).await
    }

    /// Unlink the given terms, keeping any others.
    pub async fn remove_terms(
        client: &dyn CatalogClient,
        qualified_name: &str,
        terms: Vec<Reference>,
    ) -> Result<Option<Self>> {
        let current = Self::current_identity(client, qualified_name).await?;
        Self::submit(client, current.removing_terms(terms)).await
    }

    /// First round trip of the two-call mutations: resolve the stored name.
    async fn current_identity(client: &dyn CatalogClient, qualified_name: &str) -> Result<Self> {
        require_qualified_name(K::TYPE_NAME, qualified_name)?;
        let current = Self::lookup_by_qualified_name(client, qualified_name, &["name"]).await?;
        let name = current
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CatalogError::missing_update(K::TYPE_NAME, &["name"]))?;
        Ok(Self::updater(qualified_name, name))
    }

    /// Attach tags, then read the entity back.
    pub async fn append_atlan_tags(
        client: &dyn CatalogClient,
        qualified_name: &str,
        tag_names: &[&str],
        propagation: TagPropagation,
    ) -> Result<Option<Self>> {
        require_qualified_name(K::TYPE_NAME, qualified_name)?;
        let tags: Vec<AtlanTag> = tag_names
            .iter()
            .map(|tag| AtlanTag::new(*tag, propagation))
            .collect();
        debug!(type_name = K::TYPE_NAME, qualified_name, tags = tags.len(), "appending atlan tags");
        client.add_atlan_tags(K::TYPE_NAME, qualified_name, &tags).await?;
        let record = client
            .get_by_qualified_name(K::TYPE_NAME, qualified_name, false)
            .await?;
        match record {
            Some(record) => {
                classify_result(&AssetId::QualifiedName(qualified_name), Some(record)).map(Some)
            }
            None => Ok(None),
        }
    }

    pub async fn remove_atlan_tag(
        client: &dyn CatalogClient,
        qualified_name: &str,
        tag_name: &str,
    ) -> Result<()> {
        require_qualified_name(K::TYPE_NAME, qualified_name)?;
        debug!(type_name = K::TYPE_NAME, qualified_name, tag_name, "removing atlan tag");
        client
            .remove_atlan_tag(K::TYPE_NAME, qualified_name, tag_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirflowTask, Table, TableAttributes};
    use serde_json::json;

    const QN: &str = "default/snowflake/1/DB/RAW/ORDERS";

    #[test]
    fn remove_certificate_sends_explicit_nulls_only() {
        let request = Table::updater(QN, "ORDERS")
            .with_certificate(CertificateStatus::Verified, Some("ok"))
            .removing_certificate();
        assert_eq!(
            request.to_payload().unwrap(),
            json!({
                "typeName": "Table",
                "attributes": {
                    "qualifiedName": QN,
                    "name": "ORDERS",
                    "certificateStatus": null,
                    "certificateStatusMessage": null
                }
            })
        );
    }

    #[test]
    fn remove_announcement_nulls_all_three_fields() {
        let payload = Table::updater(QN, "ORDERS").removing_announcement().to_payload().unwrap();
        let attributes = payload["attributes"].as_object().unwrap();
        for field in ["announcementType", "announcementTitle", "announcementMessage"] {
            assert_eq!(attributes.get(field), Some(&Value::Null), "{field}");
        }
    }

    #[test]
    fn replacing_with_no_terms_clears_meanings() {
        let payload = Table::updater(QN, "ORDERS").replacing_terms(vec![]).to_payload().unwrap();
        assert_eq!(payload["attributes"]["meanings"], Value::Null);
        assert!(payload.get("appendRelationshipAttributes").is_none());
    }

    #[test]
    fn appended_terms_move_to_append_section() {
        let payload = AirflowTask::updater("conn1/dag1/task1", "task1")
            .appending_terms(vec![Reference::term_by_guid("t1")])
            .to_payload()
            .unwrap();
        assert!(payload["attributes"].get("meanings").is_none());
        assert_eq!(
            payload["appendRelationshipAttributes"]["meanings"],
            json!([{"typeName": "AtlasGlossaryTerm", "guid": "t1"}])
        );
    }

    #[test]
    fn removed_terms_move_to_remove_section() {
        let payload = Table::updater(QN, "ORDERS")
            .removing_terms(vec![Reference::term_by_qualified_name("glossary/term")])
            .to_payload()
            .unwrap();
        assert_eq!(
            payload["removeRelationshipAttributes"]["meanings"][0]["uniqueAttributes"]["qualifiedName"],
            json!("glossary/term")
        );
    }

    #[test]
    fn response_prefers_updated_entities_of_the_requested_kind() {
        let response: MutationResponse = serde_json::from_value(json!({
            "mutatedEntities": {
                "CREATE": [{"typeName": "Table", "guid": "new", "attributes": {"name": "created"}}],
                "UPDATE": [
                    {"typeName": "AirflowTask", "guid": "a", "attributes": {"name": "task"}},
                    {"typeName": "Table", "guid": "b", "attributes": {"name": "updated"}}
                ]
            },
            "guidAssignments": {"-1": "new"}
        }))
        .unwrap();
        let table = response.first_mutated::<TableAttributes>().unwrap();
        assert_eq!(table.name(), Some("updated"));
        assert_eq!(response.assigned_guid("-1"), Some("new"));
        assert!(response.deleted().is_empty());
    }

    #[test]
    fn request_collects_payloads() {
        let request = MutationRequest::new()
            .with_asset(&Table::updater(QN, "ORDERS").removing_description())
            .unwrap();
        assert_eq!(request.entities.len(), 1);
        assert_eq!(request.entities[0]["attributes"]["description"], Value::Null);
    }
}
