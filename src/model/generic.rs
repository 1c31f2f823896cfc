//! Fallback kind for entity types this crate does not model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::asset::{Asset, AssetKind};
use crate::capability::Capability;
use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::record::AssetRecord;
use crate::retrieval::{not_found, projection_request, AssetId};

pub type GenericAsset = Asset<GenericAttributes>;

/// Keeps every kind-specific attribute as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericAttributes {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenericAttributes {
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.extra.get(attribute)
    }
}

/// `TYPE_NAME` is a placeholder that matches no stored entity, so the shared
/// `get` by qualifiedName and `get_projected` never find a generic asset. Use
/// `GenericAsset::get_as` and `GenericAsset::get_projected_as` instead.
impl AssetKind for GenericAttributes {
    const TYPE_NAME: &'static str = "Asset";
    const CAPABILITIES: &'static [Capability] = &[];

    fn from_record(record: AssetRecord) -> std::result::Result<Asset<Self>, AssetRecord> {
        match record {
            AssetRecord::Other(asset) => Ok(asset),
            other => Err(other),
        }
    }

    fn into_record(asset: Asset<Self>) -> AssetRecord {
        AssetRecord::Other(asset)
    }
}

impl Asset<GenericAttributes> {
    /// Full fetch of an entity of any `type_name`, attributes kept raw.
    pub async fn get_as(
        client: &dyn CatalogClient,
        type_name: &str,
        id: Option<&str>,
        include_relationships: bool,
    ) -> Result<Self> {
        let id = AssetId::classify(id)?;
        debug!(type_name, id = ?id, include_relationships, "get generic asset");
        let found = match id {
            AssetId::Guid(guid) => client.get_by_guid(guid, include_relationships).await?,
            AssetId::QualifiedName(qualified_name) => {
                client
                    .get_by_qualified_name(type_name, qualified_name, include_relationships)
                    .await?
            }
        };
        Self::from_found(type_name, &id, found)
    }

    /// Projected fetch of an entity of any `type_name`.
    pub async fn get_projected_as(
        client: &dyn CatalogClient,
        type_name: &str,
        id: Option<&str>,
        attributes: &[&str],
        attributes_on_related: &[&str],
    ) -> Result<Self> {
        let id = AssetId::classify(id)?;
        let request = projection_request(type_name, &id, attributes, attributes_on_related);
        let response = client.search(&request).await?;
        Self::from_found(type_name, &id, response.entities.into_iter().next())
    }

    /// Modelled kinds are re-read as raw attributes.
    fn from_found(type_name: &str, id: &AssetId<'_>, found: Option<AssetRecord>) -> Result<Self> {
        let record = found.ok_or_else(|| not_found(type_name, id))?;
        if record.type_name() != type_name {
            return Err(CatalogError::WrongType {
                id: id.as_str().to_string(),
                found: record.type_name().to_string(),
                expected: type_name.to_string(),
            });
        }
        match record {
            AssetRecord::Other(asset) => Ok(asset),
            known => Ok(serde_json::from_value(known.to_value()?)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryCatalog;
    use crate::model::Table;
    use serde_json::json;

    const QN: &str = "default/snowflake/1700000000/DB/RAW/ORDERS";

    async fn seeded() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        Table::creator("ORDERS", "default/snowflake/1700000000/DB/RAW")
            .unwrap()
            .save(&catalog)
            .await
            .unwrap();
        let mut dashboard = GenericAsset::updater("default/looker/1700000000/ops", "ops");
        dashboard.type_name = "LookerDashboard".into();
        dashboard.save(&catalog).await.unwrap();
        catalog
    }

    #[tokio::test]
    async fn placeholder_type_name_never_matches() {
        let catalog = seeded().await;
        let err = GenericAsset::get(&catalog, Some("default/looker/1700000000/ops"), false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn explicit_type_name_finds_unmodelled_entities() {
        let catalog = seeded().await;
        let asset =
            GenericAsset::get_as(&catalog, "LookerDashboard", Some("default/looker/1700000000/ops"), false)
                .await
                .unwrap();
        assert_eq!(asset.type_name, "LookerDashboard");
        assert_eq!(asset.name(), Some("ops"));

        let projected = GenericAsset::get_projected_as(
            &catalog,
            "LookerDashboard",
            Some("default/looker/1700000000/ops"),
            &["name"],
            &[],
        )
        .await
        .unwrap();
        assert_eq!(projected.qualified_name(), Some("default/looker/1700000000/ops"));
    }

    #[tokio::test]
    async fn modelled_kinds_read_back_as_raw_attributes() {
        let catalog = seeded().await;
        let asset = GenericAsset::get_as(&catalog, "Table", Some(QN), false).await.unwrap();
        assert_eq!(asset.type_name, "Table");
        assert_eq!(asset.detail().get("schemaName"), Some(&json!("RAW")));

        let err = GenericAsset::get_as(&catalog, "Schema", Some(QN), false).await.unwrap_err();
        match err {
            CatalogError::NotFoundByQualifiedName { type_name, .. } => assert_eq!(type_name, "Schema"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_attributes_are_kept() {
        let asset: GenericAsset = serde_json::from_value(json!({
            "typeName": "LookerDashboard",
            "guid": "g",
            "attributes": {"qualifiedName": "q", "name": "d", "folderName": "ops"}
        }))
        .unwrap();
        assert_eq!(asset.type_name, "LookerDashboard");
        assert_eq!(asset.qualified_name(), Some("q"));
        assert_eq!(asset.detail().get("folderName"), Some(&json!("ops")));
        assert!(asset.detail().get("qualifiedName").is_none());
    }
}
