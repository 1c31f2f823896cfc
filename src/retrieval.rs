//! Typed retrieval of a single entity.
//!
//! An identifier that parses as a UUID is looked up as a guid, anything else as
//! a qualifiedName of the requested kind. What comes back is an `AssetRecord`;
//! matching it against the requested kind yields the asset, a not-found error
//! for the lookup path used, or `WrongType`.

use tracing::{debug, info};
use uuid::Uuid;

use crate::asset::{Asset, AssetKind};
use crate::client::CatalogClient;
use crate::error::{CatalogError, Result, NULL_ID};
use crate::record::AssetRecord;
use crate::search::IndexSearchRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetId<'a> {
    Guid(&'a str),
    QualifiedName(&'a str),
}

impl<'a> AssetId<'a> {
    /// `None` fails as a guid miss on `(null)` without touching the service.
    pub fn classify(id: Option<&'a str>) -> Result<Self> {
        match id {
            None => Err(CatalogError::NotFoundByGuid(NULL_ID.to_string())),
            Some(id) if is_uuid(id) => Ok(Self::Guid(id)),
            Some(id) => Ok(Self::QualifiedName(id)),
        }
    }

    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Guid(id) | Self::QualifiedName(id) => id,
        }
    }
}

/// Hyphenated UUIDs only; the simple and URN forms are treated as names.
fn is_uuid(id: &str) -> bool {
    id.len() == 36 && Uuid::parse_str(id).is_ok()
}

/// Turn a lookup result into the requested kind.
pub fn classify_result<K: AssetKind>(
    id: &AssetId<'_>,
    found: Option<AssetRecord>,
) -> Result<Asset<K>> {
    let record = found.ok_or_else(|| not_found(K::TYPE_NAME, id))?;
    K::from_record(record).map_err(|other| CatalogError::WrongType {
        id: id.as_str().to_string(),
        found: other.type_name().to_string(),
        expected: K::TYPE_NAME.to_string(),
    })
}

pub(crate) fn not_found(type_name: &str, id: &AssetId<'_>) -> CatalogError {
    match id {
        AssetId::Guid(guid) => CatalogError::NotFoundByGuid(guid.to_string()),
        AssetId::QualifiedName(qualified_name) => CatalogError::NotFoundByQualifiedName {
            type_name: type_name.to_string(),
            qualified_name: qualified_name.to_string(),
        },
    }
}

/// Single active entity of `type_name`, with the given projections.
pub(crate) fn projection_request(
    type_name: &str,
    id: &AssetId<'_>,
    attributes: &[&str],
    attributes_on_related: &[&str],
) -> IndexSearchRequest {
    let request = IndexSearchRequest::new().where_type(type_name);
    match id {
        AssetId::Guid(guid) => request.where_guid(guid),
        AssetId::QualifiedName(qualified_name) => request.where_qualified_name(qualified_name),
    }
    .active_only()
    .includes_on_results(attributes.iter().copied())
    .includes_on_relations(attributes_on_related.iter().copied())
    .page_size(1)
}

impl<K: AssetKind> Asset<K> {
    /// Full fetch, with relationships only when asked for.
    pub async fn get(
        client: &dyn CatalogClient,
        id: Option<&str>,
        include_relationships: bool,
    ) -> Result<Self> {
        let id = AssetId::classify(id)?;
        debug!(type_name = K::TYPE_NAME, id = ?id, include_relationships, "get asset");
        let found = match id {
            AssetId::Guid(guid) => client.get_by_guid(guid, include_relationships).await?,
            AssetId::QualifiedName(qualified_name) => {
                client
                    .get_by_qualified_name(K::TYPE_NAME, qualified_name, include_relationships)
                    .await?
            }
        };
        classify_result(&id, found)
    }

    /// Fetch only the named attributes, and the named attributes of related
    /// entities, through a single-result search.
    pub async fn get_projected(
        client: &dyn CatalogClient,
        id: Option<&str>,
        attributes: &[&str],
        attributes_on_related: &[&str],
    ) -> Result<Self> {
        let id = AssetId::classify(id)?;
        Self::projected(client, &id, attributes, attributes_on_related).await
    }

    pub(crate) async fn lookup_by_qualified_name(
        client: &dyn CatalogClient,
        qualified_name: &str,
        attributes: &[&str],
    ) -> Result<Self> {
        let id = AssetId::QualifiedName(qualified_name);
        Self::projected(client, &id, attributes, &[]).await
    }

    async fn projected(
        client: &dyn CatalogClient,
        id: &AssetId<'_>,
        attributes: &[&str],
        attributes_on_related: &[&str],
    ) -> Result<Self> {
        let request = projection_request(K::TYPE_NAME, id, attributes, attributes_on_related);
        debug!(type_name = K::TYPE_NAME, id = ?id, "projected get");
        let response = client.search(&request).await?;
        classify_result(id, response.entities.into_iter().next())
    }

    /// Bring an archived entity back. `Ok(true)` also when it was never archived.
    pub async fn restore(client: &dyn CatalogClient, qualified_name: &str) -> Result<bool> {
        if qualified_name.is_empty() {
            return Err(CatalogError::missing_update(K::TYPE_NAME, &["qualifiedName"]));
        }
        let restored = client.restore(K::TYPE_NAME, qualified_name).await?;
        info!(type_name = K::TYPE_NAME, qualified_name, restored, "restore");
        Ok(restored)
    }
}
