//! CatalogClient trait: the boundary between the object model and the catalog service.
//! Entity operations depend on this trait, never on a concrete transport.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::asset::AtlanTag;
use crate::error::Result;
use crate::mutation::{MutationRequest, MutationResponse};
use crate::record::AssetRecord;
use crate::search::{IndexSearchRequest, IndexSearchResponse};

pub use http::HttpCatalogClient;
pub use memory::InMemoryCatalog;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Full entity by guid. `Ok(None)` when nothing has that guid.
    async fn get_by_guid(
        &self,
        guid: &str,
        include_relationships: bool,
    ) -> Result<Option<AssetRecord>>;

    /// Full entity by type and qualifiedName. `Ok(None)` when absent.
    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        include_relationships: bool,
    ) -> Result<Option<AssetRecord>>;

    /// One page of an index search.
    async fn search(&self, request: &IndexSearchRequest) -> Result<IndexSearchResponse>;

    /// Create or update the entities in `request`, matched by qualifiedName.
    async fn save(&self, request: &MutationRequest) -> Result<MutationResponse>;

    /// Move an archived entity back to active. Returns whether it is active
    /// afterwards; fails when no entity has that qualifiedName.
    async fn restore(&self, type_name: &str, qualified_name: &str) -> Result<bool>;

    // ── Tags ───────────────────────────────────────────────────

    async fn add_atlan_tags(
        &self,
        type_name: &str,
        qualified_name: &str,
        tags: &[AtlanTag],
    ) -> Result<()>;

    /// Fails with `NotFoundTag` when the tag is not assigned to the entity.
    async fn remove_atlan_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> Result<()>;
}
