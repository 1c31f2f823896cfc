//! HTTP transport for the catalog REST API.
//!
//! One request per call: no retry, no pagination. 404 on a lookup is a miss,
//! 400 is an invalid request, anything else unsuccessful is a transport error.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::CatalogClient;
use crate::asset::{AtlanTag, EntityStatus};
use crate::config::ClientConfig;
use crate::error::{CatalogError, Result};
use crate::mutation::{MutationRequest, MutationResponse};
use crate::record::AssetRecord;
use crate::search::{IndexSearchRequest, IndexSearchResponse};

const API_ROOT: &str = "api/meta";
const QUALIFIED_NAME_PARAM: &str = "attr:qualifiedName";

/// Body of the single-entity endpoints.
#[derive(Debug, Deserialize)]
struct EntityEnvelope {
    entity: AssetRecord,
}

pub struct HttpCatalogClient {
    http: Client,
    config: ClientConfig,
}

impl HttpCatalogClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http, config })
    }

    /// Client configured from `CATALOG_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API URL with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.endpoint(API_ROOT))
            .with_context(|| format!("Invalid catalog base URL {}", self.config.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Catalog base URL cannot carry a path: {}", self.config.base_url))?
            .extend(segments);
        Ok(url)
    }

    fn unique_attribute_url(&self, type_name: &str, tail: &[&str]) -> Result<Url> {
        let mut segments = vec!["entity", "uniqueAttribute", "type", type_name];
        segments.extend_from_slice(tail);
        self.url(&segments)
    }

    /// Send with auth. `Ok(None)` on 404.
    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<Option<Response>> {
        let request = match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to {}", what))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            warn!(%status, what, "catalog request failed");
            if status == StatusCode::BAD_REQUEST {
                return Err(CatalogError::InvalidRequest(body));
            }
            return Err(anyhow!("Catalog API error {} on {}: {}", status, what, body).into());
        }
        Ok(Some(response))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse response to {}", what))?;
        Ok(value)
    }

    async fn fetch_entity(
        &self,
        url: Url,
        include_relationships: bool,
        what: &str,
    ) -> Result<Option<AssetRecord>> {
        let request = self.http.get(url).query(&[
            ("minExtInfo", "true"),
            ("ignoreRelationships", if include_relationships { "false" } else { "true" }),
        ]);
        match self.execute(request, what).await? {
            Some(response) => {
                let envelope: EntityEnvelope = Self::decode(response, what).await?;
                Ok(Some(envelope.entity))
            }
            None => Ok(None),
        }
    }

    async fn post_mutation(&self, body: serde_json::Value, what: &str) -> Result<MutationResponse> {
        let request = self.http.post(self.url(&["entity", "bulk"])?).json(&body);
        match self.execute(request, what).await? {
            Some(response) => Self::decode(response, what).await,
            None => Err(anyhow!("Bulk entity endpoint not found").into()),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_by_guid(
        &self,
        guid: &str,
        include_relationships: bool,
    ) -> Result<Option<AssetRecord>> {
        debug!(guid, "GET entity by guid");
        let url = self.url(&["entity", "guid", guid])?;
        self.fetch_entity(url, include_relationships, "fetch entity by guid")
            .await
    }

    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        include_relationships: bool,
    ) -> Result<Option<AssetRecord>> {
        debug!(type_name, qualified_name, "GET entity by qualifiedName");
        let mut url = self.unique_attribute_url(type_name, &[])?;
        url.query_pairs_mut()
            .append_pair(QUALIFIED_NAME_PARAM, qualified_name);
        self.fetch_entity(url, include_relationships, "fetch entity by qualifiedName")
            .await
    }

    async fn search(&self, request: &IndexSearchRequest) -> Result<IndexSearchResponse> {
        let what = "run index search";
        let http = self
            .http
            .post(self.url(&["search", "indexsearch"])?)
            .json(&request.to_body());
        match self.execute(http, what).await? {
            Some(response) => Self::decode(response, what).await,
            None => Ok(IndexSearchResponse::default()),
        }
    }

    async fn save(&self, request: &MutationRequest) -> Result<MutationResponse> {
        debug!(entities = request.entities.len(), "POST entity bulk");
        self.post_mutation(json!({"entities": request.entities}), "save entities")
            .await
    }

    async fn restore(&self, type_name: &str, qualified_name: &str) -> Result<bool> {
        let current = self
            .get_by_qualified_name(type_name, qualified_name, false)
            .await?
            .ok_or_else(|| CatalogError::NotFoundByQualifiedName {
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            })?;
        if !current.is_archived() {
            return Ok(true);
        }

        let entity = json!({
            "typeName": type_name,
            "status": EntityStatus::Active,
            "attributes": {"qualifiedName": qualified_name, "name": current.name()},
        });
        let response = self
            .post_mutation(json!({"entities": [entity]}), "restore entity")
            .await?;
        Ok(response
            .updated()
            .iter()
            .chain(response.created())
            .any(|record| record.qualified_name() == Some(qualified_name)))
    }

    async fn add_atlan_tags(
        &self,
        type_name: &str,
        qualified_name: &str,
        tags: &[AtlanTag],
    ) -> Result<()> {
        let what = "add atlan tags";
        let mut url = self.unique_attribute_url(type_name, &["classifications"])?;
        url.query_pairs_mut()
            .append_pair(QUALIFIED_NAME_PARAM, qualified_name);
        match self.execute(self.http.post(url).json(tags), what).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFoundByQualifiedName {
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            }),
        }
    }

    async fn remove_atlan_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> Result<()> {
        let what = "remove atlan tag";
        let mut url = self.unique_attribute_url(type_name, &["classification", tag_name])?;
        url.query_pairs_mut()
            .append_pair(QUALIFIED_NAME_PARAM, qualified_name);
        match self.execute(self.http.delete(url), what).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFoundTag {
                tag: tag_name.to_string(),
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpCatalogClient {
        HttpCatalogClient::new(ClientConfig::new("https://tenant.example.com/")).unwrap()
    }

    #[test]
    fn urls_are_rooted_under_api_meta() {
        let url = client().url(&["entity", "guid", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://tenant.example.com/api/meta/entity/guid/abc");
    }

    #[test]
    fn segments_are_percent_encoded() {
        let url = client()
            .unique_attribute_url("Table", &["classification", "Confidential PII"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://tenant.example.com/api/meta/entity/uniqueAttribute/type/Table/classification/Confidential%20PII"
        );
    }

    #[test]
    fn base_url_must_be_absolute() {
        let client = HttpCatalogClient::new(ClientConfig::new("not a url")).unwrap();
        assert!(matches!(
            client.url(&["entity"]),
            Err(CatalogError::Transport(_))
        ));
    }
}
