//! In-memory catalog: a tenant held in a map, for tests and local runs.
//!
//! Behaves like the service where the object model can observe it: entities
//! are matched by typeName + qualifiedName, new ones get UUID guids (reported
//! against their temporary guids), explicit nulls clear attributes, and
//! appended/removed relationships merge into what is stored.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::CatalogClient;
use crate::asset::AtlanTag;
use crate::error::{CatalogError, Result};
use crate::guid;
use crate::mutation::{MutatedEntities, MutationRequest, MutationResponse};
use crate::record::AssetRecord;
use crate::search::{IndexSearchRequest, IndexSearchResponse};

const APPEND_RELATIONSHIPS: &str = "appendRelationshipAttributes";
const REMOVE_RELATIONSHIPS: &str = "removeRelationshipAttributes";
const ACTIVE: &str = "ACTIVE";
const DELETED: &str = "DELETED";

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    /// guid → stored entity JSON
    entities: RwLock<HashMap<String, Value>>,
    requests: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made through `CatalogClient` so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// Soft-delete, as done outside this crate. Returns false when absent.
    pub async fn archive(&self, type_name: &str, qualified_name: &str) -> bool {
        let mut entities = self.entities.write().await;
        match find_guid(&entities, type_name, qualified_name) {
            Some(guid) => {
                if let Some(entity) = entities.get_mut(&guid) {
                    entity["status"] = json!(DELETED);
                }
                true
            }
            None => false,
        }
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn find_guid(
    entities: &HashMap<String, Value>,
    type_name: &str,
    qualified_name: &str,
) -> Option<String> {
    entities
        .iter()
        .find(|(_, entity)| {
            entity["typeName"].as_str() == Some(type_name)
                && entity["attributes"]["qualifiedName"].as_str() == Some(qualified_name)
        })
        .map(|(guid, _)| guid.clone())
}

fn not_found(type_name: &str, qualified_name: &str) -> CatalogError {
    CatalogError::NotFoundByQualifiedName {
        type_name: type_name.to_string(),
        qualified_name: qualified_name.to_string(),
    }
}

fn is_reference(value: &Value) -> bool {
    match value {
        Value::Object(object) => object.contains_key("typeName"),
        Value::Array(items) => !items.is_empty() && items.iter().all(is_reference),
        _ => false,
    }
}

fn same_reference(left: &Value, right: &Value) -> bool {
    if left["typeName"] != right["typeName"] {
        return false;
    }
    let guid = |value: &Value| value["guid"].as_str().map(str::to_owned);
    let qualified_name =
        |value: &Value| value["uniqueAttributes"]["qualifiedName"].as_str().map(str::to_owned);
    (guid(left).is_some() && guid(left) == guid(right))
        || (qualified_name(left).is_some() && qualified_name(left) == qualified_name(right))
}

fn attributes_mut(entity: &mut Value) -> Option<&mut Map<String, Value>> {
    entity
        .as_object_mut()?
        .entry("attributes")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

fn strip_relationships(mut entity: Value) -> Value {
    if let Some(attributes) = attributes_mut(&mut entity) {
        attributes.retain(|_, value| !is_reference(value));
    }
    entity
}

/// Header fields plus qualifiedName, name and the requested attributes.
fn project(entity: &Value, attributes: &[String]) -> Value {
    let mut projected = Map::new();
    for field in ["typeName", "guid", "status"] {
        if let Some(value) = entity.get(field) {
            projected.insert(field.to_string(), value.clone());
        }
    }
    let mut kept = Map::new();
    if let Some(stored) = entity["attributes"].as_object() {
        for (key, value) in stored {
            let wanted = key == "qualifiedName"
                || key == "name"
                || attributes.iter().any(|attribute| attribute == key);
            if wanted {
                kept.insert(key.clone(), value.clone());
            }
        }
    }
    projected.insert("attributes".to_string(), Value::Object(kept));
    Value::Object(projected)
}

fn append_relationship(attributes: &mut Map<String, Value>, key: &str, value: &Value) {
    match (attributes.get_mut(key), value) {
        (Some(Value::Array(existing)), Value::Array(incoming)) => {
            for item in incoming {
                if !existing.iter().any(|current| same_reference(current, item)) {
                    existing.push(item.clone());
                }
            }
        }
        (Some(Value::Array(existing)), single) => {
            if !existing.iter().any(|current| same_reference(current, single)) {
                existing.push(single.clone());
            }
        }
        _ => {
            attributes.insert(key.to_string(), value.clone());
        }
    }
}

fn remove_relationship(attributes: &mut Map<String, Value>, key: &str, value: &Value) {
    let targets: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    let emptied = match attributes.get_mut(key) {
        Some(Value::Array(existing)) => {
            existing.retain(|current| !targets.iter().any(|target| same_reference(current, target)));
            existing.is_empty()
        }
        Some(single) => targets.iter().any(|target| same_reference(single, target)),
        None => false,
    };
    if emptied {
        attributes.remove(key);
    }
}

/// Apply one payload onto a stored entity (or onto an empty one for a create).
fn apply(stored: &mut Value, payload: &Value) {
    if let Some(attributes) = attributes_mut(stored) {
        if let Some(incoming) = payload["attributes"].as_object() {
            for (key, value) in incoming {
                if value.is_null() {
                    attributes.remove(key);
                } else {
                    attributes.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(appended) = payload[APPEND_RELATIONSHIPS].as_object() {
            for (key, value) in appended {
                append_relationship(attributes, key, value);
            }
        }
        if let Some(removed) = payload[REMOVE_RELATIONSHIPS].as_object() {
            for (key, value) in removed {
                remove_relationship(attributes, key, value);
            }
        }
    }
    for field in ["classifications", "status"] {
        if let Some(value) = payload.get(field).filter(|value| !value.is_null()) {
            stored[field] = value.clone();
        }
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn get_by_guid(
        &self,
        guid: &str,
        include_relationships: bool,
    ) -> Result<Option<AssetRecord>> {
        self.record_request();
        let entities = self.entities.read().await;
        let Some(entity) = entities.get(guid).cloned() else {
            return Ok(None);
        };
        let entity = if include_relationships {
            entity
        } else {
            strip_relationships(entity)
        };
        AssetRecord::from_value(entity).map(Some)
    }

    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        include_relationships: bool,
    ) -> Result<Option<AssetRecord>> {
        self.record_request();
        let entities = self.entities.read().await;
        let Some(entity) = find_guid(&entities, type_name, qualified_name)
            .and_then(|guid| entities.get(&guid).cloned())
        else {
            return Ok(None);
        };
        let entity = if include_relationships {
            entity
        } else {
            strip_relationships(entity)
        };
        AssetRecord::from_value(entity).map(Some)
    }

    async fn search(&self, request: &IndexSearchRequest) -> Result<IndexSearchResponse> {
        self.record_request();
        let entities = self.entities.read().await;
        let mut matched: Vec<&Value> = entities
            .values()
            .filter(|entity| request.matches(entity))
            .collect();
        // HashMap order is arbitrary; keep pages stable.
        matched.sort_by(|left, right| {
            left["attributes"]["qualifiedName"]
                .as_str()
                .cmp(&right["attributes"]["qualifiedName"].as_str())
        });
        let approximate_count = matched.len() as u64;
        let entities = matched
            .into_iter()
            .take(request.page_size)
            .map(|entity| AssetRecord::from_value(project(entity, &request.attributes)))
            .collect::<Result<Vec<_>>>()?;
        Ok(IndexSearchResponse {
            approximate_count,
            entities,
        })
    }

    async fn save(&self, request: &MutationRequest) -> Result<MutationResponse> {
        self.record_request();
        let mut entities = self.entities.write().await;
        let mut mutated = MutatedEntities::default();
        let mut guid_assignments = BTreeMap::new();

        for payload in &request.entities {
            let type_name = payload["typeName"]
                .as_str()
                .filter(|type_name| !type_name.is_empty())
                .ok_or_else(|| CatalogError::InvalidRequest("entity without typeName".into()))?;
            let qualified_name = payload["attributes"]["qualifiedName"]
                .as_str()
                .filter(|qualified_name| !qualified_name.is_empty())
                .ok_or_else(|| {
                    CatalogError::missing_update(type_name, &["qualifiedName"])
                })?;

            let existing = payload["guid"]
                .as_str()
                .filter(|guid| entities.contains_key(*guid))
                .map(str::to_owned)
                .or_else(|| find_guid(&entities, type_name, qualified_name));

            match existing {
                Some(guid) => {
                    let Some(stored) = entities.get_mut(&guid) else {
                        continue;
                    };
                    apply(stored, payload);
                    debug!(type_name, qualified_name, %guid, "updated entity");
                    mutated.updated.push(AssetRecord::from_value(strip_relationships(stored.clone()))?);
                }
                None => {
                    let assigned = Uuid::new_v4().to_string();
                    if let Some(temporary) = payload["guid"].as_str().filter(|g| guid::is_temporary(g)) {
                        guid_assignments.insert(temporary.to_string(), assigned.clone());
                    }
                    let mut stored = json!({
                        "typeName": type_name,
                        "guid": assigned,
                        "status": ACTIVE,
                        "attributes": {},
                    });
                    apply(&mut stored, payload);
                    debug!(type_name, qualified_name, guid = %assigned, "created entity");
                    mutated.created.push(AssetRecord::from_value(strip_relationships(stored.clone()))?);
                    entities.insert(assigned, stored);
                }
            }
        }

        Ok(MutationResponse {
            mutated_entities: mutated,
            guid_assignments,
        })
    }

    async fn restore(&self, type_name: &str, qualified_name: &str) -> Result<bool> {
        self.record_request();
        let mut entities = self.entities.write().await;
        let guid = find_guid(&entities, type_name, qualified_name)
            .ok_or_else(|| not_found(type_name, qualified_name))?;
        if let Some(entity) = entities.get_mut(&guid) {
            entity["status"] = json!(ACTIVE);
        }
        Ok(true)
    }

    async fn add_atlan_tags(
        &self,
        type_name: &str,
        qualified_name: &str,
        tags: &[AtlanTag],
    ) -> Result<()> {
        self.record_request();
        let mut entities = self.entities.write().await;
        let guid = find_guid(&entities, type_name, qualified_name)
            .ok_or_else(|| not_found(type_name, qualified_name))?;
        let Some(entity) = entities.get_mut(&guid) else {
            return Err(not_found(type_name, qualified_name));
        };

        let mut assigned: Vec<AtlanTag> = match entity.get("classifications") {
            Some(existing) if !existing.is_null() => serde_json::from_value(existing.clone())?,
            _ => Vec::new(),
        };
        for tag in tags {
            if assigned.iter().any(|current| current.type_name == tag.type_name) {
                continue;
            }
            let mut tag = tag.clone();
            tag.entity_guid = Some(guid.clone());
            assigned.push(tag);
        }
        entity["classifications"] = serde_json::to_value(assigned)?;
        Ok(())
    }

    async fn remove_atlan_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> Result<()> {
        self.record_request();
        let mut entities = self.entities.write().await;
        let guid = find_guid(&entities, type_name, qualified_name)
            .ok_or_else(|| not_found(type_name, qualified_name))?;
        let Some(tags) = entities
            .get_mut(&guid)
            .and_then(|entity| entity.get_mut("classifications"))
            .and_then(Value::as_array_mut)
        else {
            return Err(CatalogError::NotFoundTag {
                tag: tag_name.to_string(),
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            });
        };

        let before = tags.len();
        tags.retain(|tag| tag["typeName"].as_str() != Some(tag_name));
        if tags.len() == before {
            return Err(CatalogError::NotFoundTag {
                tag: tag_name.to_string(),
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::SequentialGuids;
    use crate::model::Table;

    const QN: &str = "default/snowflake/1/DB/RAW/ORDERS";

    #[tokio::test]
    async fn create_assigns_uuid_and_reports_temporary_guid() {
        let catalog = InMemoryCatalog::new();
        let table = Table::creator("ORDERS", "default/snowflake/1/DB/RAW")
            .unwrap()
            .with_temp_guid(&SequentialGuids::new());
        let response = table.save(&catalog).await.unwrap();

        let assigned = response.assigned_guid("-1").unwrap();
        assert!(Uuid::parse_str(assigned).is_ok());
        assert_eq!(response.created().len(), 1);
        assert_eq!(response.created()[0].guid(), Some(assigned));
        assert_eq!(catalog.len().await, 1);
    }

    #[tokio::test]
    async fn second_save_updates_in_place() {
        let catalog = InMemoryCatalog::new();
        Table::updater(QN, "ORDERS").save(&catalog).await.unwrap();
        let response = Table::updater(QN, "ORDERS")
            .with_description("orders")
            .save(&catalog)
            .await
            .unwrap();
        assert!(response.created().is_empty());
        assert_eq!(response.updated().len(), 1);
        assert_eq!(catalog.len().await, 1);
    }

    #[tokio::test]
    async fn relationships_are_stripped_unless_requested() {
        let catalog = InMemoryCatalog::new();
        Table::creator("ORDERS", "default/snowflake/1/DB/RAW")
            .unwrap()
            .save(&catalog)
            .await
            .unwrap();

        let bare = catalog.get_by_qualified_name("Table", QN, false).await.unwrap().unwrap();
        let full = catalog.get_by_qualified_name("Table", QN, true).await.unwrap().unwrap();
        let bare = bare.into_asset::<crate::model::TableAttributes>().unwrap();
        let full = full.into_asset::<crate::model::TableAttributes>().unwrap();
        assert!(bare.detail().schema.is_none());
        assert!(full.detail().schema.is_some());
        assert_eq!(bare.detail().schema_name.as_deref(), Some("RAW"));
    }

    #[tokio::test]
    async fn removing_an_unassigned_tag_fails() {
        let catalog = InMemoryCatalog::new();
        Table::updater(QN, "ORDERS").save(&catalog).await.unwrap();
        let err = catalog.remove_atlan_tag("Table", QN, "PII").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFoundTag { ref tag, .. } if tag == "PII"));
    }

    #[test]
    fn references_match_by_guid_or_qualified_name() {
        let by_guid = json!({"typeName": "AtlasGlossaryTerm", "guid": "t1"});
        let by_qn = json!({"typeName": "AtlasGlossaryTerm", "uniqueAttributes": {"qualifiedName": "g/t"}});
        assert!(same_reference(&by_guid, &by_guid.clone()));
        assert!(same_reference(&by_qn, &by_qn.clone()));
        assert!(!same_reference(&by_guid, &by_qn));
        assert!(!same_reference(&by_guid, &json!({"typeName": "Table", "guid": "t1"})));
    }
}
