//! Single-page index search requests.
//!
//! Only what the retrieval façade needs: a conjunction of exact-term filters,
//! the attributes to project, and a page size. No general query language.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::asset::EntityStatus;
use crate::record::AssetRecord;

pub const TYPE_NAME_FIELD: &str = "__typeName.keyword";
pub const GUID_FIELD: &str = "__guid";
pub const QUALIFIED_NAME_FIELD: &str = "qualifiedName";
pub const STATE_FIELD: &str = "__state";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFilter {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSearchRequest {
    pub filters: Vec<TermFilter>,
    pub attributes: Vec<String>,
    pub relation_attributes: Vec<String>,
    pub page_size: usize,
}

impl Default for IndexSearchRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            attributes: Vec::new(),
            relation_attributes: Vec::new(),
            page_size: 20,
        }
    }
}

impl IndexSearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_term(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(TermFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn where_type(self, type_name: &str) -> Self {
        self.where_term(TYPE_NAME_FIELD, type_name)
    }

    pub fn where_guid(self, guid: &str) -> Self {
        self.where_term(GUID_FIELD, guid)
    }

    pub fn where_qualified_name(self, qualified_name: &str) -> Self {
        self.where_term(QUALIFIED_NAME_FIELD, qualified_name)
    }

    /// Exclude archived entities.
    pub fn active_only(self) -> Self {
        self.where_term(STATE_FIELD, "ACTIVE")
    }

    pub fn includes_on_results<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn includes_on_relations<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relation_attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// The value the filters expect for `field`, if one was set.
    pub fn term(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|filter| filter.field == field)
            .map(|filter| filter.value.as_str())
    }

    /// Request body for the index search endpoint.
    pub fn to_body(&self) -> Value {
        let filters: Vec<Value> = self
            .filters
            .iter()
            .map(|filter| json!({"term": {filter.field.as_str(): {"value": filter.value}}}))
            .collect();
        json!({
            "dsl": {
                "from": 0,
                "size": self.page_size,
                "query": {"bool": {"filter": filters}},
            },
            "attributes": self.attributes,
            "relationAttributes": self.relation_attributes,
        })
    }

    /// Whether an entity JSON object satisfies every filter.
    pub fn matches(&self, entity: &Value) -> bool {
        self.filters.iter().all(|filter| {
            let actual = match filter.field.as_str() {
                TYPE_NAME_FIELD => entity.get("typeName"),
                GUID_FIELD => entity.get("guid"),
                STATE_FIELD => entity.get("status"),
                field => entity.get("attributes").and_then(|attributes| attributes.get(field)),
            };
            match (filter.field.as_str(), actual.and_then(Value::as_str)) {
                (STATE_FIELD, None) => filter.value == status_str(EntityStatus::Active),
                (_, Some(actual)) => actual == filter.value,
                (_, None) => false,
            }
        })
    }
}

fn status_str(status: EntityStatus) -> &'static str {
    match status {
        EntityStatus::Active => "ACTIVE",
        EntityStatus::Deleted => "DELETED",
        EntityStatus::Purged => "PURGED",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchResponse {
    #[serde(default)]
    pub approximate_count: u64,
    #[serde(default)]
    pub entities: Vec<AssetRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_filters_projection_and_size() {
        let request = IndexSearchRequest::new()
            .where_type("AirflowTask")
            .where_qualified_name("conn1/dag1/task1")
            .active_only()
            .includes_on_results(["airflowDagName"])
            .includes_on_relations(["name"])
            .page_size(1);
        assert_eq!(
            request.to_body(),
            json!({
                "dsl": {
                    "from": 0,
                    "size": 1,
                    "query": {"bool": {"filter": [
                        {"term": {"__typeName.keyword": {"value": "AirflowTask"}}},
                        {"term": {"qualifiedName": {"value": "conn1/dag1/task1"}}},
                        {"term": {"__state": {"value": "ACTIVE"}}}
                    ]}}
                },
                "attributes": ["airflowDagName"],
                "relationAttributes": ["name"]
            })
        );
        assert_eq!(request.term(QUALIFIED_NAME_FIELD), Some("conn1/dag1/task1"));
    }

    #[test]
    fn matches_checks_every_filter() {
        let entity = json!({
            "typeName": "Table",
            "guid": "g1",
            "status": "ACTIVE",
            "attributes": {"qualifiedName": "q"}
        });
        assert!(IndexSearchRequest::new().where_type("Table").where_guid("g1").matches(&entity));
        assert!(!IndexSearchRequest::new().where_type("Schema").matches(&entity));
        assert!(IndexSearchRequest::new().where_qualified_name("q").active_only().matches(&entity));

        let archived = json!({"typeName": "Table", "status": "DELETED", "attributes": {}});
        assert!(!IndexSearchRequest::new().active_only().matches(&archived));
    }

    #[test]
    fn response_decodes_records() {
        let response: IndexSearchResponse = serde_json::from_value(json!({
            "approximateCount": 1,
            "entities": [{"typeName": "Table", "guid": "g", "attributes": {"name": "t"}}]
        }))
        .unwrap();
        assert_eq!(response.approximate_count, 1);
        assert_eq!(response.entities[0].name(), Some("t"));
    }
}
