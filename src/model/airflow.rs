//! Airflow pipelines: AirflowDag → AirflowTask.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetKind};
use crate::capability::Catalog;
use crate::error::Result;
use crate::qualified_name;
use crate::reference::Reference;

pub type AirflowDag = Asset<AirflowDagAttributes>;
pub type AirflowTask = Asset<AirflowTaskAttributes>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "AirflowDag", capabilities(Catalog, Airflow))]
#[serde(rename_all = "camelCase")]
pub struct AirflowDagAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_dag_schedule: Option<String>,
    /// Schedule interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_dag_schedule_delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_run_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_tasks: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "AirflowTask", capabilities(Catalog, Airflow))]
#[serde(rename_all = "camelCase")]
pub struct AirflowTaskAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_operator_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_dag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_dag_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_retry_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_pool_slots: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_queue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_priority_weight: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_task_trigger_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_dag: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Reference>>,
}

impl Asset<AirflowDagAttributes> {
    pub fn creator(name: &str, connection_qualified_name: &str) -> Result<Self> {
        let connection_qn = qualified_name::require(
            AirflowDagAttributes::TYPE_NAME,
            "connectionQualifiedName",
            connection_qualified_name,
        )?;
        Ok(Self::contained(
            qualified_name::join(connection_qn, &[name]),
            name,
            Some(connection_qn.to_string()),
        ))
    }
}

impl Asset<AirflowTaskAttributes> {
    pub fn creator(name: &str, airflow_dag_qualified_name: &str) -> Result<Self> {
        let dag_qn = qualified_name::require(
            AirflowTaskAttributes::TYPE_NAME,
            "airflowDagQualifiedName",
            airflow_dag_qualified_name,
        )?;
        Ok(Self::build(
            name,
            dag_qn,
            qualified_name::connection_qualified_name(dag_qn),
            AirflowDag::ref_by_qualified_name(dag_qn),
        ))
    }

    pub fn creator_in(name: &str, dag: &AirflowDag) -> Result<Self> {
        qualified_name::require_fields(
            &dag.type_name,
            &[
                ("qualifiedName", dag.qualified_name()),
                ("connectionQualifiedName", dag.connection_qualified_name()),
            ],
        )?;
        Ok(Self::build(
            name,
            dag.qualified_name().unwrap_or_default(),
            dag.attributes.connection_qualified_name.clone(),
            dag.trim_to_reference()?,
        ))
    }

    /// `{dag}/{task}`
    pub fn generate_qualified_name(name: &str, airflow_dag_qualified_name: &str) -> String {
        qualified_name::join(airflow_dag_qualified_name, &[name])
    }

    fn build(name: &str, dag_qn: &str, connection_qn: Option<String>, dag: Reference) -> Self {
        Self::contained(Self::generate_qualified_name(name, dag_qn), name, connection_qn)
            .with_detail(|detail| {
                detail.airflow_dag_name = Some(qualified_name::name_from(dag_qn).to_string());
                detail.airflow_dag_qualified_name = Some(dag_qn.to_string());
                detail.airflow_dag = Some(dag);
            })
    }

    /// Add a data asset the task reads from.
    pub fn with_input<C: Catalog>(mut self, asset: &Asset<C>) -> Result<Self> {
        let reference = asset.trim_to_reference()?;
        self.detail_mut().inputs.get_or_insert_with(Vec::new).push(reference);
        Ok(self)
    }

    /// Add a data asset the task writes to.
    pub fn with_output<C: Catalog>(mut self, asset: &Asset<C>) -> Result<Self> {
        let reference = asset.trim_to_reference()?;
        self.detail_mut().outputs.get_or_insert_with(Vec::new).push(reference);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::model::Table;
    use crate::reference::ReferenceKey;

    #[test]
    fn task_creator_derives_dag_fields() {
        let task = AirflowTask::creator("task1", "conn1/dag1").unwrap();
        assert_eq!(task.qualified_name(), Some("conn1/dag1/task1"));
        assert_eq!(task.name(), Some("task1"));
        assert_eq!(task.detail().airflow_dag_qualified_name.as_deref(), Some("conn1/dag1"));
        assert_eq!(task.detail().airflow_dag_name.as_deref(), Some("dag1"));
        assert_eq!(
            task.detail().airflow_dag.as_ref().unwrap().key,
            ReferenceKey::QualifiedName("conn1/dag1".into())
        );
    }

    #[test]
    fn task_creator_is_deterministic() {
        let first = AirflowTask::creator("task1", "conn/dag1").unwrap();
        let second = AirflowTask::creator("task1", "conn/dag1").unwrap();
        assert_eq!(first.qualified_name(), Some("conn/dag1/task1"));
        assert_eq!(first, second);
    }

    #[test]
    fn task_under_connection_rooted_dag_picks_up_connection() {
        let dag = AirflowDag::creator("etl", "default/airflow/1700000000").unwrap();
        let task = AirflowTask::creator_in("extract", &dag).unwrap();
        assert_eq!(task.qualified_name(), Some("default/airflow/1700000000/etl/extract"));
        assert_eq!(task.connection_qualified_name(), Some("default/airflow/1700000000"));
        assert_eq!(task.attributes.connector_name.as_deref(), Some("airflow"));
    }

    #[test]
    fn task_from_dag_without_qualified_name_fails_fast() {
        let err = AirflowTask::creator_in("extract", &AirflowDag::new()).unwrap_err();
        match err {
            CatalogError::MissingRequiredRelationshipParam { type_name, fields } => {
                assert_eq!(type_name, "AirflowDag");
                assert_eq!(fields, "qualifiedName, connectionQualifiedName");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn task_creator_rejects_empty_dag() {
        assert!(matches!(
            AirflowTask::creator("task1", ""),
            Err(CatalogError::MissingRequiredRelationshipParam { .. })
        ));
    }

    #[test]
    fn inputs_and_outputs_are_trimmed() {
        let source = Table::creator("SRC", "default/snowflake/1/DB/RAW").unwrap();
        let target = Table::creator("DST", "default/snowflake/1/DB/MART").unwrap();
        let task = AirflowTask::creator("load", "default/airflow/1/etl")
            .unwrap()
            .with_input(&source)
            .unwrap()
            .with_output(&target)
            .unwrap();
        let inputs = task.detail().inputs.as_ref().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].qualified_name(), Some("default/snowflake/1/DB/RAW/SRC"));
        assert_eq!(inputs[0].type_name, "Table");
        assert_eq!(
            task.detail().outputs.as_ref().unwrap()[0].qualified_name(),
            Some("default/snowflake/1/DB/MART/DST")
        );
    }
}
