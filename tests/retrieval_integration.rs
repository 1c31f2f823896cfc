//! Retrieval against the in-memory catalog:
//! - guid vs qualifiedName lookups
//! - not-found variants per lookup path
//! - wrong-type classification
//! - projected fetch
//! - archive / restore lifecycle

use meta_catalog::model::{
    AirflowDag, AirflowTask, AirflowTaskAttributes, Table, TableAttributes,
};
use meta_catalog::{Asset, CatalogClient, CatalogError, InMemoryCatalog, SequentialGuids};

const DAG_QN: &str = "default/airflow/1700000000/etl";

async fn seeded() -> (InMemoryCatalog, String) {
    let catalog = InMemoryCatalog::new();
    let guids = SequentialGuids::new();
    let dag = AirflowDag::creator("etl", "default/airflow/1700000000")
        .unwrap()
        .with_temp_guid(&guids);
    dag.save(&catalog).await.unwrap();

    let task = AirflowTask::creator("extract", DAG_QN)
        .unwrap()
        .with_description("pulls orders")
        .with_detail(|detail| detail.airflow_task_retry_number = Some(3))
        .with_temp_guid(&guids);
    let response = task.save(&catalog).await.unwrap();
    let guid = response.assigned_guid("-2").unwrap().to_string();
    (catalog, guid)
}

#[tokio::test]
async fn get_without_id_fails_before_any_request() {
    let catalog = InMemoryCatalog::new();
    let err = AirflowTask::get(&catalog, None, false).await.unwrap_err();
    match err {
        CatalogError::NotFoundByGuid(id) => assert_eq!(id, "(null)"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(catalog.request_count(), 0);
}

#[tokio::test]
async fn get_by_guid_and_by_qualified_name_agree() {
    let (catalog, guid) = seeded().await;
    let by_guid = AirflowTask::get(&catalog, Some(&guid), false).await.unwrap();
    let by_qn = AirflowTask::get(&catalog, Some("default/airflow/1700000000/etl/extract"), false)
        .await
        .unwrap();
    assert_eq!(by_guid.guid(), Some(guid.as_str()));
    assert_eq!(by_guid, by_qn);
    assert_eq!(by_guid.detail().airflow_task_retry_number, Some(3));
    assert_eq!(by_guid.detail().airflow_dag_name.as_deref(), Some("etl"));
}

#[tokio::test]
async fn relationships_only_when_requested() {
    let (catalog, guid) = seeded().await;
    let bare = AirflowTask::get(&catalog, Some(&guid), false).await.unwrap();
    assert!(bare.detail().airflow_dag.is_none());

    let full = AirflowTask::get(&catalog, Some(&guid), true).await.unwrap();
    let dag = full.detail().airflow_dag.as_ref().unwrap();
    assert_eq!(dag.type_name, "AirflowDag");
    assert_eq!(dag.qualified_name(), Some(DAG_QN));
}

#[tokio::test]
async fn wrong_kind_names_both_types() {
    let (catalog, guid) = seeded().await;
    let err = Table::get(&catalog, Some(&guid), false).await.unwrap_err();
    match err {
        CatalogError::WrongType { id, found, expected } => {
            assert_eq!(id, guid);
            assert_eq!(found, "AirflowTask");
            assert_eq!(expected, "Table");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn misses_report_the_lookup_path() {
    let (catalog, _) = seeded().await;

    let missing_guid = "0b3e1c2d-4a5f-4b6c-8d7e-9f0a1b2c3d4e";
    let err = AirflowTask::get(&catalog, Some(missing_guid), false).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFoundByGuid(ref id) if id == missing_guid));

    let err = Table::get(&catalog, Some("default/snowflake/1/DB/RAW/NOPE"), false)
        .await
        .unwrap_err();
    match err {
        CatalogError::NotFoundByQualifiedName { type_name, qualified_name } => {
            assert_eq!(type_name, "Table");
            assert_eq!(qualified_name, "default/snowflake/1/DB/RAW/NOPE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn projected_get_returns_only_requested_attributes() {
    let (catalog, guid) = seeded().await;
    let before = catalog.request_count();
    let task = AirflowTask::get_projected(&catalog, Some(&guid), &["airflowTaskRetryNumber"], &[])
        .await
        .unwrap();
    assert_eq!(catalog.request_count(), before + 1);
    assert_eq!(task.name(), Some("extract"));
    assert_eq!(task.detail().airflow_task_retry_number, Some(3));
    assert!(task.attributes.description.is_none());
    assert!(task.detail().airflow_dag_name.is_none());
}

#[tokio::test]
async fn projected_get_by_qualified_name_misses_cleanly() {
    let (catalog, _) = seeded().await;
    let err = Asset::<TableAttributes>::get_projected(&catalog, Some(DAG_QN), &["name"], &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn archive_then_restore() {
    let (catalog, _) = seeded().await;
    let qn = "default/airflow/1700000000/etl/extract";

    assert!(catalog.archive("AirflowTask", qn).await);
    let archived = AirflowTask::get(&catalog, Some(qn), false).await.unwrap();
    assert!(archived.is_archived());

    // projected lookups only see active entities
    let err = Asset::<AirflowTaskAttributes>::get_projected(&catalog, Some(qn), &[], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFoundByQualifiedName { .. }));

    assert!(AirflowTask::restore(&catalog, qn).await.unwrap());
    let restored = AirflowTask::get(&catalog, Some(qn), false).await.unwrap();
    assert!(!restored.is_archived());

    // already active is not an error
    assert!(AirflowTask::restore(&catalog, qn).await.unwrap());
}

#[tokio::test]
async fn restore_of_unknown_entity_fails() {
    let catalog = InMemoryCatalog::new();
    let err = AirflowTask::restore(&catalog, "default/airflow/1/etl/ghost")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn client_trait_objects_are_interchangeable() {
    let (catalog, guid) = seeded().await;
    let client: &dyn CatalogClient = &catalog;
    let record = client.get_by_guid(&guid, false).await.unwrap().unwrap();
    assert_eq!(record.type_name(), "AirflowTask");
    assert!(record.into_asset::<AirflowTaskAttributes>().is_ok());
}
