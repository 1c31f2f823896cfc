//! Concrete asset kinds.
//!
//! Each kind is a detail struct deriving `AssetKind` plus a type alias over
//! `Asset<_>` that hosts its `creator` constructors. Everything else
//! (updater, trimming, mutations, retrieval) is shared through `Asset<K>`.

pub mod airflow;
pub mod connection;
pub mod dbt;
pub mod generic;
pub mod powerbi;
pub mod process;
pub mod sql;

pub use airflow::{AirflowDag, AirflowDagAttributes, AirflowTask, AirflowTaskAttributes};
pub use connection::{Connection, ConnectionAttributes};
pub use dbt::{DbtTag, DbtTagAttributes};
pub use generic::{GenericAsset, GenericAttributes};
pub use powerbi::{
    PowerBIPage, PowerBIPageAttributes, PowerBIReport, PowerBIReportAttributes,
    PowerBIWorkspace, PowerBIWorkspaceAttributes,
};
pub use process::{lineage_ref, LineageRef, Process, ProcessAttributes};
pub use sql::{Database, DatabaseAttributes, Schema, SchemaAttributes, Table, TableAttributes};
