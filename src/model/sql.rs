//! Relational database objects: Database → Schema → Table.

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetKind};
use crate::error::Result;
use crate::model::Connection;
use crate::qualified_name;
use crate::reference::Reference;

pub type Database = Asset<DatabaseAttributes>;
pub type Schema = Asset<SchemaAttributes>;
pub type Table = Asset<TableAttributes>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "Database", capabilities(Catalog, Sql))]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "Schema", capabilities(Catalog, Sql))]
#[serde(rename_all = "camelCase")]
pub struct SchemaAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "Table", capabilities(Catalog, Sql))]
#[serde(rename_all = "camelCase")]
pub struct TableAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_partitioned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Reference>,
}

impl Asset<DatabaseAttributes> {
    pub fn creator(name: &str, connection_qualified_name: &str) -> Result<Self> {
        let connection_qn = qualified_name::require(
            DatabaseAttributes::TYPE_NAME,
            "connectionQualifiedName",
            connection_qualified_name,
        )?;
        Ok(Self::build(
            name,
            connection_qn,
            Connection::ref_by_qualified_name(connection_qn),
        ))
    }

    pub fn creator_in(name: &str, connection: &Connection) -> Result<Self> {
        qualified_name::require_fields(
            &connection.type_name,
            &[("qualifiedName", connection.qualified_name())],
        )?;
        Ok(Self::build(
            name,
            connection.qualified_name().unwrap_or_default(),
            connection.trim_to_reference()?,
        ))
    }

    fn build(name: &str, connection_qn: &str, connection: Reference) -> Self {
        Self::contained(
            qualified_name::join(connection_qn, &[name]),
            name,
            Some(connection_qn.to_string()),
        )
        .with_detail(|detail| detail.connection = Some(connection))
    }
}

impl Asset<SchemaAttributes> {
    pub fn creator(name: &str, database_qualified_name: &str) -> Result<Self> {
        let database_qn = qualified_name::require(
            SchemaAttributes::TYPE_NAME,
            "databaseQualifiedName",
            database_qualified_name,
        )?;
        Ok(Self::build(
            name,
            database_qn,
            qualified_name::connection_qualified_name(database_qn),
            Database::ref_by_qualified_name(database_qn),
        ))
    }

    pub fn creator_in(name: &str, database: &Database) -> Result<Self> {
        qualified_name::require_fields(
            &database.type_name,
            &[
                ("qualifiedName", database.qualified_name()),
                ("connectionQualifiedName", database.connection_qualified_name()),
            ],
        )?;
        Ok(Self::build(
            name,
            database.qualified_name().unwrap_or_default(),
            database.attributes.connection_qualified_name.clone(),
            database.trim_to_reference()?,
        ))
    }

    fn build(
        name: &str,
        database_qn: &str,
        connection_qn: Option<String>,
        database: Reference,
    ) -> Self {
        Self::contained(qualified_name::join(database_qn, &[name]), name, connection_qn)
            .with_detail(|detail| {
                detail.database_name = Some(qualified_name::name_from(database_qn).to_string());
                detail.database_qualified_name = Some(database_qn.to_string());
                detail.database = Some(database);
            })
    }
}

impl Asset<TableAttributes> {
    pub fn creator(name: &str, schema_qualified_name: &str) -> Result<Self> {
        let schema_qn = qualified_name::require(
            TableAttributes::TYPE_NAME,
            "schemaQualifiedName",
            schema_qualified_name,
        )?;
        Ok(Self::build(
            name,
            schema_qn,
            qualified_name::connection_qualified_name(schema_qn),
            Schema::ref_by_qualified_name(schema_qn),
        ))
    }

    pub fn creator_in(name: &str, schema: &Schema) -> Result<Self> {
        qualified_name::require_fields(
            &schema.type_name,
            &[
                ("qualifiedName", schema.qualified_name()),
                ("connectionQualifiedName", schema.connection_qualified_name()),
            ],
        )?;
        Ok(Self::build(
            name,
            schema.qualified_name().unwrap_or_default(),
            schema.attributes.connection_qualified_name.clone(),
            schema.trim_to_reference()?,
        ))
    }

    fn build(name: &str, schema_qn: &str, connection_qn: Option<String>, schema: Reference) -> Self {
        let database_qn = qualified_name::ancestor(schema_qn, 1);
        Self::contained(qualified_name::join(schema_qn, &[name]), name, connection_qn).with_detail(
            |detail| {
                detail.schema_name = Some(qualified_name::name_from(schema_qn).to_string());
                detail.schema_qualified_name = Some(schema_qn.to_string());
                detail.database_name = database_qn.map(|qn| qualified_name::name_from(qn).to_string());
                detail.database_qualified_name = database_qn.map(str::to_string);
                detail.schema = Some(schema);
            },
        )
    }
}
