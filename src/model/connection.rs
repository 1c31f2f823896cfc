//! Connections: the root of every qualifiedName hierarchy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetKind};
use crate::error::Result;
use crate::qualified_name;

pub type Connection = Asset<ConnectionAttributes>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "Connection")]
#[serde(rename_all = "camelCase")]
pub struct ConnectionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_query: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_users: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_groups: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_roles: Option<BTreeSet<String>>,
}

impl Asset<ConnectionAttributes> {
    /// `default/{connector}/{epoch_seconds}`
    pub fn generate_qualified_name(connector: &str, epoch_seconds: i64) -> String {
        qualified_name::join("default", &[connector, &epoch_seconds.to_string()])
    }

    /// New connection stamped with the current time.
    pub fn creator(name: &str, connector: &str) -> Result<Self> {
        Self::creator_at(name, connector, chrono::Utc::now().timestamp())
    }

    pub fn creator_at(name: &str, connector: &str, epoch_seconds: i64) -> Result<Self> {
        qualified_name::require(ConnectionAttributes::TYPE_NAME, "connectorName", connector)?;
        let mut connection =
            Self::contained(Self::generate_qualified_name(connector, epoch_seconds), name, None);
        connection.attributes.connector_name = Some(connector.to_string());
        Ok(connection)
    }

    pub fn with_admin_users<I, S>(self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users: BTreeSet<String> = users.into_iter().map(Into::into).collect();
        self.with_detail(|detail| detail.admin_users = Some(users))
    }
}
