//! dbt tags, namespaced by dbt Cloud account and project.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetKind};
use crate::error::Result;
use crate::qualified_name;

pub type DbtTag = Asset<DbtTagAttributes>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "DbtTag", capabilities(Catalog, Dbt))]
#[serde(rename_all = "camelCase")]
pub struct DbtTagAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbt_unique_id: Option<String>,
    /// Catalog tag this dbt tag is synchronised to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_classification_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_allowed_values: Option<BTreeSet<String>>,
}

impl Asset<DbtTagAttributes> {
    /// `{connection}/account/{account}/project/{project}/tag/{tag}`
    pub fn generate_qualified_name(
        tag_name: &str,
        connection_qualified_name: &str,
        account_name: &str,
        project_name: &str,
    ) -> String {
        qualified_name::join(
            connection_qualified_name,
            &["account", account_name, "project", project_name, "tag", tag_name],
        )
    }

    pub fn creator(
        name: &str,
        connection_qualified_name: &str,
        account_name: &str,
        project_name: &str,
    ) -> Result<Self> {
        let type_name = DbtTagAttributes::TYPE_NAME;
        let connection_qn =
            qualified_name::require(type_name, "connectionQualifiedName", connection_qualified_name)?;
        let account = qualified_name::require(type_name, "dbtAccountName", account_name)?;
        let project = qualified_name::require(type_name, "dbtProjectName", project_name)?;
        Ok(Self::contained(
            Self::generate_qualified_name(name, connection_qn, account, project),
            name,
            Some(connection_qn.to_string()),
        )
        .with_detail(|detail| {
            detail.dbt_account_name = Some(account.to_string());
            detail.dbt_project_name = Some(project.to_string());
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    #[test]
    fn qualified_name_inserts_account_and_project() {
        assert_eq!(
            DbtTag::generate_qualified_name("tagA", "conn1", "acct1", "proj1"),
            "conn1/account/acct1/project/proj1/tag/tagA"
        );
    }

    #[test]
    fn creator_records_namespace() {
        let tag = DbtTag::creator("pii", "default/dbt/1700000000", "acme", "warehouse").unwrap();
        assert_eq!(
            tag.qualified_name(),
            Some("default/dbt/1700000000/account/acme/project/warehouse/tag/pii")
        );
        assert_eq!(tag.detail().dbt_account_name.as_deref(), Some("acme"));
        assert_eq!(tag.detail().dbt_project_name.as_deref(), Some("warehouse"));
        assert_eq!(tag.attributes.connector_name.as_deref(), Some("dbt"));
    }

    #[test]
    fn creator_rejects_missing_project() {
        let err = DbtTag::creator("pii", "default/dbt/1", "acme", "").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingRequiredRelationshipParam { ref fields, .. } if fields == "dbtProjectName"
        ));
    }
}
