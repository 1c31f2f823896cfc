//! Power BI: PowerBIWorkspace → PowerBIReport → PowerBIPage.
//!
//! Workspaces and reports are keyed by their source-system ids, not by
//! display name, so renaming a report in Power BI keeps its qualifiedName.

use serde::{Deserialize, Serialize};

use crate::asset::{Asset, AssetKind};
use crate::error::Result;
use crate::qualified_name;
use crate::reference::Reference;

pub type PowerBIWorkspace = Asset<PowerBIWorkspaceAttributes>;
pub type PowerBIReport = Asset<PowerBIReportAttributes>;
pub type PowerBIPage = Asset<PowerBIPageAttributes>;

const GROUPS: &str = "groups";
const REPORTS: &str = "reports";
const PAGES: &str = "pages";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "PowerBIWorkspace", capabilities(Catalog, Bi, PowerBi))]
#[serde(rename_all = "camelCase")]
pub struct PowerBIWorkspaceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "PowerBIReport", capabilities(Catalog, Bi, PowerBi))]
#[serde(rename_all = "camelCase")]
pub struct PowerBIReportAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "PowerBIPage", capabilities(Catalog, Bi, PowerBi))]
#[serde(rename_all = "camelCase")]
pub struct PowerBIPageAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Reference>,
}

impl Asset<PowerBIWorkspaceAttributes> {
    /// `{connection}/groups/{workspace_id}`
    pub fn generate_qualified_name(connection_qualified_name: &str, workspace_id: &str) -> String {
        qualified_name::join(connection_qualified_name, &[GROUPS, workspace_id])
    }

    pub fn creator(name: &str, connection_qualified_name: &str, workspace_id: &str) -> Result<Self> {
        let type_name = PowerBIWorkspaceAttributes::TYPE_NAME;
        let connection_qn =
            qualified_name::require(type_name, "connectionQualifiedName", connection_qualified_name)?;
        let workspace_id = qualified_name::require(type_name, "workspaceId", workspace_id)?;
        Ok(Self::contained(
            Self::generate_qualified_name(connection_qn, workspace_id),
            name,
            Some(connection_qn.to_string()),
        ))
    }
}

impl Asset<PowerBIReportAttributes> {
    /// `{workspace}/reports/{report_id}`
    pub fn generate_qualified_name(workspace_qualified_name: &str, report_id: &str) -> String {
        qualified_name::join(workspace_qualified_name, &[REPORTS, report_id])
    }

    pub fn creator(name: &str, workspace_qualified_name: &str, report_id: &str) -> Result<Self> {
        let type_name = PowerBIReportAttributes::TYPE_NAME;
        let workspace_qn =
            qualified_name::require(type_name, "workspaceQualifiedName", workspace_qualified_name)?;
        qualified_name::require(type_name, "reportId", report_id)?;
        Ok(Self::build(
            name,
            workspace_qn,
            report_id,
            qualified_name::connection_qualified_name(workspace_qn),
            PowerBIWorkspace::ref_by_qualified_name(workspace_qn),
        ))
    }

    pub fn creator_in(name: &str, workspace: &PowerBIWorkspace, report_id: &str) -> Result<Self> {
        qualified_name::require_fields(
            &workspace.type_name,
            &[
                ("qualifiedName", workspace.qualified_name()),
                ("connectionQualifiedName", workspace.connection_qualified_name()),
            ],
        )?;
        qualified_name::require(PowerBIReportAttributes::TYPE_NAME, "reportId", report_id)?;
        Ok(Self::build(
            name,
            workspace.qualified_name().unwrap_or_default(),
            report_id,
            workspace.attributes.connection_qualified_name.clone(),
            workspace.trim_to_reference()?,
        ))
    }

    fn build(
        name: &str,
        workspace_qn: &str,
        report_id: &str,
        connection_qn: Option<String>,
        workspace: Reference,
    ) -> Self {
        Self::contained(
            Self::generate_qualified_name(workspace_qn, report_id),
            name,
            connection_qn,
        )
        .with_detail(|detail| {
            detail.workspace_qualified_name = Some(workspace_qn.to_string());
            detail.workspace = Some(workspace);
        })
    }
}

impl Asset<PowerBIPageAttributes> {
    /// `{report}/pages/{page}`
    pub fn generate_qualified_name(report_qualified_name: &str, page: &str) -> String {
        qualified_name::join(report_qualified_name, &[PAGES, page])
    }

    /// Pages have no stable id of their own and are keyed by name.
    pub fn creator(name: &str, report_qualified_name: &str) -> Result<Self> {
        let report_qn = qualified_name::require(
            PowerBIPageAttributes::TYPE_NAME,
            "reportQualifiedName",
            report_qualified_name,
        )?;
        Ok(Self::build(
            name,
            report_qn,
            qualified_name::connection_qualified_name(report_qn),
            PowerBIReport::ref_by_qualified_name(report_qn),
        ))
    }

    pub fn creator_in(name: &str, report: &PowerBIReport) -> Result<Self> {
        qualified_name::require_fields(
            &report.type_name,
            &[
                ("qualifiedName", report.qualified_name()),
                ("connectionQualifiedName", report.connection_qualified_name()),
            ],
        )?;
        Ok(Self::build(
            name,
            report.qualified_name().unwrap_or_default(),
            report.attributes.connection_qualified_name.clone(),
            report.trim_to_reference()?,
        ))
    }

    fn build(name: &str, report_qn: &str, connection_qn: Option<String>, report: Reference) -> Self {
        // {workspace}/reports/{id}
        let workspace_qn = qualified_name::ancestor(report_qn, 2);
        Self::contained(Self::generate_qualified_name(report_qn, name), name, connection_qn)
            .with_detail(|detail| {
                detail.workspace_qualified_name = workspace_qn.map(str::to_string);
                detail.report_qualified_name = Some(report_qn.to_string());
                detail.report = Some(report);
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::reference::ReferenceKey;

    const CONN: &str = "default/powerbi/1700000000";

    #[test]
    fn workspace_is_keyed_by_id_under_groups() {
        let workspace = PowerBIWorkspace::creator("Finance", CONN, "ws-42").unwrap();
        assert_eq!(
            workspace.qualified_name(),
            Some("default/powerbi/1700000000/groups/ws-42")
        );
        assert_eq!(workspace.name(), Some("Finance"));
        assert_eq!(workspace.attributes.connector_name.as_deref(), Some("powerbi"));
    }

    #[test]
    fn report_and_page_chain() {
        let workspace = PowerBIWorkspace::creator("Finance", CONN, "ws-42").unwrap();
        let report = PowerBIReport::creator_in("Revenue", &workspace, "r-7").unwrap();
        assert_eq!(
            report.qualified_name(),
            Some("default/powerbi/1700000000/groups/ws-42/reports/r-7")
        );
        assert_eq!(report.connection_qualified_name(), Some(CONN));

        let page = PowerBIPage::creator_in("Overview", &report).unwrap();
        assert_eq!(
            page.qualified_name(),
            Some("default/powerbi/1700000000/groups/ws-42/reports/r-7/pages/Overview")
        );
        assert_eq!(
            page.detail().workspace_qualified_name.as_deref(),
            Some("default/powerbi/1700000000/groups/ws-42")
        );
        assert_eq!(
            page.detail().report.as_ref().unwrap().key,
            ReferenceKey::QualifiedName(
                "default/powerbi/1700000000/groups/ws-42/reports/r-7".into()
            )
        );
    }

    #[test]
    fn report_requires_its_source_id() {
        let err = PowerBIReport::creator("Revenue", "default/powerbi/1/groups/ws", "").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingRequiredRelationshipParam { ref fields, .. } if fields == "reportId"
        ));
    }

    #[test]
    fn page_from_bare_report_fails_fast() {
        let err = PowerBIPage::creator_in("Overview", &PowerBIReport::new()).unwrap_err();
        match err {
            CatalogError::MissingRequiredRelationshipParam { type_name, fields } => {
                assert_eq!(type_name, "PowerBIReport");
                assert_eq!(fields, "qualifiedName, connectionQualifiedName");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
