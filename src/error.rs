//! Error taxonomy for the catalog object model.
//!
//! Validation and classification errors are raised locally, before or right
//! after a transport call. Transport failures arrive as `Transport` and are
//! never retried here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Placeholder used when a lookup is attempted without an identifier.
pub const NULL_ID: &str = "(null)";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("missing required relationship parameter on {type_name}: {fields}")]
    MissingRequiredRelationshipParam { type_name: String, fields: String },

    #[error("missing required update parameter on {type_name}: {fields}")]
    MissingRequiredUpdateParam { type_name: String, fields: String },

    #[error("asset not found by guid: {0}")]
    NotFoundByGuid(String),

    #[error("asset not found by qualifiedName {qualified_name} (type {type_name})")]
    NotFoundByQualifiedName {
        type_name: String,
        qualified_name: String,
    },

    #[error("asset {id} is a {found}, not the requested type {expected}")]
    WrongType {
        id: String,
        found: String,
        expected: String,
    },

    #[error("atlan tag {tag} is not assigned to {type_name} {qualified_name}")]
    NotFoundTag {
        tag: String,
        type_name: String,
        qualified_name: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport: {0}")]
    Transport(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingRequiredRelationshipParam { .. }
            | Self::MissingRequiredUpdateParam { .. }
            | Self::InvalidRequest(_) => 400,
            Self::NotFoundByGuid(_)
            | Self::NotFoundByQualifiedName { .. }
            | Self::WrongType { .. }
            | Self::NotFoundTag { .. } => 404,
            Self::Serialization(_) | Self::Transport(_) => 500,
        }
    }

    /// True for every lookup miss, including a hit of the wrong type.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }

    pub(crate) fn missing_relationship(type_name: &str, fields: &[&str]) -> Self {
        Self::MissingRequiredRelationshipParam {
            type_name: type_name.to_string(),
            fields: fields.join(", "),
        }
    }

    pub(crate) fn missing_update(type_name: &str, fields: &[&str]) -> Self {
        Self::MissingRequiredUpdateParam {
            type_name: type_name.to_string(),
            fields: fields.join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── status_code ──────────────────────────────────────────────

    #[test]
    fn status_code_validation_errors() {
        assert_eq!(
            CatalogError::missing_relationship("Table", &["qualifiedName"]).status_code(),
            400
        );
        assert_eq!(
            CatalogError::missing_update("Table", &["qualifiedName", "name"]).status_code(),
            400
        );
        assert_eq!(CatalogError::InvalidRequest("x".into()).status_code(), 400);
    }

    #[test]
    fn status_code_lookup_misses() {
        assert_eq!(CatalogError::NotFoundByGuid(NULL_ID.into()).status_code(), 404);
        let wrong = CatalogError::WrongType {
            id: "abc".into(),
            found: "Table".into(),
            expected: "AirflowTask".into(),
        };
        assert!(wrong.is_not_found());
    }

    #[test]
    fn status_code_transport() {
        let err = CatalogError::Transport(anyhow::anyhow!("connection reset"));
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_not_found());
    }

    // ── Display ──────────────────────────────────────────────────

    #[test]
    fn display_missing_relationship_lists_fields() {
        let err = CatalogError::missing_relationship("AirflowDag", &["guid", "qualifiedName"]);
        assert_eq!(
            err.to_string(),
            "missing required relationship parameter on AirflowDag: guid, qualifiedName"
        );
    }

    #[test]
    fn display_not_found_by_guid_null() {
        let err = CatalogError::NotFoundByGuid(NULL_ID.into());
        assert_eq!(err.to_string(), "asset not found by guid: (null)");
    }

    #[test]
    fn display_wrong_type_names_both_types() {
        let err = CatalogError::WrongType {
            id: "default/snowflake/1/db".into(),
            found: "Database".into(),
            expected: "Schema".into(),
        };
        assert_eq!(
            err.to_string(),
            "asset default/snowflake/1/db is a Database, not the requested type Schema"
        );
    }
}
