//! Capabilities an asset kind can carry.
//!
//! Each capability is both a tag (for runtime inspection) and a marker trait
//! (for compile-time restriction of relationship targets). Kinds get both from
//! `#[derive(AssetKind)]` via `#[asset(capabilities(...))]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::asset::AssetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Data assets that can appear as lineage inputs and outputs.
    Catalog,
    Sql,
    Airflow,
    Bi,
    PowerBi,
    Dbt,
    /// Lineage processes.
    Lineage,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Sql => "sql",
            Self::Airflow => "airflow",
            Self::Bi => "bi",
            Self::PowerBi => "power_bi",
            Self::Dbt => "dbt",
            Self::Lineage => "lineage",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub trait Catalog: AssetKind {}
pub trait Sql: AssetKind {}
pub trait Airflow: AssetKind {}
pub trait Bi: AssetKind {}
pub trait PowerBi: AssetKind {}
pub trait Dbt: AssetKind {}
pub trait Lineage: AssetKind {}

/// Runtime check against a kind's declared capabilities.
pub fn has_capability<K: AssetKind>(capability: Capability) -> bool {
    K::CAPABILITIES.contains(&capability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirflowTaskAttributes, ConnectionAttributes, ProcessAttributes, TableAttributes};

    #[test]
    fn derived_capabilities_are_visible_at_runtime() {
        assert!(has_capability::<TableAttributes>(Capability::Catalog));
        assert!(has_capability::<TableAttributes>(Capability::Sql));
        assert!(!has_capability::<TableAttributes>(Capability::Airflow));
        assert!(has_capability::<AirflowTaskAttributes>(Capability::Airflow));
        assert!(has_capability::<ProcessAttributes>(Capability::Lineage));
        assert!(!has_capability::<ProcessAttributes>(Capability::Catalog));
        assert!(ConnectionAttributes::CAPABILITIES.is_empty());
    }

    fn accepts_catalog<K: Catalog>() -> &'static str {
        K::TYPE_NAME
    }

    #[test]
    fn marker_traits_gate_generic_code() {
        assert_eq!(accepts_catalog::<TableAttributes>(), "Table");
        assert_eq!(accepts_catalog::<AirflowTaskAttributes>(), "AirflowTask");
    }

    #[test]
    fn display_matches_serde_name() {
        assert_eq!(Capability::PowerBi.to_string(), "power_bi");
        assert_eq!(
            serde_json::to_value(Capability::PowerBi).unwrap(),
            serde_json::json!("power_bi")
        );
    }
}
