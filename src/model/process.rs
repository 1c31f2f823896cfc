//! Lineage processes linking input assets to output assets.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::asset::{Asset, AssetKind};
use crate::capability::Catalog;
use crate::error::Result;
use crate::qualified_name;
use crate::reference::Reference;

pub type Process = Asset<ProcessAttributes>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
#[asset(type_name = "Process", capabilities(Lineage))]
#[serde(rename_all = "camelCase")]
pub struct ProcessAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Reference>>,
}

/// Reference to a data asset usable as a lineage input or output.
///
/// Only catalog assets can become one, so a process cannot be wired to a
/// connection or to another process:
///
/// ```compile_fail
/// use meta_catalog::model::{process::lineage_ref, Connection};
///
/// let connection = Connection::creator_at("prod", "snowflake", 1_700_000_000).unwrap();
/// let _ = lineage_ref(&connection);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageRef(Reference);

impl LineageRef {
    pub fn reference(&self) -> &Reference {
        &self.0
    }

    pub fn into_reference(self) -> Reference {
        self.0
    }
}

pub fn lineage_ref<C: Catalog>(asset: &Asset<C>) -> Result<LineageRef> {
    asset.trim_to_reference().map(LineageRef)
}

impl Asset<ProcessAttributes> {
    /// `{connection}/{id}` when the source system supplies an id, otherwise
    /// `{connection}/{hash}` where the hash covers the name, the connection and
    /// every input and output identity in order.
    pub fn generate_qualified_name(
        name: &str,
        connection_qualified_name: &str,
        id: Option<&str>,
        inputs: &[LineageRef],
        outputs: &[LineageRef],
    ) -> String {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            return qualified_name::join(connection_qualified_name, &[id]);
        }
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
        hasher.update(connection_qualified_name.as_bytes());
        for lineage in inputs.iter().chain(outputs) {
            hasher.update(b"\n");
            hasher.update(lineage.reference().identity().as_bytes());
        }
        let digest = hex::encode(hasher.finalize());
        qualified_name::join(connection_qualified_name, &[&digest])
    }

    pub fn creator(
        name: &str,
        connection_qualified_name: &str,
        id: Option<&str>,
        inputs: Vec<LineageRef>,
        outputs: Vec<LineageRef>,
    ) -> Result<Self> {
        let connection_qn = qualified_name::require(
            ProcessAttributes::TYPE_NAME,
            "connectionQualifiedName",
            connection_qualified_name,
        )?;
        let qn = Self::generate_qualified_name(name, connection_qn, id, &inputs, &outputs);
        Ok(Self::contained(qn, name, Some(connection_qn.to_string())).with_detail(|detail| {
            detail.inputs = Some(inputs.into_iter().map(LineageRef::into_reference).collect());
            detail.outputs = Some(outputs.into_iter().map(LineageRef::into_reference).collect());
        }))
    }

    /// Add an input after creation. The qualifiedName is not recomputed.
    pub fn with_input<C: Catalog>(mut self, asset: &Asset<C>) -> Result<Self> {
        let lineage = lineage_ref(asset)?;
        self.detail_mut()
            .inputs
            .get_or_insert_with(Vec::new)
            .push(lineage.into_reference());
        Ok(self)
    }

    /// Add an output after creation. The qualifiedName is not recomputed.
    pub fn with_output<C: Catalog>(mut self, asset: &Asset<C>) -> Result<Self> {
        let lineage = lineage_ref(asset)?;
        self.detail_mut()
            .outputs
            .get_or_insert_with(Vec::new)
            .push(lineage.into_reference());
        Ok(self)
    }
}
