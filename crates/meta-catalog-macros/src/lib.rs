//! Procedural macros for meta-catalog
//!
//! This crate provides one macro:
//! - `#[derive(AssetKind)]` - Generate the kind boilerplate for an asset detail struct

use proc_macro::TokenStream;

mod asset_kind;

/// Derive macro for asset detail structs.
///
/// Generates the `AssetKind` implementation (type name, capability list and
/// the conversions to and from `AssetRecord`) plus one empty marker impl per
/// listed capability.
///
/// **Important:** All kinds must live in the main crate (uses `crate::asset`,
/// `crate::capability` and `crate::record` paths), and `AssetRecord` must have
/// a variant named exactly like `type_name`.
///
/// # Attributes
///
/// - `#[asset(type_name = "...")]` - Required. The catalog type discriminator.
/// - `#[asset(capabilities(A, B))]` - Optional. Capability markers to implement.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AssetKind)]
/// #[asset(type_name = "AirflowDag", capabilities(Catalog, Airflow))]
/// #[serde(rename_all = "camelCase")]
/// pub struct AirflowDagAttributes {
///     pub airflow_dag_schedule: Option<String>,
/// }
/// ```
#[proc_macro_derive(AssetKind, attributes(asset))]
pub fn derive_asset_kind(input: TokenStream) -> TokenStream {
    asset_kind::derive_asset_kind_impl(input)
}
