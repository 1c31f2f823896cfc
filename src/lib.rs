//! Client-side object model for a metadata catalog.
//!
//! Every catalog entity is an `Asset<K>`: a common envelope (type name, guid,
//! qualifiedName, owners, certificate, tags, terms) over a kind-specific
//! detail struct `K` deriving `AssetKind`.
//!
//! ## Flow
//!
//! ```text
//! name + parent ──► creator ──► qualifiedName ──► Asset<K> ──► save ──► CatalogClient
//!                                                    │
//!                              trim_to_reference ◄───┘        get / get_projected
//!                                      │                             │
//!                              relationship links             AssetRecord ──► Asset<K>
//! ```
//!
//! ## Rules
//!
//! 1. `creator` derives the qualifiedName; `updater` takes it verbatim
//! 2. Relationships carry a minimal `Reference`, never a full entity
//! 3. Mutations send only the changed fields, removal as explicit null
//! 4. Transport errors pass through untouched

pub mod asset;
pub mod capability;
pub mod client;
pub mod config;
pub mod error;
pub mod guid;
pub mod model;
pub mod mutation;
pub mod qualified_name;
pub mod record;
pub mod reference;
pub mod retrieval;
pub mod search;

pub use asset::{
    AnnouncementType, Asset, AssetAttributes, AssetKind, AtlanTag, CertificateStatus,
    EntityStatus, TagPropagation,
};
pub use capability::Capability;
pub use client::{CatalogClient, HttpCatalogClient, InMemoryCatalog};
pub use config::ClientConfig;
pub use error::{CatalogError, Result};
pub use guid::{GuidSource, RandomGuids, SequentialGuids};
pub use mutation::{MutationRequest, MutationResponse};
pub use record::AssetRecord;
pub use reference::{Reference, ReferenceKey, SaveSemantic};
pub use retrieval::AssetId;
pub use search::{IndexSearchRequest, IndexSearchResponse};
