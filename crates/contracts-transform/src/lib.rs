//! Table transforms for the contracts pipeline.
//!
//! Every stage takes a [`TableFrame`] and returns a new one; inputs are never
//! modified in place.
//!
//! - **Headers**: rename raw sheet columns through a mapping
//! - **Authority**: resolve buyer names to local authority codes
//! - **Join**: left-join the entity tables on `_link_release`
//! - **Filter**: keep rows with a resolved authority
//! - **Prune**: drop denylisted columns before publication

pub mod authority;
pub mod data_utils;
mod error;
mod filter;
mod frame;
mod headers;
mod join;
mod prune;

// === Error Types ===
pub use error::{Result, TransformError};

// === Frames ===
pub use frame::TableFrame;

// === Stages ===
pub use authority::{
    AmbiguousLookup, AuthorityLookup, AuthorityRecord, AuthorityRegistry, EnrichOptions,
    Enriched, EnrichmentReport, enrich_authorities, normalize_authority_name,
};
pub use filter::retain_resolved;
pub use headers::{RemapOptions, remap_headers};
pub use join::{JoinStats, join_all, left_join};
pub use prune::prune_columns;
