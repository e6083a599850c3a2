//! Ingestion and reconciliation operations over the building registry.
//!
//! Everything here is generic over
//! [`sumika_core::registry::BuildingRegistry`] and drives the
//! normalize → match → create-or-attach flow. All writes are idempotent
//! upserts: a crashed run leaves previously-committed rows intact, and
//! re-running an unchanged input is a no-op.

pub mod error;
pub mod ids;
pub mod ingest;
pub mod merge;
pub mod renorm;
pub mod report;
pub mod seed;

pub use error::{Error, Result};
pub use ingest::{IngestReport, ingest_master};
pub use merge::{MergeArtifacts, merge_overrides};
pub use renorm::{RenormReport, renormalize};
pub use report::ReviewSink;
pub use seed::{SeedReport, ingest_seed};
