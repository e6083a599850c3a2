//! The `BuildingRegistry` trait — the seam between identity resolution and
//! storage.
//!
//! Implemented by storage backends (e.g. `sumika-store-sqlite`). The matcher
//! and the ingestion pipeline depend on this abstraction, not on any concrete
//! backend. Every write is an insert-if-absent or an upsert, so repeated runs
//! over the same input are no-ops by construction.

use std::future::Future;

use crate::{
  building::{CanonicalBuilding, EvidenceLink, Listing, NewBuilding, NewEvidenceLink, NewRawRow},
  key::BuildingKey,
};

/// Abstraction over the canonical building registry.
///
/// All methods return `Send` futures so implementations can run statements
/// on a dedicated database thread.
pub trait BuildingRegistry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Buildings ─────────────────────────────────────────────────────────

  /// Insert a canonical building unless its id already exists. Returns
  /// `true` when a row was actually inserted. Duplicate inserts for the
  /// same id are absorbed silently, never errors.
  fn insert_building_if_absent(
    &self,
    input: NewBuilding,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_building<'a>(
    &'a self,
    id: &'a BuildingKey,
  ) -> impl Future<Output = Result<Option<CanonicalBuilding>, Self::Error>> + Send + 'a;

  fn list_buildings(
    &self,
  ) -> impl Future<Output = Result<Vec<CanonicalBuilding>, Self::Error>> + Send + '_;

  fn building_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn evidence_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn listing_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// All buildings whose stored prefecture-stripped address equals
  /// `addr_key`.
  fn find_by_addr_key<'a>(
    &'a self,
    addr_key: &'a str,
  ) -> impl Future<Output = Result<Vec<CanonicalBuilding>, Self::Error>> + Send + 'a;

  /// Rewrite the normalized matching forms of one building (renormalization
  /// pass). The id itself is never re-derived.
  fn update_normal_forms<'a>(
    &'a self,
    id: &'a BuildingKey,
    norm_name: &'a str,
    norm_address: &'a str,
    addr_key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Evidence links ────────────────────────────────────────────────────

  /// Distinct building ids observed under `norm_name` across all evidence
  /// links (the alias index).
  fn alias_targets<'a>(
    &'a self,
    norm_name: &'a str,
  ) -> impl Future<Output = Result<Vec<BuildingKey>, Self::Error>> + Send + 'a;

  /// Upsert an evidence link keyed by `(source, evidence_id)`. The building
  /// association is last-write-wins.
  fn upsert_evidence_link(
    &self,
    input: NewEvidenceLink,
  ) -> impl Future<Output = Result<EvidenceLink, Self::Error>> + Send + '_;

  fn get_evidence_link<'a>(
    &'a self,
    source: &'a str,
    evidence_id: &'a str,
  ) -> impl Future<Output = Result<Option<EvidenceLink>, Self::Error>> + Send + 'a;

  /// All evidence links carrying `evidence_id`, regardless of source. Used
  /// by seed reconciliation to resolve `merge_to_evidence` references.
  fn find_evidence_by_id<'a>(
    &'a self,
    evidence_id: &'a str,
  ) -> impl Future<Output = Result<Vec<EvidenceLink>, Self::Error>> + Send + 'a;

  // ── Listings and raw rows ─────────────────────────────────────────────

  /// Upsert a listing keyed by its content-derived `listing_key`.
  fn upsert_listing(
    &self,
    listing: Listing,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Upsert the audit copy of an imported row, keyed by
  /// `(source, evidence_id)`.
  fn upsert_raw_row(
    &self,
    input: NewRawRow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
