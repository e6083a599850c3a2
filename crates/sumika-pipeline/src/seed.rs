//! Seed-from-UI reconciliation.
//!
//! Curated seed rows either declare a building outright or, via
//! `merge_to_evidence`, adopt another row's building as their own, which is
//! how a curator folds two independently-seeded rows into one building
//! without recomputing keys by hand.

use sumika_core::{
  building::{NewBuilding, NewEvidenceLink},
  key::BuildingKey,
  normalize::{normalize_address, normalize_name},
  registry::BuildingRegistry,
};
use sumika_import::SeedRow;

use crate::{Error, Result, ids};

/// Source label for evidence created from UI-curated seed rows.
pub const SEED_SOURCE: &str = "seed";

/// Counters for one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub buildings_inserted: u64,
  pub evidence_attached:  u64,
}

/// Apply one batch of seed rows. Idempotent: re-running the same file
/// inserts zero new buildings the second time.
pub async fn ingest_seed<R: BuildingRegistry>(
  registry: &R,
  rows: &[SeedRow],
) -> Result<SeedReport> {
  let mut report = SeedReport::default();

  for row in rows {
    let norm_name = normalize_name(&row.name);
    let norm_address = normalize_address(&row.address);
    if norm_name.is_empty() && norm_address.is_empty() {
      tracing::warn!("seed row with neither name nor address, skipped");
      continue;
    }

    let evidence_id = if row.evidence_id.is_empty() {
      ids::evidence_id(SEED_SOURCE, &format!("{}|{}", row.name, row.address))
    } else {
      row.evidence_id.clone()
    };

    // A merge reference adopts the target row's building; otherwise the key
    // is derived from this row's own normalized forms.
    let building_id = match &row.merge_to_evidence {
      Some(target) => {
        let links = registry
          .find_evidence_by_id(target)
          .await
          .map_err(Error::registry)?;
        match links.into_iter().next() {
          Some(link) => link.building_id,
          None => {
            tracing::warn!(
              merge_to = %target,
              "merge_to_evidence does not resolve yet, deriving own key"
            );
            BuildingKey::derive(&norm_name, &norm_address)
          }
        }
      }
      None => BuildingKey::derive(&norm_name, &norm_address),
    };

    let inserted = registry
      .insert_building_if_absent(NewBuilding {
        building_id:       building_id.clone(),
        canonical_name:    row.name.clone(),
        canonical_address: row.address.clone(),
        norm_name:         norm_name.clone(),
        norm_address:      norm_address.clone(),
      })
      .await
      .map_err(Error::registry)?;
    if inserted {
      report.buildings_inserted += 1;
    }

    registry
      .upsert_evidence_link(NewEvidenceLink {
        source:      SEED_SOURCE.to_string(),
        evidence_id,
        building_id,
        raw_name:    row.name.clone(),
        raw_address: row.address.clone(),
        norm_name,
      })
      .await
      .map_err(Error::registry)?;
    report.evidence_attached += 1;
  }

  Ok(report)
}
