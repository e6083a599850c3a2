//! Master-import ingestion.
//!
//! Rows are processed strictly in order, one at a time. Every row leaves an
//! audit record and a listing behind whatever the resolution outcome;
//! identity effects go through insert-if-absent and upserts only, which is
//! what makes re-ingestion of an unchanged file a no-op.

use sumika_core::{
  building::{Listing, NewBuilding, NewEvidenceLink, NewRawRow},
  key::BuildingKey,
  matcher::{self, MatchOutcome},
  normalize::{self, normalize_address, normalize_name},
  registry::BuildingRegistry,
  review::{ReviewBucket, ReviewRow},
};
use sumika_import::MasterRow;

use crate::{Error, Result, ids, report::ReviewSink};

/// `source_kind` label used in review rows emitted by this pipeline.
pub const MASTER_SOURCE_KIND: &str = "master_import";

/// Counters for one master-import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  pub buildings_total:   u64,
  pub newly_added:       u64,
  pub attached_listings: u64,
  pub unresolved:        u64,
}

/// Ingest one batch of master-import rows under the given `source` label.
pub async fn ingest_master<R: BuildingRegistry>(
  registry: &R,
  rows: &[MasterRow],
  source: &str,
  reviews: &mut ReviewSink,
) -> Result<IngestReport> {
  let mut report = IngestReport::default();

  for row in rows {
    if row.is_seed() {
      ingest_seed_declaration(registry, row, source, &mut report, reviews).await?;
    } else {
      ingest_unit_row(registry, row, source, &mut report, reviews).await?;
    }
  }

  report.buildings_total = registry.building_count().await.map_err(Error::registry)?;
  tracing::info!(
    total = report.buildings_total,
    new = report.newly_added,
    listings = report.attached_listings,
    unresolved = report.unresolved,
    "master import finished"
  );
  Ok(report)
}

// ─── Unit rows ───────────────────────────────────────────────────────────────

async fn ingest_unit_row<R: BuildingRegistry>(
  registry: &R,
  row: &MasterRow,
  source: &str,
  report: &mut IngestReport,
  reviews: &mut ReviewSink,
) -> Result<()> {
  let evidence_id = effective_evidence_id(row, source);

  // Audit copy first: the raw observation survives whatever happens below.
  registry
    .upsert_raw_row(NewRawRow {
      source:      source.to_string(),
      evidence_id: evidence_id.clone(),
      page:        row.page.clone(),
      category:    row.category.clone(),
      raw_block:   row.raw_block.clone(),
    })
    .await
    .map_err(Error::registry)?;

  let norm_name = normalize_name(&row.building_name);
  let norm_address = normalize_address(&row.address);

  if norm_name.is_empty() && norm_address.is_empty() {
    tracing::warn!(%evidence_id, "row has neither name nor address, skipped");
    reviews.push(
      ReviewBucket::UnmatchedListings,
      review_row(row, &evidence_id, &norm_name, &norm_address, "missing_name_and_address", &[]),
    );
    return Ok(());
  }

  let outcome = matcher::match_building(registry, &norm_name, &norm_address)
    .await
    .map_err(Error::registry)?;

  let building_id = match &outcome {
    MatchOutcome::Unmatched => {
      let input =
        NewBuilding::derived(&row.building_name, &row.address, &norm_name, &norm_address);
      let id = input.building_id.clone();
      let inserted = registry
        .insert_building_if_absent(input)
        .await
        .map_err(Error::registry)?;
      if inserted {
        report.newly_added += 1;
        tracing::info!(building_id = %id, name = %norm_name, "new building added");
        reviews.push(
          ReviewBucket::NewBuildings,
          review_row(
            row,
            &evidence_id,
            &norm_name,
            &norm_address,
            "new_building_added",
            &[(id.clone(), 1.0)],
          ),
        );
      }
      Some(id)
    }
    _ if outcome.needs_review() => {
      report.unresolved += 1;
      tracing::warn!(
        %evidence_id,
        reason = outcome.reason(),
        "ambiguous match, routed to review"
      );
      let candidates = outcome.candidates();
      reviews.push(
        ReviewBucket::Suspects,
        review_row(row, &evidence_id, &norm_name, &norm_address, outcome.reason(), &candidates),
      );
      reviews.push(
        ReviewBucket::UnmatchedListings,
        review_row(row, &evidence_id, &norm_name, &norm_address, outcome.reason(), &candidates),
      );
      None
    }
    _ => outcome.resolved().cloned(),
  };

  // Weak addresses are review-flagged even when the row resolved.
  if !norm_address.is_empty() && normalize::is_weak_address(&norm_address) {
    let candidates: Vec<_> =
      building_id.iter().map(|id| (id.clone(), 1.0)).collect();
    reviews.push(
      ReviewBucket::Suspects,
      review_row(row, &evidence_id, &norm_name, &norm_address, "weak_address", &candidates),
    );
  }

  if let Some(id) = &building_id {
    registry
      .upsert_evidence_link(NewEvidenceLink {
        source:      source.to_string(),
        evidence_id: evidence_id.clone(),
        building_id: id.clone(),
        raw_name:    row.building_name.clone(),
        raw_address: row.address.clone(),
        norm_name:   norm_name.clone(),
      })
      .await
      .map_err(Error::registry)?;
  }

  // The listing is persisted either way; an unresolved row gets the key its
  // building would have, reconciled by a later aggregation pass.
  let listing_building = building_id
    .unwrap_or_else(|| BuildingKey::derive(&norm_name, &norm_address));
  registry
    .upsert_listing(Listing {
      listing_key: ids::listing_key(source, &evidence_id, &row.room),
      building_id: listing_building,
      source:      source.to_string(),
      evidence_id,
      room:        row.room.clone(),
      rent_man:    row.rent_man,
      fee_man:     row.fee_man,
      floor:       row.floor.clone(),
      layout:      row.layout.clone(),
      area_sqm:    row.area_sqm,
      age_years:   row.age_years,
      structure:   row.structure.clone(),
      updated_at:  (!row.updated_at.is_empty()).then(|| row.updated_at.clone()),
    })
    .await
    .map_err(Error::registry)?;
  report.attached_listings += 1;

  Ok(())
}

// ─── Seed declaration rows ───────────────────────────────────────────────────

/// A `seed`-category row declares a building rather than observing a unit:
/// no matching, no listing. An existing link for the same evidence wins over
/// key derivation so that curator merges survive re-imports.
async fn ingest_seed_declaration<R: BuildingRegistry>(
  registry: &R,
  row: &MasterRow,
  source: &str,
  report: &mut IngestReport,
  reviews: &mut ReviewSink,
) -> Result<()> {
  let evidence_id = effective_evidence_id(row, source);

  registry
    .upsert_raw_row(NewRawRow {
      source:      source.to_string(),
      evidence_id: evidence_id.clone(),
      page:        row.page.clone(),
      category:    row.category.clone(),
      raw_block:   row.raw_block.clone(),
    })
    .await
    .map_err(Error::registry)?;

  let norm_name = normalize_name(&row.building_name);
  let norm_address = normalize_address(&row.address);
  if norm_name.is_empty() && norm_address.is_empty() {
    reviews.push(
      ReviewBucket::UnmatchedListings,
      review_row(row, &evidence_id, &norm_name, &norm_address, "missing_name_and_address", &[]),
    );
    return Ok(());
  }

  let building_id = match registry
    .get_evidence_link(source, &evidence_id)
    .await
    .map_err(Error::registry)?
  {
    Some(link) => link.building_id,
    None => BuildingKey::derive(&norm_name, &norm_address),
  };

  let inserted = registry
    .insert_building_if_absent(NewBuilding {
      building_id:       building_id.clone(),
      canonical_name:    row.building_name.clone(),
      canonical_address: row.address.clone(),
      norm_name:         norm_name.clone(),
      norm_address:      norm_address.clone(),
    })
    .await
    .map_err(Error::registry)?;
  if inserted {
    report.newly_added += 1;
    reviews.push(
      ReviewBucket::NewBuildings,
      review_row(
        row,
        &evidence_id,
        &norm_name,
        &norm_address,
        "new_building_added",
        &[(building_id.clone(), 1.0)],
      ),
    );
  }

  registry
    .upsert_evidence_link(NewEvidenceLink {
      source:      source.to_string(),
      evidence_id,
      building_id,
      raw_name:    row.building_name.clone(),
      raw_address: row.address.clone(),
      norm_name,
    })
    .await
    .map_err(Error::registry)?;

  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn effective_evidence_id(row: &MasterRow, source: &str) -> String {
  match row.evidence_id.as_deref() {
    Some(id) if !id.trim().is_empty() => id.trim().to_string(),
    _ => ids::evidence_id(source, &row.raw_block),
  }
}

fn review_row(
  row: &MasterRow,
  evidence_id: &str,
  norm_name: &str,
  norm_address: &str,
  reason: &str,
  candidates: &[(BuildingKey, f64)],
) -> ReviewRow {
  ReviewRow::new(
    MASTER_SOURCE_KIND,
    evidence_id,
    &row.building_name,
    &row.address,
    norm_name,
    norm_address,
    reason,
    candidates,
  )
}
