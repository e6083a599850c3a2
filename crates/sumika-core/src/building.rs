//! Canonical buildings and the evidence rows that support them.
//!
//! A canonical building is the single deduplicated identity for one physical
//! building. All meaningful history lives in evidence links; the building row
//! itself carries only identity and the current display/matching forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::BuildingKey;

// ─── Canonical building ──────────────────────────────────────────────────────

/// One physical building, deduplicated across every source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBuilding {
  pub building_id:       BuildingKey,
  /// Best human-readable values: first-seen, or override-applied.
  pub canonical_name:    String,
  pub canonical_address: String,
  /// Normalized matching forms; rewritten by the renormalization pass when
  /// the rules change. Never shown to end users.
  pub norm_name:         String,
  pub norm_address:      String,
  /// Prefecture-stripped comparison key derived from `norm_address`.
  pub addr_key:          String,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to [`crate::registry::BuildingRegistry::insert_building_if_absent`].
/// Timestamps and `addr_key` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBuilding {
  pub building_id:       BuildingKey,
  pub canonical_name:    String,
  pub canonical_address: String,
  pub norm_name:         String,
  pub norm_address:      String,
}

impl NewBuilding {
  /// Build a record whose id is derived from the normalized forms, the only
  /// way new buildings ever come into existence.
  pub fn derived(
    raw_name: &str,
    raw_address: &str,
    norm_name: &str,
    norm_address: &str,
  ) -> Self {
    Self {
      building_id:       BuildingKey::derive(norm_name, norm_address),
      canonical_name:    raw_name.to_string(),
      canonical_address: raw_address.to_string(),
      norm_name:         norm_name.to_string(),
      norm_address:      norm_address.to_string(),
    }
  }
}

// ─── Evidence ────────────────────────────────────────────────────────────────

/// One source observation bound to a canonical building.
///
/// `(source, evidence_id)` is unique. Re-upserting replaces the building
/// association (last write wins), which is how re-ingestion and merges repair
/// earlier assignments. Doubles as the alias corpus: `norm_name` is indexed
/// for the matcher's alias lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceLink {
  pub source:       String,
  pub evidence_id:  String,
  pub building_id:  BuildingKey,
  pub raw_name:     String,
  pub raw_address:  String,
  pub norm_name:    String,
  pub extracted_at: DateTime<Utc>,
}

/// Input to [`crate::registry::BuildingRegistry::upsert_evidence_link`].
/// `extracted_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEvidenceLink {
  pub source:      String,
  pub evidence_id: String,
  pub building_id: BuildingKey,
  pub raw_name:    String,
  pub raw_address: String,
  pub norm_name:   String,
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// One room/unit record. Owned by exactly one building via `building_id`,
/// a loose reference: the canonical row may not exist yet when the listing
/// is written, which downstream aggregation reconciles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
  /// Content-derived key, stable across runs.
  pub listing_key: String,
  pub building_id: BuildingKey,
  pub source:      String,
  pub evidence_id: String,
  pub room:        String,
  pub rent_man:    Option<f64>,
  pub fee_man:     Option<f64>,
  pub floor:       Option<String>,
  pub layout:      Option<String>,
  pub area_sqm:    Option<f64>,
  pub age_years:   Option<u32>,
  pub structure:   Option<String>,
  /// Source-reported update date, verbatim.
  pub updated_at:  Option<String>,
}

// ─── Raw audit rows ──────────────────────────────────────────────────────────

/// Input for the audit copy of one imported row, persisted regardless of
/// resolution outcome so no observed data is ever lost. `imported_at` is
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRawRow {
  pub source:      String,
  pub evidence_id: String,
  pub page:        String,
  pub category:    String,
  pub raw_block:   String,
}
