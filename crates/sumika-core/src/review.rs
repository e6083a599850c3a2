//! Review artifacts — human-facing rows describing anything the pipeline
//! could not resolve cleanly. Produced, never read back by the core.

use serde::Serialize;

use crate::key::BuildingKey;

/// Which review file a row lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewBucket {
  NewBuildings,
  Suspects,
  UnmatchedListings,
}

impl ReviewBucket {
  /// File-name stem for the timestamped review CSV.
  pub fn stem(self) -> &'static str {
    match self {
      Self::NewBuildings => "new_buildings",
      Self::Suspects => "suspects",
      Self::UnmatchedListings => "unmatched_listings",
    }
  }
}

/// One row of a review CSV.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRow {
  pub source_kind:            String,
  pub source_id:              String,
  pub name:                   String,
  pub address:                String,
  pub normalized_name:        String,
  pub normalized_address:     String,
  pub reason:                 String,
  /// Pipe-joined, at most three entries, best first.
  pub candidate_building_ids: String,
  pub candidate_scores:       String,
}

impl ReviewRow {
  pub fn new(
    source_kind: &str,
    source_id: &str,
    name: &str,
    address: &str,
    normalized_name: &str,
    normalized_address: &str,
    reason: &str,
    candidates: &[(BuildingKey, f64)],
  ) -> Self {
    let top = candidates.iter().take(3);
    let candidate_building_ids = top
      .clone()
      .map(|(key, _)| key.to_string())
      .collect::<Vec<_>>()
      .join("|");
    let candidate_scores = top
      .map(|(_, score)| format!("{score:.3}"))
      .collect::<Vec<_>>()
      .join("|");

    Self {
      source_kind: source_kind.to_string(),
      source_id: source_id.to_string(),
      name: name.to_string(),
      address: address.to_string(),
      normalized_name: normalized_name.to_string(),
      normalized_address: normalized_address.to_string(),
      reason: reason.to_string(),
      candidate_building_ids,
      candidate_scores,
    }
  }
}
