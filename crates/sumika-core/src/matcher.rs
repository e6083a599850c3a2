//! Identity matching — decides whether a normalized (name, address) pair
//! refers to a known canonical building.
//!
//! Precedence is strict: an exact name alias outranks address co-location,
//! because two distinct buildings can share a postal address (multi-building
//! complexes) while an identical name string is rarely coincidental. An alias
//! pointing at several distinct buildings is terminal, not a fall-through:
//! conflicting strong evidence is itself a data-quality problem for a human.

use crate::{key::BuildingKey, normalize, registry::BuildingRegistry};

/// Minimum name-similarity ratio for resolving among address co-located
/// candidates.
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.88;

/// How many candidates an unresolved outcome reports.
pub const MAX_CANDIDATES: usize = 3;

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The result of one match query, one variant per resolution path.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
  /// Exactly one building has previously been observed under this name.
  AliasExact { building_id: BuildingKey },
  /// The name has been observed on more than one building. Terminal:
  /// weaker address evidence must not override a conflicting alias.
  AliasAmbiguous { candidates: Vec<BuildingKey> },
  /// Exactly one building is stored at this address.
  AddressExact { building_id: BuildingKey },
  /// Several buildings share the address and one name wins cleanly.
  AddressSimilarity { building_id: BuildingKey, score: f64 },
  /// Several buildings share the address and no name wins cleanly.
  AddressLowConfidence { candidates: Vec<(BuildingKey, f64)> },
  /// Nothing matched; the caller should create a new building.
  Unmatched,
}

impl MatchOutcome {
  /// The building id when the query resolved cleanly.
  pub fn resolved(&self) -> Option<&BuildingKey> {
    match self {
      Self::AliasExact { building_id }
      | Self::AddressExact { building_id }
      | Self::AddressSimilarity { building_id, .. } => Some(building_id),
      _ => None,
    }
  }

  /// True for outcomes that must be routed to human review.
  pub fn needs_review(&self) -> bool {
    matches!(
      self,
      Self::AliasAmbiguous { .. } | Self::AddressLowConfidence { .. }
    )
  }

  /// Snake-case label for the review CSV `reason` column.
  pub fn reason(&self) -> &'static str {
    match self {
      Self::AliasExact { .. } => "alias_exact",
      Self::AliasAmbiguous { .. } => "alias_ambiguous",
      Self::AddressExact { .. } => "address_exact",
      Self::AddressSimilarity { .. } => "address_plus_name_similarity",
      Self::AddressLowConfidence { .. } => "address_candidates_low_confidence",
      Self::Unmatched => "unmatched",
    }
  }

  /// Candidate (id, score) pairs for review output, best first, at most
  /// [`MAX_CANDIDATES`].
  pub fn candidates(&self) -> Vec<(BuildingKey, f64)> {
    match self {
      Self::AliasExact { building_id } | Self::AddressExact { building_id } => {
        vec![(building_id.clone(), 1.0)]
      }
      Self::AddressSimilarity { building_id, score } => {
        vec![(building_id.clone(), *score)]
      }
      Self::AliasAmbiguous { candidates } => candidates
        .iter()
        .take(MAX_CANDIDATES)
        .map(|key| (key.clone(), 1.0))
        .collect(),
      Self::AddressLowConfidence { candidates } => {
        candidates.iter().take(MAX_CANDIDATES).cloned().collect()
      }
      Self::Unmatched => Vec::new(),
    }
  }
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// Match a normalized (name, address) pair against the registry.
pub async fn match_building<R: BuildingRegistry>(
  registry: &R,
  norm_name: &str,
  norm_address: &str,
) -> Result<MatchOutcome, R::Error> {
  // 1. Alias lookup: distinct buildings this exact name has been seen on.
  if !norm_name.is_empty() {
    let mut targets = registry.alias_targets(norm_name).await?;
    match targets.len() {
      0 => {}
      1 => {
        return Ok(MatchOutcome::AliasExact { building_id: targets.remove(0) });
      }
      _ => return Ok(MatchOutcome::AliasAmbiguous { candidates: targets }),
    }
  }

  // 2. Address co-location, prefecture-agnostic. Weak addresses carry too
  //    little block structure to be trusted here.
  if norm_address.is_empty() || normalize::is_weak_address(norm_address) {
    return Ok(MatchOutcome::Unmatched);
  }

  let stripped = normalize::strip_prefecture(norm_address);
  let mut candidates = registry.find_by_addr_key(stripped).await?;
  match candidates.len() {
    0 => Ok(MatchOutcome::Unmatched),
    1 => Ok(MatchOutcome::AddressExact {
      building_id: candidates.remove(0).building_id,
    }),
    _ => {
      let mut scored: Vec<(BuildingKey, f64)> = candidates
        .into_iter()
        .map(|b| {
          let score = strsim::normalized_levenshtein(norm_name, &b.norm_name);
          (b.building_id, score)
        })
        .collect();
      scored
        .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

      // Resolve only on a unique winner above threshold. A tie at the top
      // stays unresolved until a curator merges the candidates.
      let best = scored[0].1;
      let second = scored[1].1;
      if best >= NAME_SIMILARITY_THRESHOLD && best > second {
        let (building_id, score) = scored.swap_remove(0);
        Ok(MatchOutcome::AddressSimilarity { building_id, score })
      } else {
        scored.truncate(MAX_CANDIDATES);
        Ok(MatchOutcome::AddressLowConfidence { candidates: scored })
      }
    }
  }
}
