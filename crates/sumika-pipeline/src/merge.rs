//! Override-merge tool.
//!
//! Consumes a curator-edited seed export in which some rows point at a
//! winner via `merge_to_evidence` or `merge_to_building_key`, and produces
//! the override/alias artifacts for the downstream aggregation step. Any
//! reference that does not resolve to exactly one winner row aborts the run
//! with the full conflict set; no partial output is ever written.

use std::collections::HashMap;

use sumika_core::{
  key::BuildingKey,
  normalize::{normalize_address, normalize_name},
};
use sumika_import::{AliasRow, OverrideRow, SeedRow};

use crate::{Error, Result, ids, seed::SEED_SOURCE};

/// The two files the tool emits.
#[derive(Debug, Default)]
pub struct MergeArtifacts {
  pub overrides: Vec<OverrideRow>,
  pub aliases:   Vec<AliasRow>,
}

/// Resolve all merge references and build the output rows.
pub fn merge_overrides(rows: &[SeedRow]) -> Result<MergeArtifacts> {
  let keys: Vec<BuildingKey> = rows
    .iter()
    .map(|row| {
      BuildingKey::derive(&normalize_name(&row.name), &normalize_address(&row.address))
    })
    .collect();

  let mut by_evidence: HashMap<&str, Vec<usize>> = HashMap::new();
  let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
  for (i, row) in rows.iter().enumerate() {
    if !row.evidence_id.is_empty() {
      by_evidence.entry(row.evidence_id.as_str()).or_default().push(i);
    }
    by_key.entry(keys[i].to_string()).or_default().push(i);
  }

  let mut artifacts = MergeArtifacts::default();
  let mut unresolved: Vec<String> = Vec::new();

  for (loser, row) in rows.iter().enumerate() {
    let (target, claimants) = match (&row.merge_to_evidence, &row.merge_to_building_key) {
      (Some(ev), _) => (ev.clone(), by_evidence.get(ev.as_str()).cloned().unwrap_or_default()),
      (None, Some(key)) => (key.clone(), by_key.get(key).cloned().unwrap_or_default()),
      (None, None) => continue,
    };

    let winner = match claimants.as_slice() {
      [] => {
        unresolved.push(format!("{target}: no row claims this reference"));
        continue;
      }
      [single] if *single == loser => {
        unresolved.push(format!("{target}: row merges into itself"));
        continue;
      }
      [single] => *single,
      many => {
        unresolved.push(format!("{target}: claimed by {} rows", many.len()));
        continue;
      }
    };

    let winner_row = &rows[winner];
    let winner_key = keys[winner].to_string();
    let loser_key = keys[loser].to_string();
    let loser_evidence = if row.evidence_id.is_empty() {
      ids::evidence_id(SEED_SOURCE, &format!("{}|{}", row.name, row.address))
    } else {
      row.evidence_id.clone()
    };
    let note = format!("merged into {target}");

    artifacts.overrides.push(OverrideRow {
      source:                 SEED_SOURCE.to_string(),
      evidence_url_or_id:     loser_evidence,
      building_key:           winner_key.clone(),
      building_name_override: winner_row.name.clone(),
      address_override:       winner_row.address.clone(),
      ignore_flag:            String::new(),
      note:                   note.clone(),
    });

    if loser_key != winner_key {
      artifacts.aliases.push(AliasRow {
        old_building_key: loser_key,
        new_building_key: winner_key,
        note,
      });
    }
  }

  if !unresolved.is_empty() {
    return Err(Error::UnresolvedMergeTargets(unresolved));
  }
  Ok(artifacts)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn seed(name: &str, address: &str, evidence: &str) -> SeedRow {
    SeedRow {
      name:                  name.to_string(),
      address:               address.to_string(),
      evidence_id:           evidence.to_string(),
      merge_to_evidence:     None,
      merge_to_building_key: None,
    }
  }

  #[test]
  fn merge_emits_override_and_alias() {
    let winner = seed("サンハイツ", "北九州市小倉北区魚町1-2-3", "ev-1");
    let mut loser = seed("サンハイツ別館", "北九州市小倉北区魚町1-2-3", "ev-2");
    loser.merge_to_evidence = Some("ev-1".to_string());

    let artifacts = merge_overrides(&[winner, loser]).unwrap();

    assert_eq!(artifacts.overrides.len(), 1);
    assert_eq!(artifacts.aliases.len(), 1);
    let ov = &artifacts.overrides[0];
    assert_eq!(ov.evidence_url_or_id, "ev-2");
    assert_eq!(ov.building_name_override, "サンハイツ");
    let alias = &artifacts.aliases[0];
    assert_eq!(alias.new_building_key, ov.building_key);
    assert_ne!(alias.old_building_key, alias.new_building_key);
  }

  #[test]
  fn rows_without_references_emit_nothing() {
    let artifacts = merge_overrides(&[
      seed("ビルA", "北九州市小倉北区魚町1-2", "ev-1"),
      seed("ビルB", "北九州市小倉北区船場町3-4", "ev-2"),
    ])
    .unwrap();
    assert!(artifacts.overrides.is_empty());
    assert!(artifacts.aliases.is_empty());
  }

  #[test]
  fn duplicate_winner_claims_abort_with_full_set() {
    // Two rows share ev-1; two losers reference it, plus one dangling ref.
    let a = seed("ビルA", "北九州市小倉北区魚町1-2", "ev-1");
    let b = seed("ビルB", "北九州市小倉北区船場町3-4", "ev-1");
    let mut c = seed("ビルC", "北九州市小倉北区京町5-6", "ev-3");
    c.merge_to_evidence = Some("ev-1".to_string());
    let mut d = seed("ビルD", "北九州市小倉北区室町7-8", "ev-4");
    d.merge_to_evidence = Some("ev-9".to_string());

    let err = merge_overrides(&[a, b, c, d]).unwrap_err();
    let Error::UnresolvedMergeTargets(conflicts) = err else {
      panic!("expected unresolved merge targets, got {err:?}");
    };
    assert_eq!(conflicts.len(), 2);
    assert!(conflicts.iter().any(|c| c.contains("ev-1")));
    assert!(conflicts.iter().any(|c| c.contains("ev-9")));
  }

  #[test]
  fn merge_by_building_key_resolves() {
    let winner = seed("サンハイツ", "北九州市小倉北区魚町1-2-3", "ev-1");
    let winner_key = BuildingKey::derive(
      &normalize_name("サンハイツ"),
      &normalize_address("北九州市小倉北区魚町1-2-3"),
    );
    let mut loser = seed("サンハイツB", "北九州市小倉北区魚町9-9", "ev-2");
    loser.merge_to_building_key = Some(winner_key.to_string());

    let artifacts = merge_overrides(&[winner, loser]).unwrap();
    assert_eq!(artifacts.aliases.len(), 1);
    assert_eq!(artifacts.aliases[0].new_building_key, winner_key.to_string());
  }

  #[test]
  fn self_merge_is_rejected() {
    let mut row = seed("ビルA", "北九州市小倉北区魚町1-2", "ev-1");
    row.merge_to_evidence = Some("ev-1".to_string());
    assert!(matches!(
      merge_overrides(&[row]),
      Err(Error::UnresolvedMergeTargets(_))
    ));
  }
}
