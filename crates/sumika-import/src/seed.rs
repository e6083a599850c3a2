//! UI-seed CSV reader.
//!
//! Curator-maintained seed files come from a spreadsheet UI and have drifted
//! over time, so each concept is resolved through a list of accepted column
//! names; the first non-empty cell wins per row.

use std::io;

use crate::{Error, Result};

const NAME_COLUMNS: [&str; 3] = ["building_name", "canonical_name", "name"];
const ADDRESS_COLUMNS: [&str; 2] = ["address", "canonical_address"];
const EVIDENCE_COLUMNS: [&str; 3] = ["evidence_url_or_id", "evidence_id", "source_id"];
const MERGE_EVIDENCE_COLUMN: &str = "merge_to_evidence";
const MERGE_KEY_COLUMN: &str = "merge_to_building_key";

/// One curator-supplied seed row.
#[derive(Debug, Clone)]
pub struct SeedRow {
  pub name:                  String,
  pub address:               String,
  /// Empty when the file carries no evidence column; the pipeline derives a
  /// content id in that case.
  pub evidence_id:           String,
  /// Reference to another row's evidence id whose building should win.
  pub merge_to_evidence:     Option<String>,
  /// Direct building-key merge target (override-merge tool input only).
  pub merge_to_building_key: Option<String>,
}

/// Column indexes for one concept, in preference order.
fn column_indexes(headers: &csv::StringRecord, names: &[&str]) -> Vec<usize> {
  names
    .iter()
    .filter_map(|name| headers.iter().position(|h| h == *name))
    .collect()
}

fn first_non_empty(record: &csv::StringRecord, indexes: &[usize]) -> String {
  indexes
    .iter()
    .filter_map(|&i| record.get(i))
    .map(str::trim)
    .find(|v| !v.is_empty())
    .unwrap_or("")
    .to_string()
}

/// Parse a UI-seed file. Requires at least one recognizable name column;
/// everything else degrades to empty values.
pub fn parse_seed(input: impl io::Read) -> Result<Vec<SeedRow>> {
  let mut reader = csv::Reader::from_reader(input);
  let headers = reader.headers()?.clone();

  let name_idx = column_indexes(&headers, &NAME_COLUMNS);
  if name_idx.is_empty() {
    return Err(Error::MissingSeedColumns(&NAME_COLUMNS));
  }
  let address_idx = column_indexes(&headers, &ADDRESS_COLUMNS);
  let evidence_idx = column_indexes(&headers, &EVIDENCE_COLUMNS);
  let merge_evidence_idx = column_indexes(&headers, &[MERGE_EVIDENCE_COLUMN]);
  let merge_key_idx = column_indexes(&headers, &[MERGE_KEY_COLUMN]);

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;
    let merge_to_evidence = {
      let v = first_non_empty(&record, &merge_evidence_idx);
      (!v.is_empty()).then_some(v)
    };
    let merge_to_building_key = {
      let v = first_non_empty(&record, &merge_key_idx);
      (!v.is_empty()).then_some(v)
    };
    rows.push(SeedRow {
      name: first_non_empty(&record, &name_idx),
      address: first_non_empty(&record, &address_idx),
      evidence_id: first_non_empty(&record, &evidence_idx),
      merge_to_evidence,
      merge_to_building_key,
    });
  }
  Ok(rows)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
