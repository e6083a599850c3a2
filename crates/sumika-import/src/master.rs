//! Master-import CSV reader.
//!
//! The weekly bulk import: one row per vacancy/unit, plus `seed`-category
//! declaration rows. The header is a hard contract: exactly one of the two
//! accepted column sets, in order, or the whole file is rejected.

use std::io;

use serde::Deserialize;

use crate::{Error, Result};

/// The accepted header, without the optional trailing `evidence_id`.
pub const MASTER_HEADER: [&str; 14] = [
  "page", "category", "updated_at", "building_name", "room", "address",
  "rent_man", "fee_man", "floor", "layout", "area_sqm", "age_years",
  "structure", "raw_block",
];

/// The accepted header with an explicit `evidence_id` column.
pub const MASTER_HEADER_WITH_EVIDENCE: [&str; 15] = [
  "page", "category", "updated_at", "building_name", "room", "address",
  "rent_man", "fee_man", "floor", "layout", "area_sqm", "age_years",
  "structure", "raw_block", "evidence_id",
];

/// Category value marking a placeholder building declaration rather than an
/// observed unit.
pub const SEED_CATEGORY: &str = "seed";

/// One parsed master-import row. Numeric fields are `None` when the source
/// cell was empty.
#[derive(Debug, Clone, Deserialize)]
pub struct MasterRow {
  pub page:          String,
  pub category:      String,
  pub updated_at:    String,
  pub building_name: String,
  pub room:          String,
  pub address:       String,
  pub rent_man:      Option<f64>,
  pub fee_man:       Option<f64>,
  pub floor:         Option<String>,
  pub layout:        Option<String>,
  pub area_sqm:      Option<f64>,
  pub age_years:     Option<u32>,
  pub structure:     Option<String>,
  pub raw_block:     String,
  /// Present only under [`MASTER_HEADER_WITH_EVIDENCE`].
  #[serde(default)]
  pub evidence_id:   Option<String>,
}

impl MasterRow {
  pub fn is_seed(&self) -> bool { self.category == SEED_CATEGORY }
}

/// Parse a master-import file. Fails before yielding any row when the header
/// does not exactly match an accepted column set.
pub fn parse_master(input: impl io::Read) -> Result<Vec<MasterRow>> {
  let mut reader = csv::Reader::from_reader(input);

  let headers: Vec<String> =
    reader.headers()?.iter().map(str::to_string).collect();
  let accepted = headers == MASTER_HEADER || headers == MASTER_HEADER_WITH_EVIDENCE;
  if !accepted {
    return Err(Error::HeaderMismatch { found: headers });
  }

  let mut rows = Vec::new();
  for record in reader.deserialize() {
    rows.push(record?);
  }
  Ok(rows)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const HEADER: &str = "page,category,updated_at,building_name,room,address,\
                        rent_man,fee_man,floor,layout,area_sqm,age_years,structure,raw_block";

  #[test]
  fn parses_rows_without_evidence_column() {
    let input = format!(
      "{HEADER}\n1,listing,2024-06-01,サンハイツ101,101,魚町1-2-3,5.2,0.3,3,1K,24.5,12,RC,raw text\n"
    );
    let rows = parse_master(input.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].building_name, "サンハイツ101");
    assert_eq!(rows[0].rent_man, Some(5.2));
    assert_eq!(rows[0].evidence_id, None);
    assert!(!rows[0].is_seed());
  }

  #[test]
  fn parses_explicit_evidence_ids() {
    let input = format!(
      "{HEADER},evidence_id\n1,listing,2024-06-01,サンハイツ,101,魚町1-2-3,,,,,,,,raw,ev-42\n"
    );
    let rows = parse_master(input.as_bytes()).unwrap();
    assert_eq!(rows[0].evidence_id.as_deref(), Some("ev-42"));
    assert_eq!(rows[0].rent_man, None);
  }

  #[test]
  fn seed_category_is_flagged() {
    let input = format!(
      "{HEADER}\n1,seed,2024-06-01,サンハイツ,,魚町1-2-3,,,,,,,,seeded\n"
    );
    let rows = parse_master(input.as_bytes()).unwrap();
    assert!(rows[0].is_seed());
  }

  #[test]
  fn rejects_unexpected_header() {
    let input = "page,category,name\n1,listing,x\n";
    let err = parse_master(input.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::HeaderMismatch { .. }));
  }

  #[test]
  fn rejects_reordered_header() {
    // Same columns, wrong order: still a contract violation.
    let input = "category,page,updated_at,building_name,room,address,\
                 rent_man,fee_man,floor,layout,area_sqm,age_years,structure,raw_block\n";
    let err = parse_master(input.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::HeaderMismatch { .. }));
  }
}
