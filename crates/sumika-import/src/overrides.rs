//! Override and alias file writers.
//!
//! Outputs of the override-merge tool, consumed by the downstream
//! aggregation step: `overrides.csv` re-labels a loser's evidence with the
//! winner's display values, `alias.csv` folds the loser's key into the
//! winner's.

use std::io;

use serde::Serialize;

use crate::Result;

/// One `overrides.csv` row.
#[derive(Debug, Clone, Serialize)]
pub struct OverrideRow {
  pub source:                 String,
  pub evidence_url_or_id:     String,
  pub building_key:           String,
  pub building_name_override: String,
  pub address_override:       String,
  pub ignore_flag:            String,
  pub note:                   String,
}

/// One `alias.csv` row.
#[derive(Debug, Clone, Serialize)]
pub struct AliasRow {
  pub old_building_key: String,
  pub new_building_key: String,
  pub note:             String,
}

pub fn write_overrides(output: impl io::Write, rows: &[OverrideRow]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(output);
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;
  Ok(())
}

pub fn write_aliases(output: impl io::Write, rows: &[AliasRow]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(output);
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;
  Ok(())
}
