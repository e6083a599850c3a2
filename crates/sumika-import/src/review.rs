//! Review CSV writer.
//!
//! Review rows are a one-way artifact: written for a human, never read back.

use std::io;

use sumika_core::review::ReviewRow;

use crate::Result;

/// Write review rows with the standard header. The caller decides the file
/// name (timestamped per run) and whether to write at all; empty buckets
/// produce no file.
pub fn write_review_rows(output: impl io::Write, rows: &[ReviewRow]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(output);
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;
  Ok(())
}
