//! Review-row collection and file output.
//!
//! Rows accumulate in per-bucket memory during a run and are written out as
//! timestamped CSVs at the end. An empty bucket produces no file.

use std::{
  collections::HashMap,
  fs::File,
  path::{Path, PathBuf},
};

use sumika_core::review::{ReviewBucket, ReviewRow};
use sumika_import::write_review_rows;

use crate::Result;

/// Collects review rows during one pipeline run.
#[derive(Default)]
pub struct ReviewSink {
  buckets: HashMap<ReviewBucket, Vec<ReviewRow>>,
}

impl ReviewSink {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, bucket: ReviewBucket, row: ReviewRow) {
    self.buckets.entry(bucket).or_default().push(row);
  }

  /// Rows collected for one bucket, in arrival order.
  pub fn rows(&self, bucket: ReviewBucket) -> &[ReviewRow] {
    self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn is_empty(&self) -> bool {
    self.buckets.values().all(Vec::is_empty)
  }

  /// Write each non-empty bucket to `<dir>/<stem>_<timestamp>.csv` and
  /// return the paths written.
  pub fn write_to_dir(&self, dir: &Path, timestamp: &str) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for bucket in [
      ReviewBucket::NewBuildings,
      ReviewBucket::Suspects,
      ReviewBucket::UnmatchedListings,
    ] {
      let rows = self.rows(bucket);
      if rows.is_empty() {
        continue;
      }
      let path = dir.join(format!("{}_{timestamp}.csv", bucket.stem()));
      write_review_rows(File::create(&path)?, rows)?;
      written.push(path);
    }
    Ok(written)
  }
}
