//! Content-derived identifiers for evidence rows and listings.
//!
//! Both are short SHA-256 hex prefixes, pure functions of row content, so a
//! physical row re-derives the same id on every run and across importer
//! codepaths.

use sha2::{Digest, Sha256};

/// Evidence id for a row with no explicit id column: hashed over the source
/// identity and the row's raw text block.
pub fn evidence_id(source: &str, raw_block: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(source.as_bytes());
  hasher.update(b"|");
  hasher.update(raw_block.as_bytes());
  hex::encode(hasher.finalize())[..12].to_string()
}

/// Listing key over the identifying content of one unit row.
pub fn listing_key(source: &str, evidence_id: &str, room: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(source.as_bytes());
  hasher.update(b"|");
  hasher.update(evidence_id.as_bytes());
  hasher.update(b"|");
  hasher.update(room.as_bytes());
  hex::encode(hasher.finalize())[..16].to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_are_stable_and_content_sensitive() {
    assert_eq!(evidence_id("weekly", "block"), evidence_id("weekly", "block"));
    assert_ne!(evidence_id("weekly", "block"), evidence_id("weekly", "other"));
    assert_ne!(evidence_id("weekly", "block"), evidence_id("reviews", "block"));
    assert_eq!(evidence_id("weekly", "block").len(), 12);

    assert_eq!(
      listing_key("weekly", "ev-1", "101"),
      listing_key("weekly", "ev-1", "101")
    );
    assert_ne!(
      listing_key("weekly", "ev-1", "101"),
      listing_key("weekly", "ev-1", "102")
    );
    assert_eq!(listing_key("weekly", "ev-1", "101").len(), 16);
  }
}
