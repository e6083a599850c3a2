//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Building keys are stored in their
//! [`std::fmt::Display`] form (hyphenated UUID or 16-hex legacy prefix) and
//! re-parsed by shape on read.

use chrono::{DateTime, Utc};
use sumika_core::{
  building::{CanonicalBuilding, EvidenceLink},
  key::BuildingKey,
};

use crate::{Error, Result};

// ─── BuildingKey ─────────────────────────────────────────────────────────────

pub fn encode_key(key: &BuildingKey) -> String { key.to_string() }

pub fn decode_key(s: &str) -> Result<BuildingKey> { Ok(BuildingKey::parse(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `buildings` row.
pub struct RawBuilding {
  pub building_id:       String,
  pub canonical_name:    String,
  pub canonical_address: String,
  pub norm_name:         String,
  pub norm_address:      String,
  pub addr_key:          String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawBuilding {
  pub fn into_building(self) -> Result<CanonicalBuilding> {
    Ok(CanonicalBuilding {
      building_id:       decode_key(&self.building_id)?,
      canonical_name:    self.canonical_name,
      canonical_address: self.canonical_address,
      norm_name:         self.norm_name,
      norm_address:      self.norm_address,
      addr_key:          self.addr_key,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `building_sources` row.
pub struct RawEvidenceLink {
  pub source:       String,
  pub evidence_id:  String,
  pub building_id:  String,
  pub raw_name:     String,
  pub raw_address:  String,
  pub norm_name:    String,
  pub extracted_at: String,
}

impl RawEvidenceLink {
  pub fn into_link(self) -> Result<EvidenceLink> {
    Ok(EvidenceLink {
      source:       self.source,
      evidence_id:  self.evidence_id,
      building_id:  decode_key(&self.building_id)?,
      raw_name:     self.raw_name,
      raw_address:  self.raw_address,
      norm_name:    self.norm_name,
      extracted_at: decode_dt(&self.extracted_at)?,
    })
  }
}
