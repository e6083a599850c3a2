//! Building identity keys.
//!
//! Two generation schemes coexist. The derived scheme (UUIDv5 over the
//! normalized name/address pair) is the only one new code ever writes; the
//! legacy scheme (a 16-hex-character SHA-1 prefix of the same material) is
//! read-compatible with registry data created before the UUID scheme.
//!
//! Both schemes are pure functions of the normalized strings, with no
//! randomness and no registry lookups, so independent importer codepaths can
//! never invent a second id for the same building.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::{Error, Result};

/// Fixed namespace for derived building ids. Changing this constant would
/// re-key every building in existence.
pub const BUILDING_NAMESPACE: Uuid =
  Uuid::from_u128(0x8c6f_0d5e_4a21_4b7a_9f3e_d2c8_01b4_5a17);

// ─── BuildingKey ─────────────────────────────────────────────────────────────

/// A canonical building identifier.
///
/// Stored as a single TEXT column; the two forms are distinguishable by
/// shape when parsing, and by variant everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scheme", content = "id", rename_all = "snake_case")]
pub enum BuildingKey {
  /// UUIDv5 of `norm_name|norm_address` under [`BUILDING_NAMESPACE`].
  Derived(Uuid),
  /// 16-hex-char SHA-1 prefix inherited from pre-UUID registry data.
  Legacy(String),
}

impl BuildingKey {
  /// Derive the primary-scheme key for a normalized (name, address) pair.
  pub fn derive(norm_name: &str, norm_address: &str) -> Self {
    let material = format!("{norm_name}|{norm_address}");
    Self::Derived(Uuid::new_v5(&BUILDING_NAMESPACE, material.as_bytes()))
  }

  /// Derive the legacy-scheme key for the same material. Kept for reading
  /// and comparing against pre-UUID rows; never written by new code.
  pub fn legacy(norm_name: &str, norm_address: &str) -> Self {
    let mut hasher = Sha1::new();
    hasher.update(norm_name.as_bytes());
    hasher.update(b"|");
    hasher.update(norm_address.as_bytes());
    let digest = hex::encode(hasher.finalize());
    Self::Legacy(digest[..16].to_string())
  }

  /// Parse a key from its stored TEXT form.
  pub fn parse(text: &str) -> Result<Self> {
    if let Ok(id) = Uuid::parse_str(text) {
      return Ok(Self::Derived(id));
    }
    if text.len() == 16
      && text
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
      return Ok(Self::Legacy(text.to_string()));
    }
    Err(Error::MalformedKey(text.to_string()))
  }

  pub fn is_legacy(&self) -> bool { matches!(self, Self::Legacy(_)) }
}

impl fmt::Display for BuildingKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Derived(id) => write!(f, "{}", id.hyphenated()),
      Self::Legacy(prefix) => f.write_str(prefix),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
