//! Renormalization pass.
//!
//! Recomputes the normalized matching forms of every stored building from
//! its canonical display fields. Run after a normalization-rule change so
//! matching reflects the current rules. Identity is untouched: a building's
//! key is never re-derived.

use sumika_core::{
  normalize::{self, normalize_address, normalize_name},
  registry::BuildingRegistry,
};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenormReport {
  pub scanned:   u64,
  pub rewritten: u64,
}

pub async fn renormalize<R: BuildingRegistry>(registry: &R) -> Result<RenormReport> {
  let buildings = registry.list_buildings().await.map_err(Error::registry)?;
  let mut report = RenormReport::default();

  for building in buildings {
    report.scanned += 1;

    let norm_name = normalize_name(&building.canonical_name);
    let norm_address = normalize_address(&building.canonical_address);
    let addr_key = normalize::addr_key(&norm_address);

    let unchanged = norm_name == building.norm_name
      && norm_address == building.norm_address
      && addr_key == building.addr_key;
    if unchanged {
      continue;
    }

    registry
      .update_normal_forms(&building.building_id, &norm_name, &norm_address, &addr_key)
      .await
      .map_err(Error::registry)?;
    report.rewritten += 1;
    tracing::info!(building_id = %building.building_id, "normal forms rewritten");
  }

  tracing::info!(
    scanned = report.scanned,
    rewritten = report.rewritten,
    "renormalization finished"
  );
  Ok(report)
}
