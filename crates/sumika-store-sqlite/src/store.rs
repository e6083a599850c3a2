//! [`SqliteRegistry`] — the SQLite implementation of
//! [`BuildingRegistry`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use sumika_core::{
  building::{CanonicalBuilding, EvidenceLink, Listing, NewBuilding, NewEvidenceLink, NewRawRow},
  key::BuildingKey,
  normalize,
  registry::BuildingRegistry,
};

use crate::{
  encode::{RawBuilding, RawEvidenceLink, encode_dt, encode_key},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A building registry backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteRegistry {
  conn: tokio_rusqlite::Connection,
}

impl SqliteRegistry {
  /// Open (or create) a registry at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory registry, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

fn raw_building(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawBuilding> {
  Ok(RawBuilding {
    building_id:       row.get(0)?,
    canonical_name:    row.get(1)?,
    canonical_address: row.get(2)?,
    norm_name:         row.get(3)?,
    norm_address:      row.get(4)?,
    addr_key:          row.get(5)?,
    created_at:        row.get(6)?,
    updated_at:        row.get(7)?,
  })
}

fn raw_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvidenceLink> {
  Ok(RawEvidenceLink {
    source:       row.get(0)?,
    evidence_id:  row.get(1)?,
    building_id:  row.get(2)?,
    raw_name:     row.get(3)?,
    raw_address:  row.get(4)?,
    norm_name:    row.get(5)?,
    extracted_at: row.get(6)?,
  })
}

const BUILDING_COLUMNS: &str = "building_id, canonical_name, canonical_address, \
                                norm_name, norm_address, addr_key, created_at, updated_at";

const LINK_COLUMNS: &str =
  "source, evidence_id, building_id, raw_name, raw_address, norm_name, extracted_at";

// ─── BuildingRegistry impl ───────────────────────────────────────────────────

impl BuildingRegistry for SqliteRegistry {
  type Error = Error;

  // ── Buildings ─────────────────────────────────────────────────────────────

  async fn insert_building_if_absent(&self, input: NewBuilding) -> Result<bool> {
    let id_str   = encode_key(&input.building_id);
    let addr_key = normalize::addr_key(&input.norm_address);
    let now_str  = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO buildings (
             building_id, canonical_name, canonical_address,
             norm_name, norm_address, addr_key, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            input.canonical_name,
            input.canonical_address,
            input.norm_name,
            input.norm_address,
            addr_key,
            now_str,
          ],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn get_building(&self, id: &BuildingKey) -> Result<Option<CanonicalBuilding>> {
    let id_str = encode_key(id);

    let raw: Option<RawBuilding> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {BUILDING_COLUMNS} FROM buildings WHERE building_id = ?1"),
              rusqlite::params![id_str],
              raw_building,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBuilding::into_building).transpose()
  }

  async fn list_buildings(&self) -> Result<Vec<CanonicalBuilding>> {
    let raws: Vec<RawBuilding> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {BUILDING_COLUMNS} FROM buildings ORDER BY building_id"))?;
        let rows = stmt
          .query_map([], raw_building)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBuilding::into_building).collect()
  }

  async fn building_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM buildings", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn evidence_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM building_sources", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn listing_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn find_by_addr_key(&self, addr_key: &str) -> Result<Vec<CanonicalBuilding>> {
    let key = addr_key.to_owned();

    let raws: Vec<RawBuilding> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BUILDING_COLUMNS} FROM buildings WHERE addr_key = ?1 ORDER BY building_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![key], raw_building)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBuilding::into_building).collect()
  }

  async fn update_normal_forms(
    &self,
    id: &BuildingKey,
    norm_name: &str,
    norm_address: &str,
    addr_key: &str,
  ) -> Result<()> {
    let id_str       = encode_key(id);
    let norm_name    = norm_name.to_owned();
    let norm_address = norm_address.to_owned();
    let addr_key     = addr_key.to_owned();
    let now_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE buildings
           SET norm_name = ?2, norm_address = ?3, addr_key = ?4, updated_at = ?5
           WHERE building_id = ?1",
          rusqlite::params![id_str, norm_name, norm_address, addr_key, now_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Evidence links ────────────────────────────────────────────────────────

  async fn alias_targets(&self, norm_name: &str) -> Result<Vec<BuildingKey>> {
    let name = norm_name.to_owned();

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT building_id FROM building_sources
           WHERE norm_name = ?1 ORDER BY building_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids
      .iter()
      .map(|s| BuildingKey::parse(s).map_err(Error::Core))
      .collect()
  }

  async fn upsert_evidence_link(&self, input: NewEvidenceLink) -> Result<EvidenceLink> {
    let link = EvidenceLink {
      source:       input.source,
      evidence_id:  input.evidence_id,
      building_id:  input.building_id,
      raw_name:     input.raw_name,
      raw_address:  input.raw_address,
      norm_name:    input.norm_name,
      extracted_at: Utc::now(),
    };

    let source      = link.source.clone();
    let evidence_id = link.evidence_id.clone();
    let id_str      = encode_key(&link.building_id);
    let raw_name    = link.raw_name.clone();
    let raw_address = link.raw_address.clone();
    let norm_name   = link.norm_name.clone();
    let at_str      = encode_dt(link.extracted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO building_sources (
             source, evidence_id, building_id, raw_name, raw_address, norm_name, extracted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (source, evidence_id) DO UPDATE SET
             building_id  = excluded.building_id,
             raw_name     = excluded.raw_name,
             raw_address  = excluded.raw_address,
             norm_name    = excluded.norm_name,
             extracted_at = excluded.extracted_at",
          rusqlite::params![
            source,
            evidence_id,
            id_str,
            raw_name,
            raw_address,
            norm_name,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(link)
  }

  async fn get_evidence_link(
    &self,
    source: &str,
    evidence_id: &str,
  ) -> Result<Option<EvidenceLink>> {
    let source      = source.to_owned();
    let evidence_id = evidence_id.to_owned();

    let raw: Option<RawEvidenceLink> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {LINK_COLUMNS} FROM building_sources
                 WHERE source = ?1 AND evidence_id = ?2"
              ),
              rusqlite::params![source, evidence_id],
              raw_link,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvidenceLink::into_link).transpose()
  }

  async fn find_evidence_by_id(&self, evidence_id: &str) -> Result<Vec<EvidenceLink>> {
    let evidence_id = evidence_id.to_owned();

    let raws: Vec<RawEvidenceLink> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LINK_COLUMNS} FROM building_sources
           WHERE evidence_id = ?1 ORDER BY source"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![evidence_id], raw_link)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvidenceLink::into_link).collect()
  }

  // ── Listings and raw rows ─────────────────────────────────────────────────

  async fn upsert_listing(&self, listing: Listing) -> Result<()> {
    let id_str = encode_key(&listing.building_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO listings (
             listing_key, building_id, source, evidence_id, room,
             rent_man, fee_man, floor, layout, area_sqm, age_years,
             structure, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
           ON CONFLICT (listing_key) DO UPDATE SET
             building_id = excluded.building_id,
             rent_man    = excluded.rent_man,
             fee_man     = excluded.fee_man,
             floor       = excluded.floor,
             layout      = excluded.layout,
             area_sqm    = excluded.area_sqm,
             age_years   = excluded.age_years,
             structure   = excluded.structure,
             updated_at  = excluded.updated_at",
          rusqlite::params![
            listing.listing_key,
            id_str,
            listing.source,
            listing.evidence_id,
            listing.room,
            listing.rent_man,
            listing.fee_man,
            listing.floor,
            listing.layout,
            listing.area_sqm,
            listing.age_years,
            listing.structure,
            listing.updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_raw_row(&self, input: NewRawRow) -> Result<()> {
    let now_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO raw_rows (source, evidence_id, page, category, raw_block, imported_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (source, evidence_id) DO UPDATE SET
             page        = excluded.page,
             category    = excluded.category,
             raw_block   = excluded.raw_block,
             imported_at = excluded.imported_at",
          rusqlite::params![
            input.source,
            input.evidence_id,
            input.page,
            input.category,
            input.raw_block,
            now_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
