//! SQL schema for the Sumika SQLite registry.
//!
//! Executed at every connection startup; idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS buildings (
    building_id       TEXT PRIMARY KEY,  -- hyphenated uuid, or 16-hex legacy key
    canonical_name    TEXT NOT NULL,
    canonical_address TEXT NOT NULL,
    norm_name         TEXT NOT NULL,
    norm_address      TEXT NOT NULL,
    addr_key          TEXT NOT NULL,     -- prefecture-stripped norm_address
    created_at        TEXT NOT NULL,     -- ISO 8601 UTC
    updated_at        TEXT NOT NULL
);

-- One row per (source, evidence_id). The building association is
-- last-write-wins so later reconciliation can repair earlier assignments.
-- norm_name doubles as the alias-lookup index for the matcher.
CREATE TABLE IF NOT EXISTS building_sources (
    source       TEXT NOT NULL,
    evidence_id  TEXT NOT NULL,
    building_id  TEXT NOT NULL,
    raw_name     TEXT NOT NULL,
    raw_address  TEXT NOT NULL,
    norm_name    TEXT NOT NULL,
    extracted_at TEXT NOT NULL,
    PRIMARY KEY (source, evidence_id)
);

-- Listings reference buildings loosely; no foreign key. A listing may cite
-- a building id before the canonical row exists.
CREATE TABLE IF NOT EXISTS listings (
    listing_key TEXT PRIMARY KEY,
    building_id TEXT NOT NULL,
    source      TEXT NOT NULL,
    evidence_id TEXT NOT NULL,
    room        TEXT NOT NULL,
    rent_man    REAL,
    fee_man     REAL,
    floor       TEXT,
    layout      TEXT,
    area_sqm    REAL,
    age_years   INTEGER,
    structure   TEXT,
    updated_at  TEXT
);

-- Audit copy of every imported row, resolution or not.
CREATE TABLE IF NOT EXISTS raw_rows (
    source      TEXT NOT NULL,
    evidence_id TEXT NOT NULL,
    page        TEXT NOT NULL,
    category    TEXT NOT NULL,
    raw_block   TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    PRIMARY KEY (source, evidence_id)
);

CREATE INDEX IF NOT EXISTS building_sources_norm_name_idx ON building_sources(norm_name);
CREATE INDEX IF NOT EXISTS building_sources_building_idx  ON building_sources(building_id);
CREATE INDEX IF NOT EXISTS buildings_addr_key_idx         ON buildings(addr_key);
CREATE INDEX IF NOT EXISTS listings_building_idx          ON listings(building_id);

PRAGMA user_version = 1;
";
