//! CSV codecs for the Sumika registry.
//!
//! Converts between the external CSV contracts and [`sumika_core`] domain
//! types. Pure synchronous; no database dependencies. Readers and writers
//! operate on `io::Read`/`io::Write`; callers own file handling.
//!
//! Formats:
//! - master import (strict header, one row per vacancy or seed declaration)
//! - UI seed export (per-concept column aliases, curator-edited)
//! - review outputs (new buildings / suspects / unmatched listings)
//! - override and alias files consumed by downstream aggregation

pub mod error;
pub mod master;
pub mod overrides;
pub mod review;
pub mod seed;

pub use error::{Error, Result};
pub use master::{MasterRow, parse_master};
pub use overrides::{AliasRow, OverrideRow, write_aliases, write_overrides};
pub use review::write_review_rows;
pub use seed::{SeedRow, parse_seed};
