//! Error types for the sumika-import codecs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The master-import header is a data contract; any deviation aborts the
  /// whole run before a single row is processed.
  #[error("unexpected master-import header: {found:?}")]
  HeaderMismatch { found: Vec<String> },

  #[error("seed file has no recognizable name column (looked for {0:?})")]
  MissingSeedColumns(&'static [&'static str]),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
