//! Error types for the ingestion pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("import error: {0}")]
  Import(#[from] sumika_import::Error),

  /// The override tool refuses to produce partial output; the full conflict
  /// set is carried so the operator can fix everything in one pass.
  #[error("unresolved merge targets: {0:?}")]
  UnresolvedMergeTargets(Vec<String>),

  #[error("registry error: {0}")]
  Registry(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn registry<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Registry(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
