//! Error types for `sumika-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("building not found: {0}")]
  BuildingNotFound(String),

  #[error("malformed building key: {0:?}")]
  MalformedKey(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
