//! Error type for `cadre-store-sqlite`.
//!
//! Internal helpers use [`Error`]; the [`OrgStore`](cadre_core::store::OrgStore)
//! impl maps everything into the shared `cadre_core` vocabulary at the trait
//! boundary so callers see one taxonomy regardless of backend.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cadre_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded back into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<Error> for cadre_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Database(inner) => cadre_core::Error::Storage(inner.to_string()),
      Error::Json(inner) => cadre_core::Error::Serialization(inner),
      Error::Uuid(inner) => {
        cadre_core::Error::Storage(format!("uuid parse error: {inner}"))
      }
      Error::Decode(msg) => cadre_core::Error::Storage(msg),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
