//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The interesting part is the mapping from the core error taxonomy onto
//! status codes: validation failures are 422, concurrency conflicts and
//! deletion refusals are 409, dangling references are 404, and backend
//! faults are 500. The UI relies on these being distinguishable.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(String),
}

impl From<cadre_core::Error> for ApiError {
  fn from(e: cadre_core::Error) -> Self {
    use cadre_core::Error as E;
    match &e {
      E::Validation(_) => Self::Unprocessable(e.to_string()),

      E::StaleVersion(_)
      | E::AlreadyTerminated(_)
      | E::EntityInUse { .. }
      | E::SlotStillActive(_) => Self::Conflict(e.to_string()),

      E::UnknownPerson(_)
      | E::UnknownUnit(_)
      | E::UnknownJobTitle(_)
      | E::AssignmentNotFound(_) => Self::NotFound(e.to_string()),

      E::Storage(_) | E::Serialization(_) => Self::Store(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, m.clone())
      }
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
