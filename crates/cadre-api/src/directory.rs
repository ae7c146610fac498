//! Handlers for the directory endpoints: people, units, and job titles.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people`, `/units`, `/job-titles` | Full listings |
//! | `POST`   | same | Body: the `New*` input; returns 201 + stored entity |
//! | `GET`    | `/people/{id}` etc. | Single entity or 404 |
//! | `DELETE` | `/people/{id}` etc. | 204, or 409 while assignment rows still reference the entity |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;

use cadre_core::{
  directory::{
    JobTitle, NewJobTitle, NewOrgUnit, NewPerson, OrgUnit, Person,
  },
  store::OrgStore,
};

use crate::error::ApiError;

// ─── People ──────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list_people<S: OrgStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Person>>, ApiError> {
  Ok(Json(store.list_people().await?))
}

/// `POST /people` — returns 201 + the stored [`Person`].
pub async fn create_person<S: OrgStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  let person = store.add_person(body).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /people/{id}`
pub async fn get_person<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  store
    .get_person(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))
}

/// `DELETE /people/{id}` — 409 while assignment rows reference the person.
pub async fn delete_person<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.remove_person(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Units ───────────────────────────────────────────────────────────────────

/// `GET /units`
pub async fn list_units<S: OrgStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<OrgUnit>>, ApiError> {
  Ok(Json(store.list_units().await?))
}

/// `POST /units`
pub async fn create_unit<S: OrgStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewOrgUnit>,
) -> Result<impl IntoResponse, ApiError> {
  let unit = store.add_unit(body).await?;
  Ok((StatusCode::CREATED, Json(unit)))
}

/// `GET /units/{id}`
pub async fn get_unit<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OrgUnit>, ApiError> {
  store
    .get_unit(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("unit {id} not found")))
}

/// `DELETE /units/{id}`
pub async fn delete_unit<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.remove_unit(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Job titles ──────────────────────────────────────────────────────────────

/// `GET /job-titles`
pub async fn list_job_titles<S: OrgStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<JobTitle>>, ApiError> {
  Ok(Json(store.list_job_titles().await?))
}

/// `POST /job-titles`
pub async fn create_job_title<S: OrgStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewJobTitle>,
) -> Result<impl IntoResponse, ApiError> {
  let title = store.add_job_title(body).await?;
  Ok((StatusCode::CREATED, Json(title)))
}

/// `GET /job-titles/{id}`
pub async fn get_job_title<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<JobTitle>, ApiError> {
  store
    .get_job_title(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("job title {id} not found")))
}

/// `DELETE /job-titles/{id}`
pub async fn delete_job_title<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.remove_job_title(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
