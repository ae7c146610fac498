//! Handlers for the versioning-engine endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/assignments` | Body: [`NewAssignmentBody`]; 201 + row + warnings |
//! | `GET`  | `/assignments/{id}` | Single version row |
//! | `POST` | `/assignments/{id}/modify` | Body: [`ModifyBody`]; close + append |
//! | `POST` | `/assignments/{id}/terminate` | Body: `{"effective_date":"..."}` |
//! | `GET`  | `/assignments/current` | `?person_id&unit_id&job_title_id` |
//! | `GET`  | `/assignments/history` | Same query; full version history |
//! | `POST` | `/assignments/import` | Records + conflict policy |
//! | `POST` | `/assignments/purge` | Body: slot; irreversible |
//! | `GET`  | `/people/{id}/assignments` | Person's current rows |
//! | `GET`  | `/people/{id}/export` | Person's current rows as records |
//! | `GET`  | `/export` | Whole store as one document |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadre_core::{
  assignment::{
    Assignment, AssignmentChange, FULL_TIME, NewAssignment, Slot,
  },
  interchange::{AssignmentRecord, ConflictPolicy, ImportOutcome, OrgDocument},
  store::OrgStore,
  validate::Warning,
};

use crate::error::ApiError;

// ─── Shared response shape ───────────────────────────────────────────────────

/// A successful engine write: the resulting row plus any soft warnings.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
  pub assignment: Assignment,
  pub warnings:   Vec<Warning>,
}

/// Slot triple as query parameters.
#[derive(Debug, Deserialize)]
pub struct SlotParams {
  pub person_id:    Uuid,
  pub unit_id:      Uuid,
  pub job_title_id: Uuid,
}

impl SlotParams {
  fn slot(&self) -> Slot {
    Slot::new(self.person_id, self.unit_id, self.job_title_id)
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /assignments`.
#[derive(Debug, Deserialize)]
pub struct NewAssignmentBody {
  pub person_id:     Uuid,
  pub unit_id:       Uuid,
  pub job_title_id:  Uuid,
  /// Defaults to full time.
  pub percentage:    Option<f64>,
  #[serde(default)]
  pub is_ad_interim: bool,
  #[serde(default)]
  pub is_unit_boss:  bool,
  pub notes:         Option<String>,
  pub valid_from:    NaiveDate,
}

impl From<NewAssignmentBody> for NewAssignment {
  fn from(b: NewAssignmentBody) -> Self {
    NewAssignment {
      slot:          Slot::new(b.person_id, b.unit_id, b.job_title_id),
      percentage:    b.percentage.unwrap_or(FULL_TIME),
      is_ad_interim: b.is_ad_interim,
      is_unit_boss:  b.is_unit_boss,
      notes:         b.notes,
      valid_from:    b.valid_from,
    }
  }
}

/// `POST /assignments` — returns 201 + [`MutationResponse`].
pub async fn create<S: OrgStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAssignmentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let (assignment, warnings) =
    store.create_assignment(NewAssignment::from(body)).await?;
  Ok((StatusCode::CREATED, Json(MutationResponse { assignment, warnings })))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /assignments/{id}`
pub async fn get_one<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assignment>, ApiError> {
  store
    .get_assignment(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("assignment {id} not found")))
}

// ─── Modify ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /assignments/{id}/modify`. Unset attribute
/// fields carry over from the outgoing row.
#[derive(Debug, Deserialize)]
pub struct ModifyBody {
  pub effective_date: NaiveDate,
  pub percentage:     Option<f64>,
  pub is_ad_interim:  Option<bool>,
  pub is_unit_boss:   Option<bool>,
  pub notes:          Option<String>,
}

/// `POST /assignments/{id}/modify`
pub async fn modify_one<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ModifyBody>,
) -> Result<Json<MutationResponse>, ApiError> {
  let change = AssignmentChange {
    percentage:    body.percentage,
    is_ad_interim: body.is_ad_interim,
    is_unit_boss:  body.is_unit_boss,
    notes:         body.notes,
  };
  let (assignment, warnings) =
    store.modify_assignment(id, change, body.effective_date).await?;
  Ok(Json(MutationResponse { assignment, warnings }))
}

// ─── Terminate ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TerminateBody {
  pub effective_date: NaiveDate,
}

/// `POST /assignments/{id}/terminate` — returns the closed row.
pub async fn terminate_one<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TerminateBody>,
) -> Result<Json<Assignment>, ApiError> {
  let closed = store.terminate_assignment(id, body.effective_date).await?;
  Ok(Json(closed))
}

// ─── Slot queries ────────────────────────────────────────────────────────────

/// `GET /assignments/current?person_id=…&unit_id=…&job_title_id=…`
pub async fn current_for_slot<S: OrgStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SlotParams>,
) -> Result<Json<Assignment>, ApiError> {
  store.current_for_slot(params.slot()).await?.map(Json).ok_or_else(|| {
    ApiError::NotFound(format!("no current row for slot {}", params.slot()))
  })
}

/// `GET /assignments/history?person_id=…&unit_id=…&job_title_id=…`
pub async fn history_for_slot<S: OrgStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SlotParams>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
  Ok(Json(store.history_for_slot(params.slot()).await?))
}

/// `GET /people/{id}/assignments` — the person's current rows.
pub async fn current_for_person<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
  Ok(Json(store.current_for_person(id).await?))
}

// ─── Import / export ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ImportBody {
  pub policy:  ConflictPolicy,
  pub records: Vec<AssignmentRecord>,
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
  pub outcome:  ImportOutcome,
  pub warnings: Vec<Warning>,
}

/// `POST /assignments/import` — apply each record under the body's conflict
/// policy. Aborts on the first hard failure; records already applied stay
/// applied (each record is its own transaction).
pub async fn import<S: OrgStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<ImportBody>,
) -> Result<Json<Vec<ImportResult>>, ApiError> {
  let mut results = Vec::with_capacity(body.records.len());
  for record in body.records {
    let (outcome, warnings) =
      store.apply_imported(record, body.policy).await?;
    results.push(ImportResult { outcome, warnings });
  }
  Ok(Json(results))
}

/// `GET /people/{id}/export` — the person's current rows as interchange
/// records.
pub async fn export_for_person<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentRecord>>, ApiError> {
  let records: Vec<AssignmentRecord> = store
    .current_for_person(id)
    .await?
    .iter()
    .map(AssignmentRecord::from)
    .collect();
  Ok(Json(records))
}

/// `GET /export` — the whole store as one interchange document.
pub async fn export_document<S: OrgStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<OrgDocument>, ApiError> {
  Ok(Json(store.export_document().await?))
}

// ─── Purge ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
  pub removed: usize,
}

/// `POST /assignments/purge` — body: the slot triple. Irreversible; refused
/// with 409 while the slot still has a current row.
pub async fn purge<S: OrgStore>(
  State(store): State<Arc<S>>,
  Json(slot): Json<Slot>,
) -> Result<Json<PurgeResponse>, ApiError> {
  let removed = store.purge_slot(slot).await?;
  Ok(Json(PurgeResponse { removed }))
}
