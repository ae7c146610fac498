//! Handler for the per-person workload report.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use uuid::Uuid;

use cadre_core::{
  store::OrgStore,
  workload::{self, WorkloadReport, WorkloadThresholds},
};

use crate::error::ApiError;

/// `GET /people/{id}/workload`
///
/// Derived on demand from the person's current rows. A person with no
/// current rows (or an id nobody has ever seen) gets the neutral
/// `unassigned` report rather than a 404 — absence of workload is an
/// answer, not an error.
pub async fn report<S: OrgStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<WorkloadReport>, ApiError> {
  let current = store.current_for_person(id).await?;
  let report = workload::assess(id, &current, &WorkloadThresholds::default());
  Ok(Json(report))
}
