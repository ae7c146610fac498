//! Directory entities — the people, units, and job titles that assignments
//! reference.
//!
//! These are plain CRUD records. The interesting lifecycle machinery lives in
//! [`crate::assignment`]; a directory entity only matters here because an
//! assignment row holds foreign keys into it, and deletion is refused while
//! any row still does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which directory table an identifier points into. Used by
/// [`Error::EntityInUse`](crate::Error::EntityInUse) so deletion refusals can
/// name what they refused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Person,
  Unit,
  JobTitle,
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// Someone who can hold assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:    Uuid,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`OrgStore::add_person`](crate::store::OrgStore::add_person).
/// The id and `created_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPerson {
  pub display_name: String,
}

// ─── OrgUnit ─────────────────────────────────────────────────────────────────

/// An organizational unit. `parent_unit_id` is the tree edge of the org
/// chart; `None` marks a root unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUnit {
  pub unit_id:        Uuid,
  pub name:           String,
  pub parent_unit_id: Option<Uuid>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`OrgStore::add_unit`](crate::store::OrgStore::add_unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrgUnit {
  pub name:           String,
  pub parent_unit_id: Option<Uuid>,
}

// ─── JobTitle ────────────────────────────────────────────────────────────────

/// A role name a person can be appointed to within a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTitle {
  pub job_title_id: Uuid,
  pub name:         String,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`OrgStore::add_job_title`](crate::store::OrgStore::add_job_title).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJobTitle {
  pub name: String,
}
