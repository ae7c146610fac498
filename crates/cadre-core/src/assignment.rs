//! Assignment types — the fundamental unit of the versioning engine.
//!
//! An assignment row is one *version* of a person's appointment to a role
//! within a unit. Rows are immutable once closed; history is extended by
//! closing the current row and appending a successor, never by rewriting.
//! The validity window is a pair of inclusive calendar dates: `valid_to` is
//! the last day the row is effective, and is `None` while the row is current.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default workload share for a new assignment: full time.
pub const FULL_TIME: f64 = 1.0;

// ─── Slot ────────────────────────────────────────────────────────────────────

/// The logical (person, unit, job title) triple an assignment belongs to.
///
/// Not a stored entity — it is the grouping key across which versions of the
/// same appointment are tracked.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Slot {
  pub person_id:    Uuid,
  pub unit_id:      Uuid,
  pub job_title_id: Uuid,
}

impl Slot {
  pub fn new(person_id: Uuid, unit_id: Uuid, job_title_id: Uuid) -> Self {
    Self { person_id, unit_id, job_title_id }
  }
}

impl fmt::Display for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.person_id, self.unit_id, self.job_title_id)
  }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// One version of an assignment. Once `valid_to` is set the row is closed and
/// is never written again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
  pub assignment_id: Uuid,
  #[serde(flatten)]
  pub slot:          Slot,
  /// Monotonic per slot; versions ordered by `valid_from` form 1,2,3,…
  pub version:       u32,
  /// Fractional workload share in `(0, max]`; `1.0` is full time.
  pub percentage:    f64,
  pub is_ad_interim: bool,
  pub is_unit_boss:  bool,
  pub notes:         Option<String>,
  pub valid_from:    NaiveDate,
  /// Inclusive last effective day; `None` while the row is current.
  pub valid_to:      Option<NaiveDate>,
  /// Authoritative current flag, written only by the versioning engine.
  pub is_current:    bool,
}

impl Assignment {
  /// Whether the row's validity window covers `day`.
  pub fn effective_on(&self, day: NaiveDate) -> bool {
    day >= self.valid_from && self.valid_to.is_none_or(|to| day <= to)
  }
}

// ─── NewAssignment ───────────────────────────────────────────────────────────

/// Input to [`OrgStore::create_assignment`](crate::store::OrgStore::create_assignment).
/// Identity, version, and the current flag are assigned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
  pub slot:          Slot,
  pub percentage:    f64,
  pub is_ad_interim: bool,
  pub is_unit_boss:  bool,
  pub notes:         Option<String>,
  pub valid_from:    NaiveDate,
}

impl NewAssignment {
  /// Convenience constructor: full-time, no flags, no notes.
  pub fn new(slot: Slot, valid_from: NaiveDate) -> Self {
    Self {
      slot,
      percentage: FULL_TIME,
      is_ad_interim: false,
      is_unit_boss: false,
      notes: None,
      valid_from,
    }
  }
}

// ─── AssignmentChange ────────────────────────────────────────────────────────

/// Attribute patch for
/// [`OrgStore::modify_assignment`](crate::store::OrgStore::modify_assignment).
/// Unset fields are copied over from the outgoing row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentChange {
  pub percentage:    Option<f64>,
  pub is_ad_interim: Option<bool>,
  pub is_unit_boss:  Option<bool>,
  pub notes:         Option<String>,
}
