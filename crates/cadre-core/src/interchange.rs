//! Bulk interchange types — the strongly-typed records crossing the
//! import/export boundary.
//!
//! File parsing and serialisation of these forms belongs to the external
//! import/export collaborator; this module defines the record shapes it
//! exchanges with the engine, validated at the boundary instead of travelling
//! as loose dictionaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  assignment::{Assignment, Slot},
  directory::{JobTitle, OrgUnit, Person},
};

// ─── Conflict policy ─────────────────────────────────────────────────────────

/// What to do when an incoming record maps to a slot that already has a
/// current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
  /// Leave the existing row untouched.
  Skip,
  /// Overwrite the current row's mutable attributes in place.
  /// Maintenance-only: bypasses history.
  Update,
  /// Route through `modify` — the only policy that preserves the
  /// versioning invariants.
  CreateVersion,
}

// ─── Row form ────────────────────────────────────────────────────────────────

/// Flat, row-oriented form of one assignment version: one field per
/// persisted column, foreign keys as identifiers.
///
/// On import, `version` and `is_current` are advisory only — the engine is
/// the single writer of both and assigns them itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
  pub person_id:     Uuid,
  pub unit_id:       Uuid,
  pub job_title_id:  Uuid,
  pub version:       u32,
  pub percentage:    f64,
  pub is_ad_interim: bool,
  pub is_unit_boss:  bool,
  pub notes:         Option<String>,
  pub valid_from:    NaiveDate,
  pub valid_to:      Option<NaiveDate>,
  pub is_current:    bool,
}

impl AssignmentRecord {
  pub fn slot(&self) -> Slot {
    Slot::new(self.person_id, self.unit_id, self.job_title_id)
  }
}

impl From<&Assignment> for AssignmentRecord {
  fn from(a: &Assignment) -> Self {
    Self {
      person_id:     a.slot.person_id,
      unit_id:       a.slot.unit_id,
      job_title_id:  a.slot.job_title_id,
      version:       a.version,
      percentage:    a.percentage,
      is_ad_interim: a.is_ad_interim,
      is_unit_boss:  a.is_unit_boss,
      notes:         a.notes.clone(),
      valid_from:    a.valid_from,
      valid_to:      a.valid_to,
      is_current:    a.is_current,
    }
  }
}

// ─── Import outcome ──────────────────────────────────────────────────────────

/// What the engine did with one imported record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
  /// The slot had no current row; a new active period was opened.
  Created(Assignment),
  /// The slot was active and the policy was [`ConflictPolicy::Skip`].
  Skipped,
  /// In-place overwrite under [`ConflictPolicy::Update`].
  Updated(Assignment),
  /// New version appended under [`ConflictPolicy::CreateVersion`].
  Versioned(Assignment),
}

// ─── Document form ───────────────────────────────────────────────────────────

/// Header of an [`OrgDocument`]: collection counts and export timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
  pub exported_at:      DateTime<Utc>,
  pub person_count:     usize,
  pub unit_count:       usize,
  pub job_title_count:  usize,
  pub assignment_count: usize,
}

/// Hierarchical interchange form: assignment records nested alongside the
/// sibling directory collections, under a metadata header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgDocument {
  pub meta:        DocumentMeta,
  pub people:      Vec<Person>,
  pub units:       Vec<OrgUnit>,
  pub job_titles:  Vec<JobTitle>,
  pub assignments: Vec<AssignmentRecord>,
}

impl OrgDocument {
  /// Assemble a document; the meta header is derived from the collections.
  pub fn new(
    people: Vec<Person>,
    units: Vec<OrgUnit>,
    job_titles: Vec<JobTitle>,
    assignments: Vec<AssignmentRecord>,
  ) -> Self {
    let meta = DocumentMeta {
      exported_at:      Utc::now(),
      person_count:     people.len(),
      unit_count:       units.len(),
      job_title_count:  job_titles.len(),
      assignment_count: assignments.len(),
    };
    Self { meta, people, units, job_titles, assignments }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn sample_assignment() -> Assignment {
    Assignment {
      assignment_id: Uuid::new_v4(),
      slot: Slot::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()),
      version: 3,
      percentage: 0.5,
      is_ad_interim: true,
      is_unit_boss: false,
      notes: Some("acting head".into()),
      valid_from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
      valid_to: None,
      is_current: true,
    }
  }

  #[test]
  fn record_mirrors_assignment_fields() {
    let a = sample_assignment();
    let record = AssignmentRecord::from(&a);

    assert_eq!(record.slot(), a.slot);
    assert_eq!(record.version, 3);
    assert_eq!(record.percentage, 0.5);
    assert!(record.is_ad_interim);
    assert_eq!(record.notes.as_deref(), Some("acting head"));
    assert_eq!(record.valid_to, None);
    assert!(record.is_current);
  }

  #[test]
  fn document_meta_counts_collections() {
    let a = sample_assignment();
    let doc = OrgDocument::new(
      vec![],
      vec![],
      vec![],
      vec![AssignmentRecord::from(&a)],
    );

    assert_eq!(doc.meta.person_count, 0);
    assert_eq!(doc.meta.assignment_count, 1);
  }

  #[test]
  fn document_serialises_with_assignments_key() {
    let doc = OrgDocument::new(vec![], vec![], vec![], vec![]);
    let json = serde_json::to_value(&doc).unwrap();

    assert!(json.get("meta").is_some());
    assert!(json.get("assignments").is_some());
    assert!(json.get("people").is_some());
    assert_eq!(json["meta"]["assignment_count"], 0);
  }
}
