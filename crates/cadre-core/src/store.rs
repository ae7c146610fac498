//! The `OrgStore` trait — the engine-facing API surface.
//!
//! The trait is implemented by storage backends (e.g. `cadre-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend,
//! and no component other than a backend touches write primitives: the
//! versioning operations below are the only mutation path for assignment
//! rows.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  Result,
  assignment::{Assignment, AssignmentChange, NewAssignment, Slot},
  directory::{
    JobTitle, NewJobTitle, NewOrgUnit, NewPerson, OrgUnit, Person,
  },
  interchange::{AssignmentRecord, ConflictPolicy, ImportOutcome, OrgDocument},
  validate::Warning,
};

/// Abstraction over a Cadre organizational-chart store backend.
///
/// Assignment rows are append-mostly: `create` and `modify` append, `modify`
/// and `terminate` close, and a closed row is never written again. Every
/// write below executes atomically — validate, write, commit, or abort
/// wholesale.
pub trait OrgStore: Send + Sync {
  // ── Directory ─────────────────────────────────────────────────────────

  /// Create and persist a person. Id and timestamp are store-assigned.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>>> + Send + '_;

  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>>> + Send + '_;

  /// Delete a person. Fails with
  /// [`Error::EntityInUse`](crate::Error::EntityInUse) while any assignment
  /// row still references them.
  fn remove_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn add_unit(
    &self,
    input: NewOrgUnit,
  ) -> impl Future<Output = Result<OrgUnit>> + Send + '_;

  fn get_unit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OrgUnit>>> + Send + '_;

  fn list_units(
    &self,
  ) -> impl Future<Output = Result<Vec<OrgUnit>>> + Send + '_;

  fn remove_unit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn add_job_title(
    &self,
    input: NewJobTitle,
  ) -> impl Future<Output = Result<JobTitle>> + Send + '_;

  fn get_job_title(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<JobTitle>>> + Send + '_;

  fn list_job_titles(
    &self,
  ) -> impl Future<Output = Result<Vec<JobTitle>>> + Send + '_;

  fn remove_job_title(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Versioning engine — writes ────────────────────────────────────────

  /// Open a new active period for a slot.
  ///
  /// Version is 1 for a virgin slot and continues from the last used
  /// version otherwise. Fails with a
  /// [`SlotAlreadyActive`](crate::validate::Violation::SlotAlreadyActive)
  /// violation if the slot already has a current row, and with
  /// `Unknown{Person,Unit,JobTitle}` if a reference dangles.
  fn create_assignment(
    &self,
    input: NewAssignment,
  ) -> impl Future<Output = Result<(Assignment, Vec<Warning>)>> + Send + '_;

  /// Close the current row at `effective_date - 1 day` and append its
  /// successor (version + 1, `valid_from = effective_date`), copying over
  /// attributes the change leaves unset — one atomic transition.
  ///
  /// Fails with [`Error::StaleVersion`](crate::Error::StaleVersion) if the
  /// target row was already closed by a concurrent operation.
  fn modify_assignment(
    &self,
    assignment_id: Uuid,
    change: AssignmentChange,
    effective_date: NaiveDate,
  ) -> impl Future<Output = Result<(Assignment, Vec<Warning>)>> + Send + '_;

  /// Close the current row with no replacement; the slot becomes inactive.
  ///
  /// Fails with [`Error::AlreadyTerminated`](crate::Error::AlreadyTerminated)
  /// if the row is not current.
  fn terminate_assignment(
    &self,
    assignment_id: Uuid,
    effective_date: NaiveDate,
  ) -> impl Future<Output = Result<Assignment>> + Send + '_;

  /// Bulk-import variant: apply one incoming record under `policy`.
  /// Same contract as the primary operations — every invariant still holds.
  fn apply_imported(
    &self,
    record: AssignmentRecord,
    policy: ConflictPolicy,
  ) -> impl Future<Output = Result<(ImportOutcome, Vec<Warning>)>> + Send + '_;

  /// Irreversibly delete a slot's full history. Administrative and rare;
  /// refused with [`Error::SlotStillActive`](crate::Error::SlotStillActive)
  /// while a current row exists. Returns the number of rows removed.
  fn purge_slot(
    &self,
    slot: Slot,
  ) -> impl Future<Output = Result<usize>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_assignment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assignment>>> + Send + '_;

  /// The single current row for a slot, if the slot is active.
  fn current_for_slot(
    &self,
    slot: Slot,
  ) -> impl Future<Output = Result<Option<Assignment>>> + Send + '_;

  /// A slot's full version history, ordered by version.
  fn history_for_slot(
    &self,
    slot: Slot,
  ) -> impl Future<Output = Result<Vec<Assignment>>> + Send + '_;

  /// All current rows held by a person, across slots.
  fn current_for_person(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Assignment>>> + Send + '_;

  /// Materialise the whole store as one interchange document.
  fn export_document(
    &self,
  ) -> impl Future<Output = Result<OrgDocument>> + Send + '_;
}
