//! Error types for `cadre-core`.
//!
//! One vocabulary shared by the [`OrgStore`](crate::store::OrgStore) trait,
//! every backend, and the API layer, so callers can tell a validation
//! failure from a concurrency conflict from a dangling reference without
//! inspecting message strings.

use thiserror::Error;
use uuid::Uuid;

use crate::{
  assignment::Slot, directory::EntityKind, validate::Violations,
};

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation (hard, pre-write) ──────────────────────────────────────
  #[error("validation failed: {0}")]
  Validation(Violations),

  // ── Concurrency ───────────────────────────────────────────────────────
  /// The targeted row was already closed by another operation. Reload and
  /// retry, or surface to the user.
  #[error("assignment {0} is no longer the current row for its slot")]
  StaleVersion(Uuid),

  #[error("assignment {0} is already terminated")]
  AlreadyTerminated(Uuid),

  // ── Referential ───────────────────────────────────────────────────────
  #[error("person not found: {0}")]
  UnknownPerson(Uuid),

  #[error("unit not found: {0}")]
  UnknownUnit(Uuid),

  #[error("job title not found: {0}")]
  UnknownJobTitle(Uuid),

  /// Deletion refused: assignment rows still reference the entity.
  #[error("{kind} {id} is still referenced by assignment rows")]
  EntityInUse { kind: EntityKind, id: Uuid },

  // ── Lookups & administration ──────────────────────────────────────────
  #[error("assignment not found: {0}")]
  AssignmentNotFound(Uuid),

  /// Purge refused: the slot still has a current row.
  #[error("slot {0} still has a current row")]
  SlotStillActive(Slot),

  // ── Storage & serialization ───────────────────────────────────────────
  /// Backend failure. Fatal for the operation; retry policy belongs to the
  /// caller.
  #[error("storage error: {0}")]
  Storage(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl From<Violations> for Error {
  fn from(violations: Violations) -> Self { Self::Validation(violations) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
