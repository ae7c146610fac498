//! The Consistency Validator — pure checks of temporal and business
//! invariants, run by the versioning engine before any write.
//!
//! All functions here are side-effect-free. Hard violations come back as a
//! [`Violations`] list and abort the write; soft findings come back as
//! [`Warning`]s and ride along on the successful result.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assignment::{Assignment, NewAssignment, Slot};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Bounds and thresholds for validation. Injected into the store at
/// construction; there is no ambient global configuration.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
  /// Hard upper bound on a single row's percentage. The bound itself is
  /// accepted; anything above it is rejected.
  pub max_percentage:     f64,
  /// Soft per-person threshold: current rows summing above this raise an
  /// over-allocation warning, never a failure.
  pub overload_threshold: f64,
}

impl Default for ValidationConfig {
  fn default() -> Self {
    Self { max_percentage: 1.0, overload_threshold: 1.0 }
  }
}

// ─── Violations ──────────────────────────────────────────────────────────────

/// A hard invariant breach detected before a write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
  /// Percentage outside `(0, max]`.
  InvalidPercentage { value: f64, max: f64 },
  /// A `create` landed on a slot that already has a current row.
  SlotAlreadyActive { slot: Slot, current_id: Uuid },
  /// The candidate validity window intersects an existing row's window.
  OverlappingWindow { valid_from: NaiveDate, conflicting_id: Uuid },
  /// Version numbers for a slot, ordered by `valid_from`, are not the
  /// sequence 1,2,3,…
  OutOfOrderVersion { slot: Slot, expected: u32, found: u32 },
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidPercentage { value, max } => {
        write!(f, "percentage {value} outside (0, {max}]")
      }
      Self::SlotAlreadyActive { slot, current_id } => {
        write!(f, "slot {slot} already has current row {current_id}")
      }
      Self::OverlappingWindow { valid_from, conflicting_id } => {
        write!(
          f,
          "window starting {valid_from} overlaps row {conflicting_id}"
        )
      }
      Self::OutOfOrderVersion { slot, expected, found } => {
        write!(
          f,
          "slot {slot}: expected version {expected}, found {found}"
        )
      }
    }
  }
}

/// The non-empty list of violations a rejected write carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for v in &self.0 {
      if !first {
        write!(f, "; ")?;
      }
      write!(f, "{v}")?;
      first = false;
    }
    Ok(())
  }
}

impl std::ops::Deref for Violations {
  type Target = [Violation];
  fn deref(&self) -> &[Violation] { &self.0 }
}

// ─── Warnings ────────────────────────────────────────────────────────────────

/// A soft finding attached to a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
  /// The person's current rows (including the one just written) sum above
  /// the configured threshold.
  OverAllocation {
    person_id:        Uuid,
    total_percentage: f64,
    threshold:        f64,
  },
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Inclusive-date window intersection. An open end (`None`) extends forever.
pub fn windows_overlap(
  a_from: NaiveDate,
  a_to: Option<NaiveDate>,
  b_from: NaiveDate,
  b_to: Option<NaiveDate>,
) -> bool {
  let a_ends_before_b = a_to.is_some_and(|to| to < b_from);
  let b_ends_before_a = b_to.is_some_and(|to| to < a_from);
  !(a_ends_before_b || b_ends_before_a)
}

/// Last day an outgoing row remains effective when its successor starts on
/// `effective`. Unreachable saturation aside, this is `effective - 1 day`.
pub fn close_on(effective: NaiveDate) -> NaiveDate {
  effective.pred_opt().unwrap_or(NaiveDate::MIN)
}

fn percentage_violation(
  value: f64,
  cfg: &ValidationConfig,
) -> Option<Violation> {
  if value > 0.0 && value <= cfg.max_percentage {
    None
  } else {
    Some(Violation::InvalidPercentage { value, max: cfg.max_percentage })
  }
}

/// Hard percentage bound: `(0, max]`, the bound itself accepted.
pub fn check_percentage(
  value: f64,
  cfg: &ValidationConfig,
) -> Result<(), Violations> {
  match percentage_violation(value, cfg) {
    None => Ok(()),
    Some(v) => Err(Violations(vec![v])),
  }
}

// ─── History audit ───────────────────────────────────────────────────────────

/// Audit a slot's full history (any row order): versions ordered by
/// `valid_from` must form 1,2,3,… with no gaps or repeats, windows must not
/// overlap, and at most one row may be current.
///
/// The engine runs this over the loaded slot before every transition; a slot
/// that fails the audit never accepts another write.
pub fn validate_history(rows: &[Assignment]) -> Result<(), Violations> {
  let mut violations = Vec::new();

  let mut ordered: Vec<&Assignment> = rows.iter().collect();
  ordered.sort_by_key(|a| (a.valid_from, a.version));

  for (i, row) in ordered.iter().enumerate() {
    let expected = (i + 1) as u32;
    if row.version != expected {
      violations.push(Violation::OutOfOrderVersion {
        slot:     row.slot,
        expected,
        found:    row.version,
      });
    }
  }

  for pair in ordered.windows(2) {
    let (a, b) = (pair[0], pair[1]);
    if windows_overlap(a.valid_from, a.valid_to, b.valid_from, b.valid_to) {
      violations.push(Violation::OverlappingWindow {
        valid_from:     b.valid_from,
        conflicting_id: a.assignment_id,
      });
    }
  }

  let mut current = ordered.iter().filter(|a| a.is_current);
  if let (Some(first), Some(second)) = (current.next(), current.next()) {
    violations.push(Violation::SlotAlreadyActive {
      slot:       second.slot,
      current_id: first.assignment_id,
    });
  }

  if violations.is_empty() { Ok(()) } else { Err(Violations(violations)) }
}

// ─── Operation checks ────────────────────────────────────────────────────────

/// Checks for `create`: percentage bound, no existing current row, and the
/// candidate's open window must start after every closed window ends.
pub fn validate_create(
  history: &[Assignment],
  candidate: &NewAssignment,
  cfg: &ValidationConfig,
) -> Result<(), Violations> {
  let mut violations = Vec::new();

  if let Some(v) = percentage_violation(candidate.percentage, cfg) {
    violations.push(v);
  }

  for row in history {
    if row.is_current {
      violations.push(Violation::SlotAlreadyActive {
        slot:       candidate.slot,
        current_id: row.assignment_id,
      });
    } else if windows_overlap(
      candidate.valid_from,
      None,
      row.valid_from,
      row.valid_to,
    ) {
      violations.push(Violation::OverlappingWindow {
        valid_from:     candidate.valid_from,
        conflicting_id: row.assignment_id,
      });
    }
  }

  if violations.is_empty() { Ok(()) } else { Err(Violations(violations)) }
}

/// Checks for `modify`: the replacement percentage must be in bounds and the
/// effective date strictly after the outgoing row's `valid_from`, so the
/// close at `effective - 1` leaves a non-empty outgoing window.
pub fn validate_modify(
  current: &Assignment,
  effective_date: NaiveDate,
  new_percentage: f64,
  cfg: &ValidationConfig,
) -> Result<(), Violations> {
  let mut violations = Vec::new();

  if let Some(v) = percentage_violation(new_percentage, cfg) {
    violations.push(v);
  }

  if effective_date <= current.valid_from {
    violations.push(Violation::OverlappingWindow {
      valid_from:     effective_date,
      conflicting_id: current.assignment_id,
    });
  }

  if violations.is_empty() { Ok(()) } else { Err(Violations(violations)) }
}

/// Checks for `terminate`: closing on `effective_date` must leave a
/// non-empty window, so the date may not precede `valid_from`. Same-day
/// termination (a one-day assignment) is allowed.
pub fn validate_terminate(
  current: &Assignment,
  effective_date: NaiveDate,
) -> Result<(), Violations> {
  if effective_date < current.valid_from {
    return Err(Violations(vec![Violation::OverlappingWindow {
      valid_from:     effective_date,
      conflicting_id: current.assignment_id,
    }]));
  }
  Ok(())
}

// ─── Soft checks ─────────────────────────────────────────────────────────────

/// Over-allocation check: the candidate percentage plus the person's *other*
/// current rows, against the soft threshold. Exceeding it is a warning, never
/// a failure.
pub fn overallocation_warnings(
  person_id: Uuid,
  candidate_percentage: f64,
  other_current: &[Assignment],
  cfg: &ValidationConfig,
) -> Vec<Warning> {
  let total: f64 = candidate_percentage
    + other_current.iter().map(|a| a.percentage).sum::<f64>();

  if total > cfg.overload_threshold {
    vec![Warning::OverAllocation {
      person_id,
      total_percentage: total,
      threshold: cfg.overload_threshold,
    }]
  } else {
    Vec::new()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
