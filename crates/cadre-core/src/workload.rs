//! The Workload Aggregator — read-only derived views over a person's
//! current assignment rows.
//!
//! Reports are computed on demand and never stored. A person with zero
//! current rows gets the neutral [`WorkloadStatus::Unassigned`] report;
//! asking about an unknown person is not an error at this layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assignment::Assignment;

// ─── Thresholds ──────────────────────────────────────────────────────────────

/// Status classification cut-offs, as fractions of full time.
#[derive(Debug, Clone)]
pub struct WorkloadThresholds {
  /// Totals below this are under-utilized.
  pub under_utilized: f64,
  /// Totals at or above this (but within `overloaded`) are high.
  pub high:           f64,
  /// Totals above this are overloaded.
  pub overloaded:     f64,
}

impl Default for WorkloadThresholds {
  fn default() -> Self {
    Self { under_utilized: 0.5, high: 0.9, overloaded: 1.0 }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Classification of a person's aggregate workload.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkloadStatus {
  Unassigned,
  UnderUtilized,
  Optimal,
  High,
  Overloaded,
}

impl WorkloadStatus {
  fn classify(total: f64, thresholds: &WorkloadThresholds) -> Self {
    if total == 0.0 {
      Self::Unassigned
    } else if total < thresholds.under_utilized {
      Self::UnderUtilized
    } else if total < thresholds.high {
      Self::Optimal
    } else if total <= thresholds.overloaded {
      Self::High
    } else {
      Self::Overloaded
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Per-unit share of a person's workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitWorkload {
  pub unit_id:          Uuid,
  pub total_percentage: f64,
  pub assignment_count: usize,
}

/// The computed workload view for one person — never stored, always derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadReport {
  pub person_id:        Uuid,
  pub total_percentage: f64,
  pub assignment_count: usize,
  pub unit_count:       usize,
  pub job_title_count:  usize,
  pub interim_count:    usize,
  pub unit_boss_count:  usize,
  pub status:           WorkloadStatus,
  pub recommendations:  Vec<String>,
  pub units:            Vec<UnitWorkload>,
}

/// Aggregate `current` rows into a [`WorkloadReport`].
///
/// Rows with `is_current = false` are ignored; the flag is read as written
/// by the engine, never recomputed here.
pub fn assess(
  person_id: Uuid,
  current: &[Assignment],
  thresholds: &WorkloadThresholds,
) -> WorkloadReport {
  let rows: Vec<&Assignment> =
    current.iter().filter(|a| a.is_current).collect();

  let total_percentage: f64 = rows.iter().map(|a| a.percentage).sum();
  let interim_count = rows.iter().filter(|a| a.is_ad_interim).count();
  let unit_boss_count = rows.iter().filter(|a| a.is_unit_boss).count();

  let mut units: Vec<UnitWorkload> = Vec::new();
  for row in &rows {
    match units.iter_mut().find(|u| u.unit_id == row.slot.unit_id) {
      Some(u) => {
        u.total_percentage += row.percentage;
        u.assignment_count += 1;
      }
      None => units.push(UnitWorkload {
        unit_id:          row.slot.unit_id,
        total_percentage: row.percentage,
        assignment_count: 1,
      }),
    }
  }
  units.sort_by_key(|u| u.unit_id);

  let mut job_titles: Vec<Uuid> =
    rows.iter().map(|a| a.slot.job_title_id).collect();
  job_titles.sort();
  job_titles.dedup();

  let status = WorkloadStatus::classify(total_percentage, thresholds);
  let recommendations =
    recommend(status, total_percentage, interim_count, thresholds);

  WorkloadReport {
    person_id,
    total_percentage,
    assignment_count: rows.len(),
    unit_count: units.len(),
    job_title_count: job_titles.len(),
    interim_count,
    unit_boss_count,
    status,
    recommendations,
    units,
  }
}

fn recommend(
  status: WorkloadStatus,
  total: f64,
  interim_count: usize,
  thresholds: &WorkloadThresholds,
) -> Vec<String> {
  let mut out = Vec::new();

  match status {
    WorkloadStatus::Unassigned => {
      out.push("no active assignments".to_string());
    }
    WorkloadStatus::UnderUtilized => {
      out.push(format!(
        "capacity available: workload is {:.0}% of full time",
        total * 100.0
      ));
    }
    WorkloadStatus::Overloaded => {
      out.push(format!(
        "over-allocated by {:.0}%: rebalance or close an assignment",
        (total - thresholds.overloaded) * 100.0
      ));
    }
    WorkloadStatus::Optimal | WorkloadStatus::High => {}
  }

  if interim_count > 0 {
    out.push(format!(
      "{interim_count} ad-interim assignment(s) awaiting a permanent \
       appointment"
    ));
  }

  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::assignment::Slot;

  fn current_row(
    person_id: Uuid,
    unit_id: Uuid,
    percentage: f64,
  ) -> Assignment {
    Assignment {
      assignment_id: Uuid::new_v4(),
      slot: Slot::new(person_id, unit_id, Uuid::new_v4()),
      version: 1,
      percentage,
      is_ad_interim: false,
      is_unit_boss: false,
      notes: None,
      valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      valid_to: None,
      is_current: true,
    }
  }

  #[test]
  fn empty_input_is_neutral_not_an_error() {
    let person = Uuid::new_v4();
    let report = assess(person, &[], &Default::default());

    assert_eq!(report.person_id, person);
    assert_eq!(report.status, WorkloadStatus::Unassigned);
    assert_eq!(report.total_percentage, 0.0);
    assert_eq!(report.assignment_count, 0);
    assert!(report.units.is_empty());
    assert_eq!(report.recommendations, vec!["no active assignments"]);
  }

  #[test]
  fn two_rows_totalling_110_percent_are_overloaded() {
    let person = Uuid::new_v4();
    let rows = vec![
      current_row(person, Uuid::new_v4(), 0.6),
      current_row(person, Uuid::new_v4(), 0.5),
    ];

    let report = assess(person, &rows, &Default::default());
    assert!((report.total_percentage - 1.1).abs() < 1e-9);
    assert_eq!(report.status, WorkloadStatus::Overloaded);
    assert_eq!(report.assignment_count, 2);
    assert_eq!(report.unit_count, 2);
  }

  #[test]
  fn exactly_full_time_is_high_not_overloaded() {
    let person = Uuid::new_v4();
    let rows = vec![current_row(person, Uuid::new_v4(), 1.0)];
    let report = assess(person, &rows, &Default::default());
    assert_eq!(report.status, WorkloadStatus::High);
  }

  #[test]
  fn half_time_is_optimal_boundary() {
    let person = Uuid::new_v4();
    let rows = vec![current_row(person, Uuid::new_v4(), 0.5)];
    let report = assess(person, &rows, &Default::default());
    assert_eq!(report.status, WorkloadStatus::Optimal);
  }

  #[test]
  fn rows_in_the_same_unit_group_together() {
    let person = Uuid::new_v4();
    let unit = Uuid::new_v4();
    let rows = vec![
      current_row(person, unit, 0.3),
      current_row(person, unit, 0.2),
      current_row(person, Uuid::new_v4(), 0.2),
    ];

    let report = assess(person, &rows, &Default::default());
    assert_eq!(report.unit_count, 2);
    assert_eq!(report.assignment_count, 3);

    let grouped = report
      .units
      .iter()
      .find(|u| u.unit_id == unit)
      .expect("grouped unit present");
    assert_eq!(grouped.assignment_count, 2);
    assert!((grouped.total_percentage - 0.5).abs() < 1e-9);
  }

  #[test]
  fn closed_rows_are_ignored() {
    let person = Uuid::new_v4();
    let mut closed = current_row(person, Uuid::new_v4(), 0.8);
    closed.is_current = false;
    closed.valid_to = NaiveDate::from_ymd_opt(2024, 6, 30);

    let report = assess(person, &[closed], &Default::default());
    assert_eq!(report.status, WorkloadStatus::Unassigned);
    assert_eq!(report.assignment_count, 0);
  }

  #[test]
  fn interim_rows_produce_a_recommendation() {
    let person = Uuid::new_v4();
    let mut row = current_row(person, Uuid::new_v4(), 0.8);
    row.is_ad_interim = true;

    let report = assess(person, &[row], &Default::default());
    assert_eq!(report.interim_count, 1);
    assert!(
      report.recommendations.iter().any(|r| r.contains("ad-interim"))
    );
  }
}
