//! Integration tests for `SqliteStore` against an in-memory database.

use cadre_core::{
  Error,
  assignment::{Assignment, AssignmentChange, NewAssignment, Slot},
  directory::{JobTitle, NewJobTitle, NewOrgUnit, NewPerson, OrgUnit, Person},
  interchange::{AssignmentRecord, ConflictPolicy, ImportOutcome},
  store::OrgStore,
  validate::{self, Violation, Warning},
  workload::{self, WorkloadStatus},
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Seed one person, one unit, and one job title.
async fn directory(s: &SqliteStore) -> (Person, OrgUnit, JobTitle) {
  let person = s
    .add_person(NewPerson { display_name: "Ada Lovelace".into() })
    .await
    .unwrap();
  let unit = s
    .add_unit(NewOrgUnit { name: "Engineering".into(), parent_unit_id: None })
    .await
    .unwrap();
  let title = s
    .add_job_title(NewJobTitle { name: "Engineer".into() })
    .await
    .unwrap();
  (person, unit, title)
}

/// Seed a directory and open a full-time assignment from 2024-01-01.
async fn seeded_slot(s: &SqliteStore) -> (Slot, Assignment) {
  let (person, unit, title) = directory(s).await;
  let slot = Slot::new(person.person_id, unit.unit_id, title.job_title_id);
  let (assignment, _) = s
    .create_assignment(NewAssignment::new(slot, date(2024, 1, 1)))
    .await
    .unwrap();
  (slot, assignment)
}

fn violation_matches(
  err: &Error,
  pred: impl Fn(&Violation) -> bool,
) -> bool {
  matches!(err, Error::Validation(v) if v.iter().any(&pred))
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;

  let person = s
    .add_person(NewPerson { display_name: "Grace Hopper".into() })
    .await
    .unwrap();

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.person_id, person.person_id);
  assert_eq!(fetched.display_name, "Grace Hopper");
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_people_sorted_by_name() {
  let s = store().await;
  s.add_person(NewPerson { display_name: "Zuse".into() })
    .await
    .unwrap();
  s.add_person(NewPerson { display_name: "Ada".into() })
    .await
    .unwrap();

  let people = s.list_people().await.unwrap();
  assert_eq!(people.len(), 2);
  assert_eq!(people[0].display_name, "Ada");
}

#[tokio::test]
async fn add_unit_with_unknown_parent_rejected() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = s
    .add_unit(NewOrgUnit {
      name: "Orphan".into(),
      parent_unit_id: Some(ghost),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnknownUnit(id) if id == ghost));
}

#[tokio::test]
async fn remove_person_without_rows_succeeds() {
  let s = store().await;
  let person = s
    .add_person(NewPerson { display_name: "Ephemeral".into() })
    .await
    .unwrap();

  s.remove_person(person.person_id).await.unwrap();
  assert!(s.get_person(person.person_id).await.unwrap().is_none());
}

#[tokio::test]
async fn remove_referenced_person_refused() {
  let s = store().await;
  let (slot, _) = seeded_slot(&s).await;

  let err = s.remove_person(slot.person_id).await.unwrap_err();
  assert!(matches!(err, Error::EntityInUse { .. }));
}

#[tokio::test]
async fn remove_parent_unit_refused_while_children_exist() {
  let s = store().await;
  let parent = s
    .add_unit(NewOrgUnit { name: "Parent".into(), parent_unit_id: None })
    .await
    .unwrap();
  s.add_unit(NewOrgUnit {
    name: "Child".into(),
    parent_unit_id: Some(parent.unit_id),
  })
  .await
  .unwrap();

  let err = s.remove_unit(parent.unit_id).await.unwrap_err();
  assert!(matches!(err, Error::EntityInUse { .. }));
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_opens_version_one() {
  let s = store().await;
  let (slot, assignment) = seeded_slot(&s).await;

  assert_eq!(assignment.version, 1);
  assert!(assignment.is_current);
  assert_eq!(assignment.valid_to, None);
  assert_eq!(assignment.percentage, 1.0);

  let current = s.current_for_slot(slot).await.unwrap().unwrap();
  assert_eq!(current.assignment_id, assignment.assignment_id);
}

#[tokio::test]
async fn create_on_active_slot_rejected() {
  let s = store().await;
  let (slot, _) = seeded_slot(&s).await;

  let err = s
    .create_assignment(NewAssignment::new(slot, date(2025, 1, 1)))
    .await
    .unwrap_err();
  assert!(violation_matches(&err, |v| {
    matches!(v, Violation::SlotAlreadyActive { .. })
  }));
}

#[tokio::test]
async fn create_with_unknown_person_rejected() {
  let s = store().await;
  let (_, unit, title) = directory(&s).await;
  let ghost = Uuid::new_v4();
  let slot = Slot::new(ghost, unit.unit_id, title.job_title_id);

  let err = s
    .create_assignment(NewAssignment::new(slot, date(2024, 1, 1)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnknownPerson(id) if id == ghost));
}

#[tokio::test]
async fn create_rejects_nonpositive_percentage() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let slot = Slot::new(person.person_id, unit.unit_id, title.job_title_id);

  let mut input = NewAssignment::new(slot, date(2024, 1, 1));
  input.percentage = 0.0;

  let err = s.create_assignment(input).await.unwrap_err();
  assert!(violation_matches(&err, |v| {
    matches!(v, Violation::InvalidPercentage { .. })
  }));
}

#[tokio::test]
async fn create_accepts_percentage_at_max() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let slot = Slot::new(person.person_id, unit.unit_id, title.job_title_id);

  let mut input = NewAssignment::new(slot, date(2024, 1, 1));
  input.percentage = 1.0;
  assert!(s.create_assignment(input).await.is_ok());
}

#[tokio::test]
async fn create_rejects_percentage_above_max() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let slot = Slot::new(person.person_id, unit.unit_id, title.job_title_id);

  let mut input = NewAssignment::new(slot, date(2024, 1, 1));
  input.percentage = 1.5;

  let err = s.create_assignment(input).await.unwrap_err();
  assert!(violation_matches(&err, |v| {
    matches!(v, Violation::InvalidPercentage { .. })
  }));
}

// ─── Modify ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn modify_closes_old_row_and_opens_successor() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let change =
    AssignmentChange { percentage: Some(0.5), ..Default::default() };
  let (v2, _) = s
    .modify_assignment(v1.assignment_id, change, date(2024, 6, 1))
    .await
    .unwrap();

  assert_eq!(v2.version, 2);
  assert_eq!(v2.percentage, 0.5);
  assert_eq!(v2.valid_from, date(2024, 6, 1));
  assert!(v2.is_current);
  assert_eq!(v2.valid_to, None);

  let old = s.get_assignment(v1.assignment_id).await.unwrap().unwrap();
  assert!(!old.is_current);
  assert_eq!(old.valid_to, Some(date(2024, 5, 31)));

  let current = s.current_for_slot(slot).await.unwrap().unwrap();
  assert_eq!(current.assignment_id, v2.assignment_id);
}

#[tokio::test]
async fn modify_copies_unspecified_attributes() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let slot = Slot::new(person.person_id, unit.unit_id, title.job_title_id);

  let mut input = NewAssignment::new(slot, date(2024, 1, 1));
  input.is_ad_interim = true;
  input.notes = Some("acting head of unit".into());
  let (v1, _) = s.create_assignment(input).await.unwrap();

  let change =
    AssignmentChange { percentage: Some(0.8), ..Default::default() };
  let (v2, _) = s
    .modify_assignment(v1.assignment_id, change, date(2024, 3, 1))
    .await
    .unwrap();

  assert_eq!(v2.percentage, 0.8);
  assert!(v2.is_ad_interim);
  assert_eq!(v2.notes.as_deref(), Some("acting head of unit"));
}

#[tokio::test]
async fn modify_closed_row_fails_with_stale_version() {
  let s = store().await;
  let (_, v1) = seeded_slot(&s).await;

  s.modify_assignment(
    v1.assignment_id,
    AssignmentChange::default(),
    date(2024, 6, 1),
  )
  .await
  .unwrap();

  let err = s
    .modify_assignment(
      v1.assignment_id,
      AssignmentChange::default(),
      date(2024, 7, 1),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StaleVersion(id) if id == v1.assignment_id));
}

#[tokio::test]
async fn modify_on_valid_from_rejected() {
  let s = store().await;
  let (_, v1) = seeded_slot(&s).await;

  let err = s
    .modify_assignment(
      v1.assignment_id,
      AssignmentChange::default(),
      date(2024, 1, 1),
    )
    .await
    .unwrap_err();
  assert!(violation_matches(&err, |v| {
    matches!(v, Violation::OverlappingWindow { .. })
  }));
}

#[tokio::test]
async fn racing_modifies_have_exactly_one_winner() {
  let s = store().await;
  let (_, v1) = seeded_slot(&s).await;

  let a = s.clone();
  let b = s.clone();
  let change_a =
    AssignmentChange { percentage: Some(0.5), ..Default::default() };
  let change_b =
    AssignmentChange { percentage: Some(0.7), ..Default::default() };

  let (ra, rb) = tokio::join!(
    a.modify_assignment(v1.assignment_id, change_a, date(2024, 6, 1)),
    b.modify_assignment(v1.assignment_id, change_b, date(2024, 7, 1)),
  );

  let winners = usize::from(ra.is_ok()) + usize::from(rb.is_ok());
  assert_eq!(winners, 1);

  let loser = if ra.is_err() {
    ra.unwrap_err()
  } else {
    rb.unwrap_err()
  };
  assert!(matches!(loser, Error::StaleVersion(_)));
}

// ─── Terminate ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn terminate_closes_without_replacement() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let closed = s
    .terminate_assignment(v1.assignment_id, date(2024, 12, 31))
    .await
    .unwrap();

  assert!(!closed.is_current);
  assert_eq!(closed.valid_to, Some(date(2024, 12, 31)));
  assert!(s.current_for_slot(slot).await.unwrap().is_none());
}

#[tokio::test]
async fn terminate_twice_fails_with_already_terminated() {
  let s = store().await;
  let (_, v1) = seeded_slot(&s).await;

  s.terminate_assignment(v1.assignment_id, date(2024, 12, 31))
    .await
    .unwrap();
  let err = s
    .terminate_assignment(v1.assignment_id, date(2025, 1, 31))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::AlreadyTerminated(id) if id == v1.assignment_id)
  );
}

#[tokio::test]
async fn recreate_after_terminate_continues_numbering() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let (v2, _) = s
    .modify_assignment(
      v1.assignment_id,
      AssignmentChange { percentage: Some(0.5), ..Default::default() },
      date(2024, 6, 1),
    )
    .await
    .unwrap();
  s.terminate_assignment(v2.assignment_id, date(2024, 12, 31))
    .await
    .unwrap();

  let (v3, _) = s
    .create_assignment(NewAssignment::new(slot, date(2025, 3, 1)))
    .await
    .unwrap();
  assert_eq!(v3.version, 3);
  assert!(v3.is_current);
}

#[tokio::test]
async fn recreate_inside_closed_history_rejected() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;
  s.terminate_assignment(v1.assignment_id, date(2024, 12, 31))
    .await
    .unwrap();

  // 2024-06-01 falls inside the closed [2024-01-01, 2024-12-31] window.
  let err = s
    .create_assignment(NewAssignment::new(slot, date(2024, 6, 1)))
    .await
    .unwrap_err();
  assert!(violation_matches(&err, |v| {
    matches!(v, Violation::OverlappingWindow { .. })
  }));
}

// ─── Invariants over full histories ──────────────────────────────────────────

#[tokio::test]
async fn history_stays_gapless_and_nonoverlapping() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let (v2, _) = s
    .modify_assignment(
      v1.assignment_id,
      AssignmentChange { percentage: Some(0.5), ..Default::default() },
      date(2024, 6, 1),
    )
    .await
    .unwrap();
  s.terminate_assignment(v2.assignment_id, date(2024, 12, 31))
    .await
    .unwrap();
  s.create_assignment(NewAssignment::new(slot, date(2025, 3, 1)))
    .await
    .unwrap();

  let history = s.history_for_slot(slot).await.unwrap();
  assert_eq!(history.len(), 3);
  assert!(validate::validate_history(&history).is_ok());
  assert_eq!(history.iter().filter(|a| a.is_current).count(), 1);
}

#[tokio::test]
async fn modify_equals_terminate_plus_create() {
  let s = store().await;

  // Slot A: one modify.
  let (slot_a, a1) = seeded_slot(&s).await;
  let (a2, _) = s
    .modify_assignment(
      a1.assignment_id,
      AssignmentChange { percentage: Some(0.5), ..Default::default() },
      date(2024, 6, 1),
    )
    .await
    .unwrap();

  // Slot B: terminate at the close date, then create the same attributes.
  let person = s
    .add_person(NewPerson { display_name: "Mirror".into() })
    .await
    .unwrap();
  let slot_b = Slot::new(person.person_id, slot_a.unit_id, slot_a.job_title_id);
  let (b1, _) = s
    .create_assignment(NewAssignment::new(slot_b, date(2024, 1, 1)))
    .await
    .unwrap();
  s.terminate_assignment(b1.assignment_id, date(2024, 5, 31))
    .await
    .unwrap();
  let mut recreate = NewAssignment::new(slot_b, date(2024, 6, 1));
  recreate.percentage = 0.5;
  let (b2, _) = s.create_assignment(recreate).await.unwrap();

  // Final states line up: same windows, same attributes, and the version
  // incremented rather than resetting.
  let hist_a = s.history_for_slot(slot_a).await.unwrap();
  let hist_b = s.history_for_slot(slot_b).await.unwrap();
  assert_eq!(hist_a.len(), hist_b.len());
  for (ra, rb) in hist_a.iter().zip(&hist_b) {
    assert_eq!(ra.version, rb.version);
    assert_eq!(ra.valid_from, rb.valid_from);
    assert_eq!(ra.valid_to, rb.valid_to);
    assert_eq!(ra.percentage, rb.percentage);
  }
  assert_eq!(a2.version, 2);
  assert_eq!(b2.version, 2);
}

#[tokio::test]
async fn replaying_history_reproduces_current_row() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;
  let (v2, _) = s
    .modify_assignment(
      v1.assignment_id,
      AssignmentChange {
        percentage: Some(0.6),
        is_ad_interim: Some(true),
        ..Default::default()
      },
      date(2024, 6, 1),
    )
    .await
    .unwrap();
  s.modify_assignment(
    v2.assignment_id,
    AssignmentChange { percentage: Some(0.4), ..Default::default() },
    date(2024, 9, 1),
  )
  .await
  .unwrap();

  let history = s.history_for_slot(slot).await.unwrap();

  // Replay the same transitions into a fresh store.
  let replay = store().await;
  let person = replay
    .add_person(NewPerson { display_name: "Replayed".into() })
    .await
    .unwrap();
  let unit = replay
    .add_unit(NewOrgUnit { name: "Engineering".into(), parent_unit_id: None })
    .await
    .unwrap();
  let title = replay
    .add_job_title(NewJobTitle { name: "Engineer".into() })
    .await
    .unwrap();
  let replay_slot =
    Slot::new(person.person_id, unit.unit_id, title.job_title_id);

  let mut live: Option<Assignment> = None;
  for row in &history {
    live = Some(match live {
      None => {
        let mut input = NewAssignment::new(replay_slot, row.valid_from);
        input.percentage = row.percentage;
        input.is_ad_interim = row.is_ad_interim;
        input.is_unit_boss = row.is_unit_boss;
        input.notes = row.notes.clone();
        replay.create_assignment(input).await.unwrap().0
      }
      Some(prev) => {
        let change = AssignmentChange {
          percentage:    Some(row.percentage),
          is_ad_interim: Some(row.is_ad_interim),
          is_unit_boss:  Some(row.is_unit_boss),
          notes:         row.notes.clone(),
        };
        replay
          .modify_assignment(prev.assignment_id, change, row.valid_from)
          .await
          .unwrap()
          .0
      }
    });
  }

  let original = s.current_for_slot(slot).await.unwrap().unwrap();
  let replayed = replay.current_for_slot(replay_slot).await.unwrap().unwrap();
  assert_eq!(replayed.version, original.version);
  assert_eq!(replayed.percentage, original.percentage);
  assert_eq!(replayed.valid_from, original.valid_from);
  assert_eq!(replayed.is_ad_interim, original.is_ad_interim);
  assert_eq!(replayed.valid_to, original.valid_to);
}

// ─── Workload warnings ───────────────────────────────────────────────────────

#[tokio::test]
async fn overallocation_attaches_warning_to_success() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let other_unit = s
    .add_unit(NewOrgUnit { name: "Research".into(), parent_unit_id: None })
    .await
    .unwrap();

  let mut first = NewAssignment::new(
    Slot::new(person.person_id, unit.unit_id, title.job_title_id),
    date(2024, 1, 1),
  );
  first.percentage = 0.6;
  let (_, warnings) = s.create_assignment(first).await.unwrap();
  assert!(warnings.is_empty());

  let mut second = NewAssignment::new(
    Slot::new(person.person_id, other_unit.unit_id, title.job_title_id),
    date(2024, 1, 1),
  );
  second.percentage = 0.5;
  let (row, warnings) = s.create_assignment(second).await.unwrap();

  // The write succeeded; the over-allocation rides along as a warning.
  assert!(row.is_current);
  assert!(matches!(
    warnings[0],
    Warning::OverAllocation { total_percentage, .. }
      if (total_percentage - 1.1).abs() < 1e-9
  ));
}

#[tokio::test]
async fn workload_report_flags_overloaded_person() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let other_unit = s
    .add_unit(NewOrgUnit { name: "Research".into(), parent_unit_id: None })
    .await
    .unwrap();

  let mut first = NewAssignment::new(
    Slot::new(person.person_id, unit.unit_id, title.job_title_id),
    date(2024, 1, 1),
  );
  first.percentage = 0.6;
  s.create_assignment(first).await.unwrap();

  let mut second = NewAssignment::new(
    Slot::new(person.person_id, other_unit.unit_id, title.job_title_id),
    date(2024, 1, 1),
  );
  second.percentage = 0.5;
  s.create_assignment(second).await.unwrap();

  let current = s.current_for_person(person.person_id).await.unwrap();
  let report =
    workload::assess(person.person_id, &current, &Default::default());

  assert!((report.total_percentage - 1.1).abs() < 1e-9);
  assert_eq!(report.status, WorkloadStatus::Overloaded);
  assert_eq!(report.assignment_count, 2);
  assert_eq!(report.unit_count, 2);
}

#[tokio::test]
async fn workload_for_unassigned_person_is_neutral() {
  let s = store().await;
  let current = s.current_for_person(Uuid::new_v4()).await.unwrap();
  assert!(current.is_empty());

  let report = workload::assess(Uuid::new_v4(), &current, &Default::default());
  assert_eq!(report.status, WorkloadStatus::Unassigned);
}

// ─── Import / export ─────────────────────────────────────────────────────────

#[tokio::test]
async fn import_into_empty_slot_creates() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let slot = Slot::new(person.person_id, unit.unit_id, title.job_title_id);

  let record = AssignmentRecord {
    person_id:     slot.person_id,
    unit_id:       slot.unit_id,
    job_title_id:  slot.job_title_id,
    version:       9, // advisory only; the engine assigns its own
    percentage:    0.8,
    is_ad_interim: false,
    is_unit_boss:  true,
    notes:         None,
    valid_from:    date(2024, 1, 1),
    valid_to:      None,
    is_current:    true,
  };

  let (outcome, _) = s
    .apply_imported(record, ConflictPolicy::CreateVersion)
    .await
    .unwrap();
  let ImportOutcome::Created(row) = outcome else {
    panic!("expected Created outcome");
  };
  assert_eq!(row.version, 1);
  assert!(row.is_unit_boss);
}

#[tokio::test]
async fn import_skip_leaves_active_slot_untouched() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let mut record = AssignmentRecord::from(&v1);
  record.percentage = 0.2;

  let (outcome, warnings) =
    s.apply_imported(record, ConflictPolicy::Skip).await.unwrap();
  assert!(matches!(outcome, ImportOutcome::Skipped));
  assert!(warnings.is_empty());

  let current = s.current_for_slot(slot).await.unwrap().unwrap();
  assert_eq!(current.percentage, 1.0);
  assert_eq!(s.history_for_slot(slot).await.unwrap().len(), 1);
}

#[tokio::test]
async fn import_update_overwrites_in_place() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let mut record = AssignmentRecord::from(&v1);
  record.percentage = 0.4;
  record.notes = Some("corrected during maintenance".into());

  let (outcome, _) =
    s.apply_imported(record, ConflictPolicy::Update).await.unwrap();
  let ImportOutcome::Updated(row) = outcome else {
    panic!("expected Updated outcome");
  };

  // Same row, same version, same window — only the attributes moved.
  assert_eq!(row.assignment_id, v1.assignment_id);
  assert_eq!(row.version, 1);
  assert_eq!(row.valid_from, v1.valid_from);

  let history = s.history_for_slot(slot).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].percentage, 0.4);
  assert_eq!(
    history[0].notes.as_deref(),
    Some("corrected during maintenance")
  );
}

#[tokio::test]
async fn import_create_version_routes_through_modify() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  let mut record = AssignmentRecord::from(&v1);
  record.percentage = 0.5;
  record.valid_from = date(2024, 6, 1);

  let (outcome, _) = s
    .apply_imported(record, ConflictPolicy::CreateVersion)
    .await
    .unwrap();
  let ImportOutcome::Versioned(row) = outcome else {
    panic!("expected Versioned outcome");
  };
  assert_eq!(row.version, 2);
  assert_eq!(row.valid_from, date(2024, 6, 1));

  let old = s.get_assignment(v1.assignment_id).await.unwrap().unwrap();
  assert_eq!(old.valid_to, Some(date(2024, 5, 31)));
  assert!(!old.is_current);
}

#[tokio::test]
async fn export_then_reimport_with_skip_creates_no_rows() {
  let s = store().await;
  let (person, unit, title) = directory(&s).await;
  let other_unit = s
    .add_unit(NewOrgUnit { name: "Research".into(), parent_unit_id: None })
    .await
    .unwrap();

  let mut a = NewAssignment::new(
    Slot::new(person.person_id, unit.unit_id, title.job_title_id),
    date(2024, 1, 1),
  );
  a.percentage = 0.6;
  s.create_assignment(a).await.unwrap();
  let mut b = NewAssignment::new(
    Slot::new(person.person_id, other_unit.unit_id, title.job_title_id),
    date(2024, 2, 1),
  );
  b.percentage = 0.3;
  s.create_assignment(b).await.unwrap();

  let exported: Vec<AssignmentRecord> = s
    .current_for_person(person.person_id)
    .await
    .unwrap()
    .iter()
    .map(AssignmentRecord::from)
    .collect();
  assert_eq!(exported.len(), 2);

  for record in exported {
    let (outcome, _) =
      s.apply_imported(record, ConflictPolicy::Skip).await.unwrap();
    assert!(matches!(outcome, ImportOutcome::Skipped));
  }

  let doc = s.export_document().await.unwrap();
  assert_eq!(doc.meta.assignment_count, 2);
}

#[tokio::test]
async fn export_document_counts_collections() {
  let s = store().await;
  let (slot, _) = seeded_slot(&s).await;

  let doc = s.export_document().await.unwrap();
  assert_eq!(doc.meta.person_count, 1);
  assert_eq!(doc.meta.unit_count, 1);
  assert_eq!(doc.meta.job_title_count, 1);
  assert_eq!(doc.meta.assignment_count, 1);
  assert_eq!(doc.assignments[0].person_id, slot.person_id);
  assert!(doc.assignments[0].is_current);
}

// ─── Purge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn purge_refused_while_slot_active() {
  let s = store().await;
  let (slot, _) = seeded_slot(&s).await;

  let err = s.purge_slot(slot).await.unwrap_err();
  assert!(matches!(err, Error::SlotStillActive(_)));
}

#[tokio::test]
async fn purge_after_terminate_frees_the_entities() {
  let s = store().await;
  let (slot, v1) = seeded_slot(&s).await;

  s.terminate_assignment(v1.assignment_id, date(2024, 12, 31))
    .await
    .unwrap();
  let removed = s.purge_slot(slot).await.unwrap();
  assert_eq!(removed, 1);
  assert!(s.history_for_slot(slot).await.unwrap().is_empty());

  // With the history gone, the person is no longer referenced.
  s.remove_person(slot.person_id).await.unwrap();
}

#[tokio::test]
async fn purge_of_empty_slot_removes_nothing() {
  let s = store().await;
  let slot = Slot::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
  assert_eq!(s.purge_slot(slot).await.unwrap(), 0);
}
