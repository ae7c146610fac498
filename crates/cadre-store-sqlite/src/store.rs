//! [`SqliteStore`] — the SQLite implementation of
//! [`OrgStore`](cadre_core::store::OrgStore).
//!
//! This is the versioning engine proper: every write below runs inside one
//! SQLite transaction — load the slot, run the consistency validator, write,
//! commit — or rolls back wholesale. Concurrent modifies serialize on the
//! store's single writer thread; the loser of a race observes the row it
//! targeted already closed and fails with `StaleVersion` instead of producing
//! a second current row.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cadre_core::{
  Error as CoreError, Result as CoreResult,
  assignment::{Assignment, AssignmentChange, NewAssignment, Slot},
  directory::{
    EntityKind, JobTitle, NewJobTitle, NewOrgUnit, NewPerson, OrgUnit, Person,
  },
  interchange::{AssignmentRecord, ConflictPolicy, ImportOutcome, OrgDocument},
  store::OrgStore,
  validate::{self, ValidationConfig, Violations, Warning},
};

use crate::{
  Error,
  encode::{
    RawAssignment, RawJobTitle, RawPerson, RawUnit, encode_date, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cadre organizational-chart store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Validation
/// bounds are injected at construction and used for every write.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  cfg:  ValidationConfig,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default validation bounds.
  pub async fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
    Self::open_with_config(path, ValidationConfig::default()).await
  }

  /// Open (or create) a store at `path` with explicit validation bounds.
  pub async fn open_with_config(
    path: impl AsRef<Path>,
    cfg: ValidationConfig,
  ) -> crate::Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, cfg };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> crate::Result<Self> {
    Self::open_in_memory_with_config(ValidationConfig::default()).await
  }

  /// In-memory store with explicit validation bounds.
  pub async fn open_in_memory_with_config(
    cfg: ValidationConfig,
  ) -> crate::Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, cfg };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> crate::Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread, funnelling transport failures into
  /// the shared error vocabulary.
  async fn with_conn<T, F>(&self, f: F) -> CoreResult<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<T>
      + Send
      + 'static,
  {
    self
      .conn
      .call(f)
      .await
      .map_err(|e| CoreError::from(Error::Database(e)))
  }
}

// ─── Transaction plumbing ────────────────────────────────────────────────────

/// Failure inside a write transaction: a domain refusal (rolls back, comes
/// back to the caller as a typed error) or a database fault.
enum TxError {
  Domain(CoreError),
  Db(rusqlite::Error),
}

type TxResult<T> = std::result::Result<T, TxError>;

impl From<rusqlite::Error> for TxError {
  fn from(e: rusqlite::Error) -> Self { Self::Db(e) }
}

impl From<CoreError> for TxError {
  fn from(e: CoreError) -> Self { Self::Domain(e) }
}

impl From<Violations> for TxError {
  fn from(v: Violations) -> Self { Self::Domain(CoreError::Validation(v)) }
}

impl From<Error> for TxError {
  fn from(e: Error) -> Self { Self::Domain(e.into()) }
}

/// Validate → write → commit, or abort wholesale. Dropping the transaction
/// without commit rolls every statement back, so no row is ever half-written.
fn run_tx<T>(
  conn: &mut rusqlite::Connection,
  f: impl FnOnce(&rusqlite::Transaction<'_>) -> TxResult<T>,
) -> tokio_rusqlite::Result<std::result::Result<T, CoreError>> {
  let tx = conn.transaction()?;
  match f(&tx) {
    Ok(value) => {
      tx.commit()?;
      Ok(Ok(value))
    }
    Err(TxError::Domain(e)) => Ok(Err(e)),
    Err(TxError::Db(e)) => Err(e.into()),
  }
}

// ─── Row queries (shared by reads and transactions) ──────────────────────────

const ASSIGNMENT_COLUMNS: &str = "assignment_id, person_id, unit_id, \
  job_title_id, version, percentage, is_ad_interim, is_unit_boss, notes, \
  valid_from, valid_to, is_current";

fn raw_assignment(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAssignment> {
  Ok(RawAssignment {
    assignment_id: row.get(0)?,
    person_id:     row.get(1)?,
    unit_id:       row.get(2)?,
    job_title_id:  row.get(3)?,
    version:       row.get(4)?,
    percentage:    row.get(5)?,
    is_ad_interim: row.get(6)?,
    is_unit_boss:  row.get(7)?,
    notes:         row.get(8)?,
    valid_from:    row.get(9)?,
    valid_to:      row.get(10)?,
    is_current:    row.get(11)?,
  })
}

fn query_assignment(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> rusqlite::Result<Option<RawAssignment>> {
  conn
    .query_row(
      &format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE assignment_id = ?1"
      ),
      rusqlite::params![encode_uuid(id)],
      raw_assignment,
    )
    .optional()
}

fn query_slot_history(
  conn: &rusqlite::Connection,
  slot: &Slot,
) -> rusqlite::Result<Vec<RawAssignment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
     WHERE person_id = ?1 AND unit_id = ?2 AND job_title_id = ?3
     ORDER BY version"
  ))?;
  let rows = stmt.query_map(
    rusqlite::params![
      encode_uuid(slot.person_id),
      encode_uuid(slot.unit_id),
      encode_uuid(slot.job_title_id),
    ],
    raw_assignment,
  )?;
  rows.collect()
}

fn query_current_for_person(
  conn: &rusqlite::Connection,
  person_id: Uuid,
) -> rusqlite::Result<Vec<RawAssignment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
     WHERE person_id = ?1 AND is_current = 1
     ORDER BY valid_from"
  ))?;
  let rows =
    stmt.query_map(rusqlite::params![encode_uuid(person_id)], raw_assignment)?;
  rows.collect()
}

fn exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: Uuid,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, rusqlite::params![encode_uuid(id)], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

fn insert_assignment(
  conn: &rusqlite::Connection,
  a: &Assignment,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO assignments (
       assignment_id, person_id, unit_id, job_title_id, version, percentage,
       is_ad_interim, is_unit_boss, notes, valid_from, valid_to, is_current
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    rusqlite::params![
      encode_uuid(a.assignment_id),
      encode_uuid(a.slot.person_id),
      encode_uuid(a.slot.unit_id),
      encode_uuid(a.slot.job_title_id),
      i64::from(a.version),
      a.percentage,
      a.is_ad_interim,
      a.is_unit_boss,
      a.notes,
      encode_date(a.valid_from),
      a.valid_to.map(encode_date),
      a.is_current,
    ],
  )?;
  Ok(())
}

/// Close a row: set its inclusive end date and clear the current flag.
/// Returns the number of rows hit — 0 means the row was no longer current,
/// i.e. a concurrent operation got there first.
fn close_row(
  conn: &rusqlite::Connection,
  id: Uuid,
  valid_to: NaiveDate,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE assignments SET valid_to = ?2, is_current = 0
     WHERE assignment_id = ?1 AND is_current = 1",
    rusqlite::params![encode_uuid(id), encode_date(valid_to)],
  )
}

// ─── Typed loads (transaction side) ──────────────────────────────────────────

fn load_assignment(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> TxResult<Option<Assignment>> {
  query_assignment(conn, id)?
    .map(RawAssignment::into_assignment)
    .transpose()
    .map_err(TxError::from)
}

fn load_slot_history(
  conn: &rusqlite::Connection,
  slot: &Slot,
) -> TxResult<Vec<Assignment>> {
  query_slot_history(conn, slot)?
    .into_iter()
    .map(|raw| raw.into_assignment().map_err(TxError::from))
    .collect()
}

fn load_current_for_person(
  conn: &rusqlite::Connection,
  person_id: Uuid,
) -> TxResult<Vec<Assignment>> {
  query_current_for_person(conn, person_id)?
    .into_iter()
    .map(|raw| raw.into_assignment().map_err(TxError::from))
    .collect()
}

fn check_slot_references(
  conn: &rusqlite::Connection,
  slot: &Slot,
) -> TxResult<()> {
  if !exists(conn, "SELECT 1 FROM people WHERE person_id = ?1", slot.person_id)?
  {
    return Err(CoreError::UnknownPerson(slot.person_id).into());
  }
  if !exists(conn, "SELECT 1 FROM units WHERE unit_id = ?1", slot.unit_id)? {
    return Err(CoreError::UnknownUnit(slot.unit_id).into());
  }
  if !exists(
    conn,
    "SELECT 1 FROM job_titles WHERE job_title_id = ?1",
    slot.job_title_id,
  )? {
    return Err(CoreError::UnknownJobTitle(slot.job_title_id).into());
  }
  Ok(())
}

// ─── Engine transitions ──────────────────────────────────────────────────────

fn create_tx(
  tx: &rusqlite::Transaction<'_>,
  cfg: &ValidationConfig,
  input: &NewAssignment,
) -> TxResult<(Assignment, Vec<Warning>)> {
  check_slot_references(tx, &input.slot)?;

  let history = load_slot_history(tx, &input.slot)?;
  validate::validate_history(&history)?;
  validate::validate_create(&history, input, cfg)?;

  // Numbering continues across terminate/recreate; 1 only for a virgin slot.
  let version = history.iter().map(|a| a.version).max().unwrap_or(0) + 1;

  let others = load_current_for_person(tx, input.slot.person_id)?;
  let warnings = validate::overallocation_warnings(
    input.slot.person_id,
    input.percentage,
    &others,
    cfg,
  );

  let assignment = Assignment {
    assignment_id: Uuid::new_v4(),
    slot: input.slot,
    version,
    percentage: input.percentage,
    is_ad_interim: input.is_ad_interim,
    is_unit_boss: input.is_unit_boss,
    notes: input.notes.clone(),
    valid_from: input.valid_from,
    valid_to: None,
    is_current: true,
  };
  insert_assignment(tx, &assignment)?;

  Ok((assignment, warnings))
}

fn modify_tx(
  tx: &rusqlite::Transaction<'_>,
  cfg: &ValidationConfig,
  assignment_id: Uuid,
  change: &AssignmentChange,
  effective_date: NaiveDate,
) -> TxResult<(Assignment, Vec<Warning>)> {
  let row = load_assignment(tx, assignment_id)?
    .ok_or(CoreError::AssignmentNotFound(assignment_id))?;
  if !row.is_current {
    return Err(CoreError::StaleVersion(assignment_id).into());
  }

  let history = load_slot_history(tx, &row.slot)?;
  validate::validate_history(&history)?;

  let new_percentage = change.percentage.unwrap_or(row.percentage);
  validate::validate_modify(&row, effective_date, new_percentage, cfg)?;

  let others: Vec<Assignment> =
    load_current_for_person(tx, row.slot.person_id)?
      .into_iter()
      .filter(|a| a.assignment_id != row.assignment_id)
      .collect();
  let warnings = validate::overallocation_warnings(
    row.slot.person_id,
    new_percentage,
    &others,
    cfg,
  );

  // The close is the serialization point: a racing modify that committed
  // first leaves nothing for this UPDATE to hit.
  let closed = close_row(tx, row.assignment_id, validate::close_on(effective_date))?;
  if closed != 1 {
    return Err(CoreError::StaleVersion(assignment_id).into());
  }

  let replacement = Assignment {
    assignment_id: Uuid::new_v4(),
    slot: row.slot,
    version: row.version + 1,
    percentage: new_percentage,
    is_ad_interim: change.is_ad_interim.unwrap_or(row.is_ad_interim),
    is_unit_boss: change.is_unit_boss.unwrap_or(row.is_unit_boss),
    notes: change.notes.clone().or_else(|| row.notes.clone()),
    valid_from: effective_date,
    valid_to: None,
    is_current: true,
  };
  insert_assignment(tx, &replacement)?;

  Ok((replacement, warnings))
}

fn terminate_tx(
  tx: &rusqlite::Transaction<'_>,
  assignment_id: Uuid,
  effective_date: NaiveDate,
) -> TxResult<Assignment> {
  let row = load_assignment(tx, assignment_id)?
    .ok_or(CoreError::AssignmentNotFound(assignment_id))?;
  if !row.is_current {
    return Err(CoreError::AlreadyTerminated(assignment_id).into());
  }

  let history = load_slot_history(tx, &row.slot)?;
  validate::validate_history(&history)?;
  validate::validate_terminate(&row, effective_date)?;

  let closed = close_row(tx, row.assignment_id, effective_date)?;
  if closed != 1 {
    return Err(CoreError::AlreadyTerminated(assignment_id).into());
  }

  Ok(Assignment {
    valid_to: Some(effective_date),
    is_current: false,
    ..row
  })
}

fn apply_imported_tx(
  tx: &rusqlite::Transaction<'_>,
  cfg: &ValidationConfig,
  record: &AssignmentRecord,
  policy: ConflictPolicy,
) -> TxResult<(ImportOutcome, Vec<Warning>)> {
  let slot = record.slot();
  let history = load_slot_history(tx, &slot)?;
  let current = history.iter().find(|a| a.is_current).cloned();

  let Some(current) = current else {
    // No conflict: a fresh active period, subject to every invariant.
    let input = NewAssignment {
      slot,
      percentage: record.percentage,
      is_ad_interim: record.is_ad_interim,
      is_unit_boss: record.is_unit_boss,
      notes: record.notes.clone(),
      valid_from: record.valid_from,
    };
    let (assignment, warnings) = create_tx(tx, cfg, &input)?;
    return Ok((ImportOutcome::Created(assignment), warnings));
  };

  match policy {
    ConflictPolicy::Skip => Ok((ImportOutcome::Skipped, Vec::new())),

    ConflictPolicy::Update => {
      // Maintenance-only overwrite: attributes change in place, the window
      // and version do not. The hard percentage bound still applies.
      validate::check_percentage(record.percentage, cfg)?;

      tx.execute(
        "UPDATE assignments
         SET percentage = ?2, is_ad_interim = ?3, is_unit_boss = ?4,
             notes = ?5
         WHERE assignment_id = ?1 AND is_current = 1",
        rusqlite::params![
          encode_uuid(current.assignment_id),
          record.percentage,
          record.is_ad_interim,
          record.is_unit_boss,
          record.notes,
        ],
      )?;

      let others: Vec<Assignment> =
        load_current_for_person(tx, slot.person_id)?
          .into_iter()
          .filter(|a| a.assignment_id != current.assignment_id)
          .collect();
      let warnings = validate::overallocation_warnings(
        slot.person_id,
        record.percentage,
        &others,
        cfg,
      );

      let updated = Assignment {
        percentage: record.percentage,
        is_ad_interim: record.is_ad_interim,
        is_unit_boss: record.is_unit_boss,
        notes: record.notes.clone(),
        ..current
      };
      Ok((ImportOutcome::Updated(updated), warnings))
    }

    ConflictPolicy::CreateVersion => {
      let change = AssignmentChange {
        percentage:    Some(record.percentage),
        is_ad_interim: Some(record.is_ad_interim),
        is_unit_boss:  Some(record.is_unit_boss),
        notes:         record.notes.clone(),
      };
      let (assignment, warnings) =
        modify_tx(tx, cfg, current.assignment_id, &change, record.valid_from)?;
      Ok((ImportOutcome::Versioned(assignment), warnings))
    }
  }
}

fn purge_slot_tx(
  tx: &rusqlite::Transaction<'_>,
  slot: &Slot,
) -> TxResult<usize> {
  let history = load_slot_history(tx, slot)?;
  if history.iter().any(|a| a.is_current) {
    return Err(CoreError::SlotStillActive(*slot).into());
  }

  let removed = tx.execute(
    "DELETE FROM assignments
     WHERE person_id = ?1 AND unit_id = ?2 AND job_title_id = ?3",
    rusqlite::params![
      encode_uuid(slot.person_id),
      encode_uuid(slot.unit_id),
      encode_uuid(slot.job_title_id),
    ],
  )?;
  Ok(removed)
}

fn remove_entity_tx(
  tx: &rusqlite::Transaction<'_>,
  kind: EntityKind,
  id: Uuid,
) -> TxResult<()> {
  let (exists_sql, referenced_sql, delete_sql, missing): (
    &str,
    &str,
    &str,
    fn(Uuid) -> CoreError,
  ) = match kind {
    EntityKind::Person => (
      "SELECT 1 FROM people WHERE person_id = ?1",
      "SELECT 1 FROM assignments WHERE person_id = ?1 LIMIT 1",
      "DELETE FROM people WHERE person_id = ?1",
      CoreError::UnknownPerson,
    ),
    EntityKind::Unit => (
      "SELECT 1 FROM units WHERE unit_id = ?1",
      "SELECT 1 FROM assignments WHERE unit_id = ?1 LIMIT 1",
      "DELETE FROM units WHERE unit_id = ?1",
      CoreError::UnknownUnit,
    ),
    EntityKind::JobTitle => (
      "SELECT 1 FROM job_titles WHERE job_title_id = ?1",
      "SELECT 1 FROM assignments WHERE job_title_id = ?1 LIMIT 1",
      "DELETE FROM job_titles WHERE job_title_id = ?1",
      CoreError::UnknownJobTitle,
    ),
  };

  if !exists(tx, exists_sql, id)? {
    return Err(missing(id).into());
  }
  if exists(tx, referenced_sql, id)? {
    return Err(CoreError::EntityInUse { kind, id }.into());
  }
  // A unit serving as another unit's parent is also still referenced.
  if kind == EntityKind::Unit
    && exists(tx, "SELECT 1 FROM units WHERE parent_unit_id = ?1 LIMIT 1", id)?
  {
    return Err(CoreError::EntityInUse { kind, id }.into());
  }

  tx.execute(delete_sql, rusqlite::params![encode_uuid(id)])?;
  Ok(())
}

// ─── OrgStore impl ───────────────────────────────────────────────────────────

impl OrgStore for SqliteStore {
  // ── Directory ─────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> CoreResult<Person> {
    let person = Person {
      person_id:    Uuid::new_v4(),
      display_name: input.display_name,
      created_at:   Utc::now(),
    };

    let id_str = encode_uuid(person.person_id);
    let name = person.display_name.clone();
    let at_str = encode_dt(person.created_at);

    self
      .with_conn(move |conn| {
        conn.execute(
          "INSERT INTO people (person_id, display_name, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> CoreResult<Option<Person>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPerson> = self
      .with_conn(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT person_id, display_name, created_at FROM people
               WHERE person_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPerson {
                  person_id:    row.get(0)?,
                  display_name: row.get(1)?,
                  created_at:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawPerson::into_person)
      .transpose()
      .map_err(CoreError::from)
  }

  async fn list_people(&self) -> CoreResult<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .with_conn(|conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, display_name, created_at FROM people
           ORDER BY display_name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPerson {
              person_id:    row.get(0)?,
              display_name: row.get(1)?,
              created_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| r.into_person().map_err(CoreError::from))
      .collect()
  }

  async fn remove_person(&self, id: Uuid) -> CoreResult<()> {
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| remove_entity_tx(tx, EntityKind::Person, id))
      })
      .await?
  }

  async fn add_unit(&self, input: NewOrgUnit) -> CoreResult<OrgUnit> {
    let unit = OrgUnit {
      unit_id:        Uuid::new_v4(),
      name:           input.name,
      parent_unit_id: input.parent_unit_id,
      created_at:     Utc::now(),
    };

    let insert = unit.clone();
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| {
          if let Some(parent) = insert.parent_unit_id {
            if !exists(tx, "SELECT 1 FROM units WHERE unit_id = ?1", parent)? {
              return Err(CoreError::UnknownUnit(parent).into());
            }
          }
          tx.execute(
            "INSERT INTO units (unit_id, name, parent_unit_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
              encode_uuid(insert.unit_id),
              insert.name,
              insert.parent_unit_id.map(encode_uuid),
              encode_dt(insert.created_at),
            ],
          )?;
          Ok(())
        })
      })
      .await??;

    Ok(unit)
  }

  async fn get_unit(&self, id: Uuid) -> CoreResult<Option<OrgUnit>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawUnit> = self
      .with_conn(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT unit_id, name, parent_unit_id, created_at FROM units
               WHERE unit_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUnit {
                  unit_id:        row.get(0)?,
                  name:           row.get(1)?,
                  parent_unit_id: row.get(2)?,
                  created_at:     row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUnit::into_unit).transpose().map_err(CoreError::from)
  }

  async fn list_units(&self) -> CoreResult<Vec<OrgUnit>> {
    let raws: Vec<RawUnit> = self
      .with_conn(|conn| {
        let mut stmt = conn.prepare(
          "SELECT unit_id, name, parent_unit_id, created_at FROM units
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUnit {
              unit_id:        row.get(0)?,
              name:           row.get(1)?,
              parent_unit_id: row.get(2)?,
              created_at:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| r.into_unit().map_err(CoreError::from))
      .collect()
  }

  async fn remove_unit(&self, id: Uuid) -> CoreResult<()> {
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| remove_entity_tx(tx, EntityKind::Unit, id))
      })
      .await?
  }

  async fn add_job_title(&self, input: NewJobTitle) -> CoreResult<JobTitle> {
    let title = JobTitle {
      job_title_id: Uuid::new_v4(),
      name:         input.name,
      created_at:   Utc::now(),
    };

    let id_str = encode_uuid(title.job_title_id);
    let name = title.name.clone();
    let at_str = encode_dt(title.created_at);

    self
      .with_conn(move |conn| {
        conn.execute(
          "INSERT INTO job_titles (job_title_id, name, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(title)
  }

  async fn get_job_title(&self, id: Uuid) -> CoreResult<Option<JobTitle>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawJobTitle> = self
      .with_conn(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT job_title_id, name, created_at FROM job_titles
               WHERE job_title_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawJobTitle {
                  job_title_id: row.get(0)?,
                  name:         row.get(1)?,
                  created_at:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawJobTitle::into_job_title)
      .transpose()
      .map_err(CoreError::from)
  }

  async fn list_job_titles(&self) -> CoreResult<Vec<JobTitle>> {
    let raws: Vec<RawJobTitle> = self
      .with_conn(|conn| {
        let mut stmt = conn.prepare(
          "SELECT job_title_id, name, created_at FROM job_titles
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawJobTitle {
              job_title_id: row.get(0)?,
              name:         row.get(1)?,
              created_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| r.into_job_title().map_err(CoreError::from))
      .collect()
  }

  async fn remove_job_title(&self, id: Uuid) -> CoreResult<()> {
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| remove_entity_tx(tx, EntityKind::JobTitle, id))
      })
      .await?
  }

  // ── Versioning engine — writes ────────────────────────────────────────

  async fn create_assignment(
    &self,
    input: NewAssignment,
  ) -> CoreResult<(Assignment, Vec<Warning>)> {
    let cfg = self.cfg.clone();
    self
      .with_conn(move |conn| run_tx(conn, |tx| create_tx(tx, &cfg, &input)))
      .await?
  }

  async fn modify_assignment(
    &self,
    assignment_id: Uuid,
    change: AssignmentChange,
    effective_date: NaiveDate,
  ) -> CoreResult<(Assignment, Vec<Warning>)> {
    let cfg = self.cfg.clone();
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| {
          modify_tx(tx, &cfg, assignment_id, &change, effective_date)
        })
      })
      .await?
  }

  async fn terminate_assignment(
    &self,
    assignment_id: Uuid,
    effective_date: NaiveDate,
  ) -> CoreResult<Assignment> {
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| terminate_tx(tx, assignment_id, effective_date))
      })
      .await?
  }

  async fn apply_imported(
    &self,
    record: AssignmentRecord,
    policy: ConflictPolicy,
  ) -> CoreResult<(ImportOutcome, Vec<Warning>)> {
    let cfg = self.cfg.clone();
    self
      .with_conn(move |conn| {
        run_tx(conn, |tx| apply_imported_tx(tx, &cfg, &record, policy))
      })
      .await?
  }

  async fn purge_slot(&self, slot: Slot) -> CoreResult<usize> {
    self
      .with_conn(move |conn| run_tx(conn, |tx| purge_slot_tx(tx, &slot)))
      .await?
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  async fn get_assignment(&self, id: Uuid) -> CoreResult<Option<Assignment>> {
    let raw = self
      .with_conn(move |conn| Ok(query_assignment(conn, id)?))
      .await?;
    raw
      .map(|r| r.into_assignment().map_err(CoreError::from))
      .transpose()
  }

  async fn current_for_slot(
    &self,
    slot: Slot,
  ) -> CoreResult<Option<Assignment>> {
    let raws = self
      .with_conn(move |conn| Ok(query_slot_history(conn, &slot)?))
      .await?;
    for raw in raws {
      if raw.is_current {
        return Ok(Some(raw.into_assignment().map_err(CoreError::from)?));
      }
    }
    Ok(None)
  }

  async fn history_for_slot(&self, slot: Slot) -> CoreResult<Vec<Assignment>> {
    let raws = self
      .with_conn(move |conn| Ok(query_slot_history(conn, &slot)?))
      .await?;
    raws
      .into_iter()
      .map(|r| r.into_assignment().map_err(CoreError::from))
      .collect()
  }

  async fn current_for_person(
    &self,
    person_id: Uuid,
  ) -> CoreResult<Vec<Assignment>> {
    let raws = self
      .with_conn(move |conn| Ok(query_current_for_person(conn, person_id)?))
      .await?;
    raws
      .into_iter()
      .map(|r| r.into_assignment().map_err(CoreError::from))
      .collect()
  }

  async fn export_document(&self) -> CoreResult<OrgDocument> {
    // One closure, one connection: the snapshot observes each slot either
    // fully-old or fully-new, never mid-transition.
    let (people_raw, units_raw, titles_raw, assignments_raw) = self
      .with_conn(|conn| {
        let people = {
          let mut stmt = conn.prepare(
            "SELECT person_id, display_name, created_at FROM people
             ORDER BY display_name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(RawPerson {
                person_id:    row.get(0)?,
                display_name: row.get(1)?,
                created_at:   row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };
        let units = {
          let mut stmt = conn.prepare(
            "SELECT unit_id, name, parent_unit_id, created_at FROM units
             ORDER BY name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(RawUnit {
                unit_id:        row.get(0)?,
                name:           row.get(1)?,
                parent_unit_id: row.get(2)?,
                created_at:     row.get(3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };
        let titles = {
          let mut stmt = conn.prepare(
            "SELECT job_title_id, name, created_at FROM job_titles
             ORDER BY name",
          )?;
          let rows = stmt
            .query_map([], |row| {
              Ok(RawJobTitle {
                job_title_id: row.get(0)?,
                name:         row.get(1)?,
                created_at:   row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };
        let assignments = {
          let mut stmt = conn.prepare(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
             ORDER BY person_id, unit_id, job_title_id, version"
          ))?;
          let rows = stmt
            .query_map([], raw_assignment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };
        Ok((people, units, titles, assignments))
      })
      .await?;

    let people = people_raw
      .into_iter()
      .map(|r| r.into_person().map_err(CoreError::from))
      .collect::<CoreResult<Vec<_>>>()?;
    let units = units_raw
      .into_iter()
      .map(|r| r.into_unit().map_err(CoreError::from))
      .collect::<CoreResult<Vec<_>>>()?;
    let job_titles = titles_raw
      .into_iter()
      .map(|r| r.into_job_title().map_err(CoreError::from))
      .collect::<CoreResult<Vec<_>>>()?;
    let assignments = assignments_raw
      .into_iter()
      .map(|r| {
        r.into_assignment()
          .map(|a| AssignmentRecord::from(&a))
          .map_err(CoreError::from)
      })
      .collect::<CoreResult<Vec<_>>>()?;

    Ok(OrgDocument::new(people, units, job_titles, assignments))
  }
}
