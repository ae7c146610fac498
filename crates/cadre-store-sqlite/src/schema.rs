//! SQL schema for the Cadre SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The partial unique index on current rows is the storage-level backstop for
/// the one-current-row-per-slot invariant; the engine's transactions enforce
/// it first, the index makes a bypass impossible.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id    TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS units (
    unit_id        TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    parent_unit_id TEXT REFERENCES units(unit_id),
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS job_titles (
    job_title_id TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

-- One row per assignment version. Rows are immutable once closed; the only
-- writes ever issued are the engine's close (valid_to + is_current) and the
-- maintenance-only import overwrite of the current row.
CREATE TABLE IF NOT EXISTS assignments (
    assignment_id TEXT PRIMARY KEY,
    person_id     TEXT NOT NULL REFERENCES people(person_id),
    unit_id       TEXT NOT NULL REFERENCES units(unit_id),
    job_title_id  TEXT NOT NULL REFERENCES job_titles(job_title_id),
    version       INTEGER NOT NULL CHECK (version >= 1),
    percentage    REAL NOT NULL CHECK (percentage > 0),
    is_ad_interim INTEGER NOT NULL DEFAULT 0,
    is_unit_boss  INTEGER NOT NULL DEFAULT 0,
    notes         TEXT,
    valid_from    TEXT NOT NULL,   -- ISO 8601 date
    valid_to      TEXT,            -- inclusive last effective day; NULL while current
    is_current    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (person_id, unit_id, job_title_id, version)
);

CREATE UNIQUE INDEX IF NOT EXISTS assignments_current_slot_idx
    ON assignments(person_id, unit_id, job_title_id) WHERE is_current = 1;

CREATE INDEX IF NOT EXISTS assignments_person_current_idx
    ON assignments(person_id) WHERE is_current = 1;

CREATE INDEX IF NOT EXISTS assignments_slot_idx
    ON assignments(person_id, unit_id, job_title_id);

PRAGMA user_version = 1;
";
