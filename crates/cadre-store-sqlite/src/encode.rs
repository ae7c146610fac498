//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! (`YYYY-MM-DD`). UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use cadre_core::{
  assignment::{Assignment, Slot},
  directory::{JobTitle, OrgUnit, Person},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse::<NaiveDate>()
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `assignments` row.
pub struct RawAssignment {
  pub assignment_id: String,
  pub person_id:     String,
  pub unit_id:       String,
  pub job_title_id:  String,
  pub version:       i64,
  pub percentage:    f64,
  pub is_ad_interim: bool,
  pub is_unit_boss:  bool,
  pub notes:         Option<String>,
  pub valid_from:    String,
  pub valid_to:      Option<String>,
  pub is_current:    bool,
}

impl RawAssignment {
  pub fn into_assignment(self) -> Result<Assignment> {
    let slot = Slot::new(
      decode_uuid(&self.person_id)?,
      decode_uuid(&self.unit_id)?,
      decode_uuid(&self.job_title_id)?,
    );

    let version = u32::try_from(self.version).map_err(|_| {
      Error::Decode(format!("version {} out of range", self.version))
    })?;

    Ok(Assignment {
      assignment_id: decode_uuid(&self.assignment_id)?,
      slot,
      version,
      percentage: self.percentage,
      is_ad_interim: self.is_ad_interim,
      is_unit_boss: self.is_unit_boss,
      notes: self.notes,
      valid_from: decode_date(&self.valid_from)?,
      valid_to: self.valid_to.as_deref().map(decode_date).transpose()?,
      is_current: self.is_current,
    })
  }
}

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub person_id:    String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:    decode_uuid(&self.person_id)?,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `units` row.
pub struct RawUnit {
  pub unit_id:        String,
  pub name:           String,
  pub parent_unit_id: Option<String>,
  pub created_at:     String,
}

impl RawUnit {
  pub fn into_unit(self) -> Result<OrgUnit> {
    Ok(OrgUnit {
      unit_id:        decode_uuid(&self.unit_id)?,
      name:           self.name,
      parent_unit_id: self
        .parent_unit_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `job_titles` row.
pub struct RawJobTitle {
  pub job_title_id: String,
  pub name:         String,
  pub created_at:   String,
}

impl RawJobTitle {
  pub fn into_job_title(self) -> Result<JobTitle> {
    Ok(JobTitle {
      job_title_id: decode_uuid(&self.job_title_id)?,
      name:         self.name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
