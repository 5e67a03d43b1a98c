//! Position units and assignments.

use chrono::{DateTime, Utc};
use roster_core::{
  Error as CoreError,
  position::{
    AssignPosition, AssignmentOutcome, AssignmentPolicy, NewPositionUnit,
    PositionAssignment, PositionPatch, PositionUnit,
  },
  store::PositionQuery,
  validation::{normalize, validate_new_position, validate_position_patch},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    ASSIGNMENT_COLUMNS, POSITION_COLUMNS, RawAssignment, RawPosition, encode_dt,
    encode_uuid, stored_precision,
  },
  persons,
};

// ─── Position units ──────────────────────────────────────────────────────────

pub fn fetch(conn: &Connection, id: Uuid) -> Result<Option<PositionUnit>> {
  let raw = conn
    .query_row(
      &format!("SELECT {POSITION_COLUMNS} FROM position_units WHERE position_id = ?1"),
      params![encode_uuid(id)],
      RawPosition::from_row,
    )
    .optional()?;
  raw.map(RawPosition::into_position).transpose()
}

pub fn require(conn: &Connection, id: Uuid) -> Result<PositionUnit> {
  fetch(conn, id)?.ok_or_else(|| Error::not_found("position", id))
}

/// Trim each segment of an org path and drop empty ones.
fn normalize_org_path(path: &str) -> String {
  path
    .split('/')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

pub fn insert(conn: &Connection, input: NewPositionUnit, now: DateTime<Utc>) -> Result<PositionUnit> {
  validate_new_position(&input)?;
  let code = input.code.trim().to_owned();
  let taken: Option<String> = conn
    .query_row(
      "SELECT position_id FROM position_units WHERE code = ?1",
      params![code],
      |r| r.get(0),
    )
    .optional()?;
  if taken.is_some() {
    return Err(Error::conflict(format!("position code {code:?} already exists")));
  }

  let position = PositionUnit {
    position_id:    Uuid::new_v4(),
    code,
    short_name:     input.short_name.trim().to_owned(),
    special_number: normalize(input.special_number),
    org_path:       normalize_org_path(&input.org_path),
    is_active:      true,
    occupant_id:    None,
    created_at:     now,
    modified_at:    now,
  };

  conn.execute(
    "INSERT INTO position_units (
       position_id, code, short_name, special_number, org_path,
       is_active, created_at, modified_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    params![
      encode_uuid(position.position_id),
      position.code,
      position.short_name,
      position.special_number,
      position.org_path,
      encode_dt(now),
    ],
  )?;
  Ok(position)
}

pub fn update(
  conn: &Connection,
  id: Uuid,
  patch: PositionPatch,
  now: DateTime<Utc>,
) -> Result<PositionUnit> {
  validate_position_patch(&patch)?;
  require(conn, id)?;
  conn.execute(
    "UPDATE position_units
     SET short_name = ?2, special_number = ?3, org_path = ?4, modified_at = ?5
     WHERE position_id = ?1",
    params![
      encode_uuid(id),
      patch.short_name.trim(),
      normalize(patch.special_number),
      normalize_org_path(&patch.org_path),
      encode_dt(now),
    ],
  )?;
  require(conn, id)
}

pub fn set_active(conn: &Connection, id: Uuid, active: bool, now: DateTime<Utc>) -> Result<PositionUnit> {
  let position = require(conn, id)?;
  if !active && let Some(occupant) = position.occupant_id {
    return Err(Error::conflict(format!(
      "position {:?} is occupied by person {occupant}",
      position.code
    )));
  }
  conn.execute(
    "UPDATE position_units SET is_active = ?2, modified_at = ?3 WHERE position_id = ?1",
    params![encode_uuid(id), active, encode_dt(now)],
  )?;
  require(conn, id)
}

fn set_occupant(conn: &Connection, id: Uuid, occupant: Option<Uuid>, now: DateTime<Utc>) -> Result<()> {
  conn.execute(
    "UPDATE position_units SET occupant_id = ?2, modified_at = ?3 WHERE position_id = ?1",
    params![encode_uuid(id), occupant.map(encode_uuid), encode_dt(now)],
  )?;
  Ok(())
}

pub fn list(conn: &Connection, query: &PositionQuery) -> Result<Vec<PositionUnit>> {
  let prefix = query
    .org_path
    .as_deref()
    .map(normalize_org_path)
    .filter(|p| !p.is_empty());

  let mut stmt = conn.prepare(&format!(
    "SELECT {POSITION_COLUMNS} FROM position_units
     WHERE (is_active = 1 OR ?1)
       AND (NOT ?2 OR occupant_id IS NULL)
       AND (?3 IS NULL OR org_path = ?3 OR substr(org_path, 1, length(?3) + 1) = ?3 || '/')
     ORDER BY org_path, code"
  ))?;
  stmt
    .query_map(
      params![query.include_inactive, query.vacant_only, prefix],
      RawPosition::from_row,
    )?
    .map(|raw| raw?.into_position())
    .collect()
}

// ─── Assignments ─────────────────────────────────────────────────────────────

pub fn open_assignment(conn: &Connection, person_id: Uuid) -> Result<Option<PositionAssignment>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM position_assignments
         WHERE person_id = ?1 AND closed_at IS NULL"
      ),
      params![encode_uuid(person_id)],
      RawAssignment::from_row,
    )
    .optional()?;
  raw.map(RawAssignment::into_assignment).transpose()
}

pub fn assignments(conn: &Connection, person_id: Uuid) -> Result<Vec<PositionAssignment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ASSIGNMENT_COLUMNS} FROM position_assignments
     WHERE person_id = ?1
     ORDER BY opened_at DESC, created_at DESC"
  ))?;
  stmt
    .query_map(params![encode_uuid(person_id)], RawAssignment::from_row)?
    .map(|raw| raw?.into_assignment())
    .collect()
}

fn close(
  conn: &Connection,
  mut assignment: PositionAssignment,
  closed_at: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<PositionAssignment> {
  if closed_at < assignment.opened_at {
    return Err(Error::Core(CoreError::invalid(
      "closed_at",
      format!(
        "{closed_at} precedes the assignment's start {}",
        assignment.opened_at
      ),
    )));
  }
  conn.execute(
    "UPDATE position_assignments SET closed_at = ?2, modified_at = ?3 WHERE assignment_id = ?1",
    params![
      encode_uuid(assignment.assignment_id),
      encode_dt(closed_at),
      encode_dt(now),
    ],
  )?;
  set_occupant(conn, assignment.position_id, None, now)?;
  assignment.closed_at = Some(closed_at);
  assignment.modified_at = now;
  Ok(assignment)
}

/// Whether a closed assignment with `column = id` ends after `at`, in which
/// case an assignment opened at `at` would overlap it.
fn ends_after(conn: &Connection, column: &'static str, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
  let overlaps = conn.query_row(
    &format!(
      "SELECT EXISTS(
         SELECT 1 FROM position_assignments
         WHERE {column} = ?1 AND closed_at IS NOT NULL AND closed_at > ?2
       )"
    ),
    params![encode_uuid(id), encode_dt(at)],
    |r| r.get(0),
  )?;
  Ok(overlaps)
}

pub fn assign(
  conn: &Connection,
  input: AssignPosition,
  policy: AssignmentPolicy,
  now: DateTime<Utc>,
) -> Result<AssignmentOutcome> {
  let person = persons::require(conn, input.person_id)?;
  let position = require(conn, input.position_id)?;
  let opened_at = stored_precision(input.opened_at);

  if !position.is_active {
    return Err(Error::conflict(format!("position {:?} is inactive", position.code)));
  }
  match position.occupant_id {
    Some(occupant) if occupant == person.person_id => {
      return Err(Error::conflict(format!(
        "person {} already holds position {:?}",
        person.person_id, position.code
      )));
    }
    Some(occupant) => {
      return Err(Error::conflict(format!(
        "position {:?} is occupied by person {occupant}",
        position.code
      )));
    }
    None => {}
  }

  if ends_after(conn, "person_id", person.person_id, opened_at)? {
    return Err(Error::conflict(format!(
      "person {} held a position after {opened_at}",
      person.person_id
    )));
  }
  if ends_after(conn, "position_id", position.position_id, opened_at)? {
    return Err(Error::conflict(format!(
      "position {:?} was held by someone after {opened_at}",
      position.code
    )));
  }

  let closed = match (open_assignment(conn, person.person_id)?, policy) {
    (None, _) => None,
    (Some(prev), AssignmentPolicy::Reject) => {
      return Err(Error::conflict(format!(
        "person {} already has open assignment {}",
        person.person_id, prev.assignment_id
      )));
    }
    (Some(prev), AssignmentPolicy::ClosePrevious) => {
      if opened_at < prev.opened_at {
        return Err(Error::Core(CoreError::invalid(
          "opened_at",
          format!("{opened_at} precedes the open assignment's start {}", prev.opened_at),
        )));
      }
      Some(close(conn, prev, opened_at, now)?)
    }
  };

  let opened = PositionAssignment {
    assignment_id: Uuid::new_v4(),
    person_id:     person.person_id,
    position_id:   position.position_id,
    opened_at,
    closed_at:     None,
    note:          normalize(input.note),
    created_at:    now,
    modified_at:   now,
  };
  conn.execute(
    "INSERT INTO position_assignments (
       assignment_id, person_id, position_id, opened_at, note, created_at, modified_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    params![
      encode_uuid(opened.assignment_id),
      encode_uuid(opened.person_id),
      encode_uuid(opened.position_id),
      encode_dt(opened.opened_at),
      opened.note,
      encode_dt(now),
    ],
  )?;
  set_occupant(conn, position.position_id, Some(person.person_id), now)?;
  persons::set_current_position(conn, person.person_id, Some(position.position_id), now)?;

  tracing::debug!(
    person_id = %person.person_id,
    position = %position.code,
    closed_previous = closed.is_some(),
    "position assigned"
  );

  Ok(AssignmentOutcome { opened, closed })
}

pub fn unassign(
  conn: &Connection,
  person_id: Uuid,
  closed_at: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<PositionAssignment> {
  persons::require(conn, person_id)?;
  let open = open_assignment(conn, person_id)?.ok_or_else(|| {
    Error::conflict(format!("person {person_id} has no open assignment"))
  })?;
  let closed = close(conn, open, stored_precision(closed_at), now)?;
  persons::set_current_position(conn, person_id, None, now)?;
  Ok(closed)
}
