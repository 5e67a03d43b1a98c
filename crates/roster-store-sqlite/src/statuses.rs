//! Status kinds, their ordering, and the status history.

use chrono::{DateTime, Utc};
use roster_core::{
  ordering::{self, Renumber},
  status::{
    NewStatusKind, StatusChange, StatusChangeInput, StatusChangeView, StatusKind,
    StatusKindPatch,
  },
  validation::{normalize, validate_new_status_kind, validate_status_kind_patch},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawStatusChangeView, RawStatusKind, STATUS_CHANGE_VIEW_COLUMNS,
    STATUS_KIND_COLUMNS, decode_uuid, encode_dt, encode_uuid,
  },
  persons,
};

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub fn fetch_kind(conn: &Connection, id: Uuid) -> Result<Option<StatusKind>> {
  let raw = conn
    .query_row(
      &format!("SELECT {STATUS_KIND_COLUMNS} FROM status_kinds WHERE status_kind_id = ?1"),
      params![encode_uuid(id)],
      RawStatusKind::from_row,
    )
    .optional()?;
  raw.map(RawStatusKind::into_status_kind).transpose()
}

pub fn require_kind(conn: &Connection, id: Uuid) -> Result<StatusKind> {
  fetch_kind(conn, id)?.ok_or_else(|| Error::not_found("status kind", id))
}

pub fn list_kinds(conn: &Connection, include_inactive: bool) -> Result<Vec<StatusKind>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {STATUS_KIND_COLUMNS} FROM status_kinds
     WHERE is_active = 1 OR ?1
     ORDER BY is_active DESC, sort_order, name"
  ))?;
  stmt
    .query_map(params![include_inactive], RawStatusKind::from_row)?
    .map(|raw| raw?.into_status_kind())
    .collect()
}

fn active_ids(conn: &Connection) -> Result<Vec<Uuid>> {
  let mut stmt = conn
    .prepare("SELECT status_kind_id FROM status_kinds WHERE is_active = 1 ORDER BY sort_order")?;
  let ids = stmt
    .query_map([], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  ids.iter().map(|s| decode_uuid(s)).collect()
}

/// Write a full renumbering of the active set.
///
/// Active orders are first moved to negative values so the partial unique
/// index never sees two rows with the same positive order mid-update.
fn apply_renumbering(conn: &Connection, renumbering: &[Renumber], now: DateTime<Utc>) -> Result<()> {
  conn.execute(
    "UPDATE status_kinds SET sort_order = -sort_order WHERE is_active = 1",
    [],
  )?;
  let mut stmt = conn.prepare(
    "UPDATE status_kinds
     SET sort_order = ?2, is_active = 1,
         modified_at = CASE WHEN sort_order = -?2 THEN modified_at ELSE ?3 END
     WHERE status_kind_id = ?1",
  )?;
  for r in renumbering {
    stmt.execute(params![encode_uuid(r.id), r.order, encode_dt(now)])?;
  }
  tracing::debug!(active = renumbering.len(), "renumbered status kinds");
  Ok(())
}

fn ensure_code_free(conn: &Connection, code: &str, owner: Uuid) -> Result<()> {
  let taken: Option<String> = conn
    .query_row(
      "SELECT status_kind_id FROM status_kinds WHERE code = ?1 AND status_kind_id != ?2",
      params![code, encode_uuid(owner)],
      |r| r.get(0),
    )
    .optional()?;
  match taken {
    Some(_) => Err(Error::conflict(format!("status code {code:?} already exists"))),
    None => Ok(()),
  }
}

pub fn insert_kind(conn: &Connection, input: NewStatusKind, now: DateTime<Utc>) -> Result<StatusKind> {
  validate_new_status_kind(&input)?;
  let id = Uuid::new_v4();
  let code = input.code.trim().to_owned();
  ensure_code_free(conn, &code, id)?;

  // Inserted inactive so it does not collide with the current order values;
  // the renumbering activates it.
  conn.execute(
    "INSERT INTO status_kinds (status_kind_id, code, name, sort_order, is_active, created_at, modified_at)
     VALUES (?1, ?2, ?3, 0, 0, ?4, ?4)",
    params![encode_uuid(id), code, input.name.trim(), encode_dt(now)],
  )?;

  let renumbering = ordering::place(&active_ids(conn)?, id, input.position);
  apply_renumbering(conn, &renumbering, now)?;
  require_kind(conn, id)
}

pub fn update_kind(
  conn: &Connection,
  id: Uuid,
  patch: StatusKindPatch,
  now: DateTime<Utc>,
) -> Result<StatusKind> {
  validate_status_kind_patch(&patch)?;
  require_kind(conn, id)?;
  let code = patch.code.trim().to_owned();
  ensure_code_free(conn, &code, id)?;
  conn.execute(
    "UPDATE status_kinds SET code = ?2, name = ?3, modified_at = ?4 WHERE status_kind_id = ?1",
    params![encode_uuid(id), code, patch.name.trim(), encode_dt(now)],
  )?;
  require_kind(conn, id)
}

pub fn reorder_kind(
  conn: &Connection,
  id: Uuid,
  position: u32,
  now: DateTime<Utc>,
) -> Result<Vec<StatusKind>> {
  let kind = require_kind(conn, id)?;
  if !kind.is_active {
    return Err(Error::conflict(format!(
      "status kind {:?} is inactive and has no order",
      kind.code
    )));
  }
  let renumbering = ordering::place(&active_ids(conn)?, id, Some(position));
  apply_renumbering(conn, &renumbering, now)?;
  list_kinds(conn, false)
}

pub fn set_kind_active(
  conn: &Connection,
  id: Uuid,
  active: bool,
  now: DateTime<Utc>,
) -> Result<StatusKind> {
  let kind = require_kind(conn, id)?;
  if kind.is_active == active {
    return Ok(kind);
  }

  let current = active_ids(conn)?;
  if active {
    apply_renumbering(conn, &ordering::place(&current, id, None), now)?;
  } else {
    conn.execute(
      "UPDATE status_kinds SET is_active = 0, sort_order = 0, modified_at = ?2
       WHERE status_kind_id = ?1",
      params![encode_uuid(id), encode_dt(now)],
    )?;
    apply_renumbering(conn, &ordering::remove(&current, id), now)?;
  }
  require_kind(conn, id)
}

// ─── History ─────────────────────────────────────────────────────────────────

pub fn history(conn: &Connection, person_id: Uuid) -> Result<Vec<StatusChangeView>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {STATUS_CHANGE_VIEW_COLUMNS}
     FROM status_changes c
     JOIN status_kinds k ON k.status_kind_id = c.status_kind_id
     WHERE c.person_id = ?1
     ORDER BY c.effective_at, c.sequence"
  ))?;
  stmt
    .query_map(params![encode_uuid(person_id)], RawStatusChangeView::from_row)?
    .map(|raw| raw?.into_view())
    .collect()
}

/// Every history record with `effective_at <= at`, across all persons.
pub fn history_until(conn: &Connection, at: DateTime<Utc>) -> Result<Vec<StatusChangeView>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {STATUS_CHANGE_VIEW_COLUMNS}
     FROM status_changes c
     JOIN status_kinds k ON k.status_kind_id = c.status_kind_id
     WHERE c.effective_at <= ?1"
  ))?;
  stmt
    .query_map(params![encode_dt(at)], RawStatusChangeView::from_row)?
    .map(|raw| raw?.into_view())
    .collect()
}

pub fn append_change(
  conn: &Connection,
  input: StatusChangeInput,
  now: DateTime<Utc>,
) -> Result<StatusChange> {
  persons::require(conn, input.person_id)?;
  let kind = require_kind(conn, input.status_kind_id)?;
  if !kind.is_active {
    return Err(Error::conflict(format!(
      "status kind {:?} is inactive",
      kind.code
    )));
  }

  let change_id = Uuid::new_v4();
  let effective_at = crate::encode::stored_precision(input.effective_at);
  let note = normalize(input.note);
  conn.execute(
    "INSERT INTO status_changes (change_id, person_id, status_kind_id, effective_at, note, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(change_id),
      encode_uuid(input.person_id),
      encode_uuid(input.status_kind_id),
      encode_dt(effective_at),
      note,
      encode_dt(now),
    ],
  )?;
  let sequence = conn.last_insert_rowid();

  tracing::debug!(
    person_id = %input.person_id,
    code = %kind.code,
    sequence,
    "status change recorded"
  );

  Ok(StatusChange {
    change_id,
    person_id: input.person_id,
    status_kind_id: input.status_kind_id,
    effective_at,
    sequence,
    note,
    created_at: now,
  })
}
