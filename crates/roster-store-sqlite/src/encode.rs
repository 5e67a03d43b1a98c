//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed six-digit fraction
//! and a `Z` suffix, so SQL string comparison orders them chronologically.
//! UUIDs are stored as hyphenated lowercase strings; booleans as `0`/`1`.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use roster_core::{
  person::Person,
  plan::{PlanAction, PlanActionKind, PlanActionState},
  position::{PositionAssignment, PositionUnit},
  status::{StatusChange, StatusChangeView, StatusKind},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Truncate to the precision the store keeps, so values read back compare
/// equal to the values written.
pub fn stored_precision(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn now() -> DateTime<Utc> { stored_precision(Utc::now()) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── PlanActionKind ──────────────────────────────────────────────────────────

pub fn decode_plan_kind(s: &str) -> Result<PlanActionKind> {
  match s {
    "dispatch" => Ok(PlanActionKind::Dispatch),
    "return" => Ok(PlanActionKind::Return),
    other => Err(unknown("plan action kind", other)),
  }
}

fn unknown(kind: &'static str, value: &str) -> Error {
  Error::Core(roster_core::Error::UnknownDiscriminant {
    kind,
    value: value.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str = "person_id, national_id, last_name, first_name, \
  middle_name, rank, callsign, weapon, current_position_id, \
  created_at, modified_at";

/// Raw strings read directly from a `persons` row. The current status is not
/// stored; [`crate::persons`] derives it from the history on read.
pub struct RawPerson {
  pub person_id:           String,
  pub national_id:         String,
  pub last_name:           String,
  pub first_name:          String,
  pub middle_name:         Option<String>,
  pub rank:                Option<String>,
  pub callsign:            Option<String>,
  pub weapon:              Option<String>,
  pub current_position_id: Option<String>,
  pub created_at:          String,
  pub modified_at:         String,
}

impl RawPerson {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:           row.get(0)?,
      national_id:         row.get(1)?,
      last_name:           row.get(2)?,
      first_name:          row.get(3)?,
      middle_name:         row.get(4)?,
      rank:                row.get(5)?,
      callsign:            row.get(6)?,
      weapon:              row.get(7)?,
      current_position_id: row.get(8)?,
      created_at:          row.get(9)?,
      modified_at:         row.get(10)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:           decode_uuid(&self.person_id)?,
      national_id:         self.national_id,
      last_name:           self.last_name,
      first_name:          self.first_name,
      middle_name:         self.middle_name,
      rank:                self.rank,
      callsign:            self.callsign,
      weapon:              self.weapon,
      current_status_id:   None,
      current_position_id: decode_opt_uuid(self.current_position_id)?,
      created_at:          decode_dt(&self.created_at)?,
      modified_at:         decode_dt(&self.modified_at)?,
    })
  }
}

pub const STATUS_KIND_COLUMNS: &str =
  "status_kind_id, code, name, sort_order, is_active, created_at, modified_at";

/// Raw values read directly from a `status_kinds` row.
pub struct RawStatusKind {
  pub status_kind_id: String,
  pub code:           String,
  pub name:           String,
  pub sort_order:     u32,
  pub is_active:      bool,
  pub created_at:     String,
  pub modified_at:    String,
}

impl RawStatusKind {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      status_kind_id: row.get(0)?,
      code:           row.get(1)?,
      name:           row.get(2)?,
      sort_order:     row.get(3)?,
      is_active:      row.get(4)?,
      created_at:     row.get(5)?,
      modified_at:    row.get(6)?,
    })
  }

  pub fn into_status_kind(self) -> Result<StatusKind> {
    Ok(StatusKind {
      status_kind_id: decode_uuid(&self.status_kind_id)?,
      code:           self.code,
      name:           self.name,
      order:          self.sort_order,
      is_active:      self.is_active,
      created_at:     decode_dt(&self.created_at)?,
      modified_at:    decode_dt(&self.modified_at)?,
    })
  }
}

/// Columns of `status_changes c` joined with `status_kinds k`.
pub const STATUS_CHANGE_VIEW_COLUMNS: &str = "c.change_id, c.person_id, \
  c.status_kind_id, c.effective_at, c.sequence, c.note, c.created_at, k.code, k.name";

/// Raw values read from a `status_changes` row joined with its kind.
pub struct RawStatusChangeView {
  pub change_id:      String,
  pub person_id:      String,
  pub status_kind_id: String,
  pub effective_at:   String,
  pub sequence:       i64,
  pub note:           Option<String>,
  pub created_at:     String,
  pub code:           String,
  pub name:           String,
}

impl RawStatusChangeView {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      change_id:      row.get(0)?,
      person_id:      row.get(1)?,
      status_kind_id: row.get(2)?,
      effective_at:   row.get(3)?,
      sequence:       row.get(4)?,
      note:           row.get(5)?,
      created_at:     row.get(6)?,
      code:           row.get(7)?,
      name:           row.get(8)?,
    })
  }

  pub fn into_view(self) -> Result<StatusChangeView> {
    Ok(StatusChangeView {
      change: StatusChange {
        change_id:      decode_uuid(&self.change_id)?,
        person_id:      decode_uuid(&self.person_id)?,
        status_kind_id: decode_uuid(&self.status_kind_id)?,
        effective_at:   decode_dt(&self.effective_at)?,
        sequence:       self.sequence,
        note:           self.note,
        created_at:     decode_dt(&self.created_at)?,
      },
      code: self.code,
      name: self.name,
    })
  }
}

pub const POSITION_COLUMNS: &str = "position_id, code, short_name, special_number, \
  org_path, is_active, occupant_id, created_at, modified_at";

/// Raw values read directly from a `position_units` row.
pub struct RawPosition {
  pub position_id:    String,
  pub code:           String,
  pub short_name:     String,
  pub special_number: Option<String>,
  pub org_path:       String,
  pub is_active:      bool,
  pub occupant_id:    Option<String>,
  pub created_at:     String,
  pub modified_at:    String,
}

impl RawPosition {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      position_id:    row.get(0)?,
      code:           row.get(1)?,
      short_name:     row.get(2)?,
      special_number: row.get(3)?,
      org_path:       row.get(4)?,
      is_active:      row.get(5)?,
      occupant_id:    row.get(6)?,
      created_at:     row.get(7)?,
      modified_at:    row.get(8)?,
    })
  }

  pub fn into_position(self) -> Result<PositionUnit> {
    Ok(PositionUnit {
      position_id:    decode_uuid(&self.position_id)?,
      code:           self.code,
      short_name:     self.short_name,
      special_number: self.special_number,
      org_path:       self.org_path,
      is_active:      self.is_active,
      occupant_id:    decode_opt_uuid(self.occupant_id)?,
      created_at:     decode_dt(&self.created_at)?,
      modified_at:    decode_dt(&self.modified_at)?,
    })
  }
}

pub const ASSIGNMENT_COLUMNS: &str = "assignment_id, person_id, position_id, \
  opened_at, closed_at, note, created_at, modified_at";

/// Raw strings read directly from a `position_assignments` row.
pub struct RawAssignment {
  pub assignment_id: String,
  pub person_id:     String,
  pub position_id:   String,
  pub opened_at:     String,
  pub closed_at:     Option<String>,
  pub note:          Option<String>,
  pub created_at:    String,
  pub modified_at:   String,
}

impl RawAssignment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id: row.get(0)?,
      person_id:     row.get(1)?,
      position_id:   row.get(2)?,
      opened_at:     row.get(3)?,
      closed_at:     row.get(4)?,
      note:          row.get(5)?,
      created_at:    row.get(6)?,
      modified_at:   row.get(7)?,
    })
  }

  pub fn into_assignment(self) -> Result<PositionAssignment> {
    Ok(PositionAssignment {
      assignment_id: decode_uuid(&self.assignment_id)?,
      person_id:     decode_uuid(&self.person_id)?,
      position_id:   decode_uuid(&self.position_id)?,
      opened_at:     decode_dt(&self.opened_at)?,
      closed_at:     decode_opt_dt(self.closed_at)?,
      note:          self.note,
      created_at:    decode_dt(&self.created_at)?,
      modified_at:   decode_dt(&self.modified_at)?,
    })
  }
}

pub const PLAN_ACTION_COLUMNS: &str = "plan_action_id, person_id, kind, effective_at, \
  destination, note, state, order_ref, approved_at, cancel_reason, cancelled_at, \
  created_at, modified_at";

/// Raw strings read directly from a `plan_actions` row.
pub struct RawPlanAction {
  pub plan_action_id: String,
  pub person_id:      String,
  pub kind:           String,
  pub effective_at:   String,
  pub destination:    Option<String>,
  pub note:           Option<String>,
  pub state:          String,
  pub order_ref:      Option<String>,
  pub approved_at:    Option<String>,
  pub cancel_reason:  Option<String>,
  pub cancelled_at:   Option<String>,
  pub created_at:     String,
  pub modified_at:    String,
}

impl RawPlanAction {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      plan_action_id: row.get(0)?,
      person_id:      row.get(1)?,
      kind:           row.get(2)?,
      effective_at:   row.get(3)?,
      destination:    row.get(4)?,
      note:           row.get(5)?,
      state:          row.get(6)?,
      order_ref:      row.get(7)?,
      approved_at:    row.get(8)?,
      cancel_reason:  row.get(9)?,
      cancelled_at:   row.get(10)?,
      created_at:     row.get(11)?,
      modified_at:    row.get(12)?,
    })
  }

  pub fn into_plan_action(self) -> Result<PlanAction> {
    let state = match (self.state.as_str(), self.approved_at, self.cancelled_at) {
      ("planned", _, _) => PlanActionState::Planned,
      ("approved", Some(at), _) => PlanActionState::Approved {
        order_ref:   self.order_ref.unwrap_or_default(),
        approved_at: decode_dt(&at)?,
      },
      ("cancelled", _, Some(at)) => PlanActionState::Cancelled {
        reason:       self.cancel_reason,
        cancelled_at: decode_dt(&at)?,
      },
      (other, _, _) => return Err(unknown("plan action state", other)),
    };

    Ok(PlanAction {
      plan_action_id: decode_uuid(&self.plan_action_id)?,
      person_id:      decode_uuid(&self.person_id)?,
      kind:           decode_plan_kind(&self.kind)?,
      effective_at:   decode_dt(&self.effective_at)?,
      destination:    self.destination,
      note:           self.note,
      state,
      created_at:     decode_dt(&self.created_at)?,
      modified_at:    decode_dt(&self.modified_at)?,
    })
  }
}

/// The `(state, order_ref, approved_at, cancel_reason, cancelled_at)` columns
/// for a plan action state.
pub fn encode_plan_state(
  state: &PlanActionState,
) -> (&'static str, Option<String>, Option<String>, Option<String>, Option<String>) {
  match state {
    PlanActionState::Planned => ("planned", None, None, None, None),
    PlanActionState::Approved { order_ref, approved_at } => (
      "approved",
      Some(order_ref.clone()),
      Some(encode_dt(*approved_at)),
      None,
      None,
    ),
    PlanActionState::Cancelled { reason, cancelled_at } => (
      "cancelled",
      None,
      None,
      reason.clone(),
      Some(encode_dt(*cancelled_at)),
    ),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(5);
    let c = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert!(encode_dt(b) < encode_dt(c));
    assert_eq!(encode_dt(a), "2025-01-01T09:00:00.000000Z");
  }

  #[test]
  fn stored_precision_survives_roundtrip() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }
}
