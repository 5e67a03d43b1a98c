//! Position units and the assignments that link people to them.
//!
//! An assignment is open from `opened_at` until `closed_at` is set. A person
//! holds at most one open assignment, and a position has at most one
//! occupant; the person's `current_position_id` and the position's
//! `occupant_id` mirror the open assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Position units ──────────────────────────────────────────────────────────

/// An organisational position slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUnit {
  pub position_id:    Uuid,
  pub code:           String,
  pub short_name:     String,
  pub special_number: Option<String>,
  /// Slash-separated path in the org tree, e.g. `"1 bn/2 coy/3 plt"`.
  pub org_path:       String,
  pub is_active:      bool,
  pub occupant_id:    Option<Uuid>,
  pub created_at:     DateTime<Utc>,
  pub modified_at:    DateTime<Utc>,
}

impl PositionUnit {
  pub fn is_vacant(&self) -> bool { self.occupant_id.is_none() }
}

/// Input to [`crate::store::RosterStore::create_position`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPositionUnit {
  pub code:           String,
  pub short_name:     String,
  #[serde(default)]
  pub special_number: Option<String>,
  #[serde(default)]
  pub org_path:       String,
}

impl NewPositionUnit {
  pub fn new(code: impl Into<String>, short_name: impl Into<String>) -> Self {
    Self {
      code: code.into(),
      short_name: short_name.into(),
      ..Self::default()
    }
  }
}

/// Replacement descriptive fields for an existing position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionPatch {
  pub short_name:     String,
  #[serde(default)]
  pub special_number: Option<String>,
  #[serde(default)]
  pub org_path:       String,
}

// ─── Assignments ─────────────────────────────────────────────────────────────

/// A time-bounded link between a person and a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
  pub assignment_id: Uuid,
  pub person_id:     Uuid,
  pub position_id:   Uuid,
  pub opened_at:     DateTime<Utc>,
  pub closed_at:     Option<DateTime<Utc>>,
  pub note:          Option<String>,
  pub created_at:    DateTime<Utc>,
  pub modified_at:   DateTime<Utc>,
}

impl PositionAssignment {
  pub fn is_open(&self) -> bool { self.closed_at.is_none() }

  /// Whether the assignment covers `at` (closed boundary is exclusive).
  pub fn covers(&self, at: DateTime<Utc>) -> bool {
    self.opened_at <= at && self.closed_at.is_none_or(|closed| at < closed)
  }
}

/// Input to [`crate::store::RosterStore::assign_position`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPosition {
  pub person_id:   Uuid,
  pub position_id: Uuid,
  pub opened_at:   DateTime<Utc>,
  #[serde(default)]
  pub note:        Option<String>,
}

impl AssignPosition {
  pub fn new(person_id: Uuid, position_id: Uuid, opened_at: DateTime<Utc>) -> Self {
    Self { person_id, position_id, opened_at, note: None }
  }
}

/// What to do when a person with an open assignment is assigned again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentPolicy {
  /// Close the prior assignment at the new assignment's `opened_at`.
  #[default]
  ClosePrevious,
  /// Refuse with a conflict.
  Reject,
}

/// The outcome of an assignment command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentOutcome {
  pub opened: PositionAssignment,
  /// The prior assignment closed to make room, if any.
  pub closed: Option<PositionAssignment>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn covers_is_half_open() {
    let open = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let close = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let now = Utc::now();
    let a = PositionAssignment {
      assignment_id: Uuid::new_v4(),
      person_id:     Uuid::new_v4(),
      position_id:   Uuid::new_v4(),
      opened_at:     open,
      closed_at:     Some(close),
      note:          None,
      created_at:    now,
      modified_at:   now,
    };
    assert!(a.covers(open));
    assert!(!a.covers(close));
    assert!(!a.is_open());
  }
}
