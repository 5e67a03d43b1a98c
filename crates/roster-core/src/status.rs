//! Status kinds and the per-person status history.
//!
//! Status kinds form an ordered catalog. The `order` values of the active
//! kinds are always exactly `1..=n`; inactive kinds carry `order = 0`.
//!
//! A person's status is never stored directly. Each change appends a
//! [`StatusChange`] with its own effective time, and the status in effect at
//! any instant is resolved from that history (see [`crate::resolver`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// A catalog entry describing one possible personnel state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusKind {
  pub status_kind_id: Uuid,
  /// Short code shown in reports, e.g. `"100"` or `"В"`.
  pub code:           String,
  pub name:           String,
  /// 1-based sort position among active kinds; `0` when inactive.
  pub order:          u32,
  pub is_active:      bool,
  pub created_at:     DateTime<Utc>,
  pub modified_at:    DateTime<Utc>,
}

/// Input to [`crate::store::RosterStore::create_status_kind`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStatusKind {
  pub code:     String,
  pub name:     String,
  /// 1-based position to insert at; appended when absent.
  #[serde(default)]
  pub position: Option<u32>,
}

impl NewStatusKind {
  pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
    Self { code: code.into(), name: name.into(), position: None }
  }
}

/// Replacement code and name for an existing status kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusKindPatch {
  pub code: String,
  pub name: String,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One dated status change for a person. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
  pub change_id:      Uuid,
  pub person_id:      Uuid,
  pub status_kind_id: Uuid,
  /// When the status took (or takes) effect in the real world.
  pub effective_at:   DateTime<Utc>,
  /// Store-assigned insertion order; breaks ties on equal `effective_at`.
  pub sequence:       i64,
  pub note:           Option<String>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::RosterStore::change_status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeInput {
  pub person_id:      Uuid,
  pub status_kind_id: Uuid,
  pub effective_at:   DateTime<Utc>,
  #[serde(default)]
  pub note:           Option<String>,
}

impl StatusChangeInput {
  pub fn new(
    person_id: Uuid,
    status_kind_id: Uuid,
    effective_at: DateTime<Utc>,
  ) -> Self {
    Self { person_id, status_kind_id, effective_at, note: None }
  }
}

/// A history record joined with its status kind's code and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeView {
  #[serde(flatten)]
  pub change: StatusChange,
  pub code:   String,
  pub name:   String,
}

// ─── Point-in-time results ───────────────────────────────────────────────────

/// The status of a person at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "presence", rename_all = "snake_case")]
pub enum StatusOnDate {
  Present {
    status_kind_id: Uuid,
    code:           String,
    name:           String,
    effective_at:   DateTime<Utc>,
  },
  /// No status record precedes the instant.
  NotPresent,
}

impl StatusOnDate {
  pub fn code(&self) -> Option<&str> {
    match self {
      Self::Present { code, .. } => Some(code),
      Self::NotPresent => None,
    }
  }

  pub fn is_present(&self) -> bool { matches!(self, Self::Present { .. }) }
}

impl From<Option<&StatusChangeView>> for StatusOnDate {
  fn from(view: Option<&StatusChangeView>) -> Self {
    match view {
      Some(v) => Self::Present {
        status_kind_id: v.change.status_kind_id,
        code:           v.code.clone(),
        name:           v.name.clone(),
        effective_at:   v.change.effective_at,
      },
      None => Self::NotPresent,
    }
  }
}

/// One row of the roster-on-date report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonStatusOnDate {
  pub person_id: Uuid,
  pub full_name: String,
  pub status:    StatusOnDate,
}
