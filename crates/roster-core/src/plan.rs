//! Plan actions: scheduled dispatch and return moves.
//!
//! A plan action starts `Planned` and moves at most once: to `Approved`
//! (which requires an order reference) or to `Cancelled`. Both end states are
//! terminal. An approved action takes effect at its `effective_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The kind of administrative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanActionKind {
  Dispatch,
  Return,
}

impl PlanActionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Dispatch => "dispatch",
      Self::Return => "return",
    }
  }
}

/// The state of a plan action without its payload, as stored in the `state`
/// column and accepted by list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanActionStateKind {
  Planned,
  Approved,
  Cancelled,
}

impl PlanActionStateKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Planned => "planned",
      Self::Approved => "approved",
      Self::Cancelled => "cancelled",
    }
  }
}

/// Approval state of a plan action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlanActionState {
  Planned,
  Approved {
    /// Reference to the order that authorised the action.
    order_ref:   String,
    approved_at: DateTime<Utc>,
  },
  Cancelled {
    reason:       Option<String>,
    cancelled_at: DateTime<Utc>,
  },
}

impl PlanActionState {
  pub fn kind(&self) -> PlanActionStateKind {
    match self {
      Self::Planned => PlanActionStateKind::Planned,
      Self::Approved { .. } => PlanActionStateKind::Approved,
      Self::Cancelled { .. } => PlanActionStateKind::Cancelled,
    }
  }

  pub fn is_planned(&self) -> bool { matches!(self, Self::Planned) }
}

/// A dated dispatch or return move for a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAction {
  pub plan_action_id: Uuid,
  pub person_id:      Uuid,
  pub kind:           PlanActionKind,
  pub effective_at:   DateTime<Utc>,
  pub destination:    Option<String>,
  pub note:           Option<String>,
  pub state:          PlanActionState,
  pub created_at:     DateTime<Utc>,
  pub modified_at:    DateTime<Utc>,
}

impl PlanAction {
  /// Move `Planned → Approved`.
  pub fn approve(&mut self, order_ref: &str, at: DateTime<Utc>) -> Result<()> {
    let order_ref = order_ref.trim();
    if order_ref.is_empty() {
      return Err(Error::invalid("order_ref", "must not be empty"));
    }
    self.leave_planned("approve")?;
    self.state = PlanActionState::Approved {
      order_ref:   order_ref.to_owned(),
      approved_at: at,
    };
    self.modified_at = at;
    Ok(())
  }

  /// Move `Planned → Cancelled`.
  pub fn cancel(&mut self, reason: Option<String>, at: DateTime<Utc>) -> Result<()> {
    self.leave_planned("cancel")?;
    self.state = PlanActionState::Cancelled { reason, cancelled_at: at };
    self.modified_at = at;
    Ok(())
  }

  fn leave_planned(&self, verb: &str) -> Result<()> {
    if self.state.is_planned() {
      Ok(())
    } else {
      Err(Error::conflict(format!(
        "cannot {verb} plan action {} in state {}",
        self.plan_action_id,
        self.state.kind().as_str()
      )))
    }
  }

  /// Approved and already in effect at `at`.
  pub fn is_due(&self, at: DateTime<Utc>) -> bool {
    matches!(self.state, PlanActionState::Approved { .. }) && self.effective_at <= at
  }
}

/// Input to [`crate::store::RosterStore::plan_action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlanAction {
  pub person_id:    Uuid,
  pub kind:         PlanActionKind,
  pub effective_at: DateTime<Utc>,
  #[serde(default)]
  pub destination:  Option<String>,
  #[serde(default)]
  pub note:         Option<String>,
}

impl NewPlanAction {
  pub fn new(person_id: Uuid, kind: PlanActionKind, effective_at: DateTime<Utc>) -> Self {
    Self { person_id, kind, effective_at, destination: None, note: None }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn planned() -> PlanAction {
    let now = Utc::now();
    PlanAction {
      plan_action_id: Uuid::new_v4(),
      person_id:      Uuid::new_v4(),
      kind:           PlanActionKind::Dispatch,
      effective_at:   now,
      destination:    Some("training centre".into()),
      note:           None,
      state:          PlanActionState::Planned,
      created_at:     now,
      modified_at:    now,
    }
  }

  #[test]
  fn approve_records_order_reference() {
    let mut action = planned();
    let at = Utc::now();
    action.approve(" 123/ОС ", at).unwrap();
    assert_eq!(
      action.state,
      PlanActionState::Approved { order_ref: "123/ОС".into(), approved_at: at }
    );
    assert!(action.is_due(action.effective_at));
  }

  #[test]
  fn approve_requires_order_reference() {
    let mut action = planned();
    let err = action.approve("  ", Utc::now()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(action.state.is_planned());
  }

  #[test]
  fn approved_action_cannot_be_approved_or_cancelled() {
    let mut action = planned();
    action.approve("1", Utc::now()).unwrap();
    assert!(matches!(action.approve("2", Utc::now()), Err(Error::Conflict(_))));
    assert!(matches!(action.cancel(None, Utc::now()), Err(Error::Conflict(_))));
  }

  #[test]
  fn cancelled_action_is_never_due() {
    let mut action = planned();
    action.cancel(Some("plans changed".into()), Utc::now()).unwrap();
    assert!(!action.is_due(action.effective_at));
    assert!(matches!(action.approve("1", Utc::now()), Err(Error::Conflict(_))));
  }

  #[test]
  fn state_kind_matches_serialized_tag() {
    let mut action = planned();
    action.approve("1", Utc::now()).unwrap();
    let json = serde_json::to_value(&action.state).unwrap();
    assert_eq!(json["state"], action.state.kind().as_str());

    let kind: PlanActionStateKind = serde_json::from_str("\"cancelled\"").unwrap();
    assert_eq!(kind, PlanActionStateKind::Cancelled);
    assert!(serde_json::from_str::<PlanActionStateKind>("\"foo\"").is_err());
  }
}
