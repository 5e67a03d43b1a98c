//! Plan actions and their approval transitions.

use chrono::{DateTime, Utc};
use roster_core::{
  plan::{NewPlanAction, PlanAction, PlanActionState, PlanActionStateKind},
  store::PlanActionQuery,
  validation::normalize,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    PLAN_ACTION_COLUMNS, RawPlanAction, encode_dt, encode_plan_state, encode_uuid,
    stored_precision,
  },
  persons,
};

pub fn fetch(conn: &Connection, id: Uuid) -> Result<Option<PlanAction>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PLAN_ACTION_COLUMNS} FROM plan_actions WHERE plan_action_id = ?1"),
      params![encode_uuid(id)],
      RawPlanAction::from_row,
    )
    .optional()?;
  raw.map(RawPlanAction::into_plan_action).transpose()
}

pub fn require(conn: &Connection, id: Uuid) -> Result<PlanAction> {
  fetch(conn, id)?.ok_or_else(|| Error::not_found("plan action", id))
}

pub fn insert(conn: &Connection, input: NewPlanAction, now: DateTime<Utc>) -> Result<PlanAction> {
  persons::require(conn, input.person_id)?;
  let effective_at = stored_precision(input.effective_at);

  // The same move for the same person at the same instant is a duplicate
  // unless the earlier one was cancelled.
  let duplicate: Option<String> = conn
    .query_row(
      "SELECT plan_action_id FROM plan_actions
       WHERE person_id = ?1 AND kind = ?2 AND effective_at = ?3 AND state != 'cancelled'",
      params![
        encode_uuid(input.person_id),
        input.kind.as_str(),
        encode_dt(effective_at),
      ],
      |r| r.get(0),
    )
    .optional()?;
  if let Some(existing) = duplicate {
    return Err(Error::conflict(format!(
      "a {} for person {} at {effective_at} already exists ({existing})",
      input.kind.as_str(),
      input.person_id
    )));
  }

  let action = PlanAction {
    plan_action_id: Uuid::new_v4(),
    person_id: input.person_id,
    kind: input.kind,
    effective_at,
    destination: normalize(input.destination),
    note: normalize(input.note),
    state: PlanActionState::Planned,
    created_at: now,
    modified_at: now,
  };

  conn.execute(
    "INSERT INTO plan_actions (
       plan_action_id, person_id, kind, effective_at, destination, note,
       state, created_at, modified_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'planned', ?7, ?7)",
    params![
      encode_uuid(action.plan_action_id),
      encode_uuid(action.person_id),
      action.kind.as_str(),
      encode_dt(action.effective_at),
      action.destination,
      action.note,
      encode_dt(now),
    ],
  )?;
  Ok(action)
}

/// Persist the state columns of an action after a transition.
pub fn save_state(conn: &Connection, action: &PlanAction) -> Result<()> {
  let (state, order_ref, approved_at, cancel_reason, cancelled_at) =
    encode_plan_state(&action.state);
  conn.execute(
    "UPDATE plan_actions
     SET state = ?2, order_ref = ?3, approved_at = ?4,
         cancel_reason = ?5, cancelled_at = ?6, modified_at = ?7
     WHERE plan_action_id = ?1",
    params![
      encode_uuid(action.plan_action_id),
      state,
      order_ref,
      approved_at,
      cancel_reason,
      cancelled_at,
      encode_dt(action.modified_at),
    ],
  )?;
  tracing::debug!(plan_action_id = %action.plan_action_id, state, "plan action transitioned");
  Ok(())
}

pub fn approve(conn: &Connection, id: Uuid, order_ref: &str, now: DateTime<Utc>) -> Result<PlanAction> {
  let mut action = require(conn, id)?;
  action.approve(order_ref, now)?;
  save_state(conn, &action)?;
  Ok(action)
}

pub fn cancel(
  conn: &Connection,
  id: Uuid,
  reason: Option<String>,
  now: DateTime<Utc>,
) -> Result<PlanAction> {
  let mut action = require(conn, id)?;
  action.cancel(normalize(reason), now)?;
  save_state(conn, &action)?;
  Ok(action)
}

pub fn list(conn: &Connection, query: &PlanActionQuery) -> Result<Vec<PlanAction>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PLAN_ACTION_COLUMNS} FROM plan_actions
     WHERE (?1 IS NULL OR person_id = ?1)
       AND (?2 IS NULL OR kind = ?2)
       AND (?3 IS NULL OR state = ?3)
       AND (?4 IS NULL OR effective_at >= ?4)
       AND (?5 IS NULL OR effective_at <= ?5)
     ORDER BY effective_at, created_at"
  ))?;
  stmt
    .query_map(
      params![
        query.person_id.map(encode_uuid),
        query.kind.map(|k| k.as_str()),
        query.state.map(PlanActionStateKind::as_str),
        query.effective_after.map(encode_dt),
        query.effective_before.map(encode_dt),
      ],
      RawPlanAction::from_row,
    )?
    .map(|raw| raw?.into_plan_action())
    .collect()
}

pub fn due(conn: &Connection, at: DateTime<Utc>) -> Result<Vec<PlanAction>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PLAN_ACTION_COLUMNS} FROM plan_actions
     WHERE state = 'approved' AND effective_at <= ?1
     ORDER BY effective_at, created_at"
  ))?;
  stmt
    .query_map(params![encode_dt(at)], RawPlanAction::from_row)?
    .map(|raw| raw?.into_plan_action())
    .collect()
}
