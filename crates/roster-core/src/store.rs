//! The `RosterStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`, `roster-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Write methods are the command handlers: each validates its input, applies
//! exactly one state transition and persists it atomically. Read methods are
//! the query handlers and never mutate.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  person::{NewPerson, Person, PersonPatch},
  plan::{NewPlanAction, PlanAction, PlanActionKind, PlanActionStateKind},
  position::{
    AssignPosition, AssignmentOutcome, NewPositionUnit, PositionAssignment,
    PositionPatch, PositionUnit,
  },
  status::{
    NewStatusKind, PersonStatusOnDate, StatusChange, StatusChangeInput,
    StatusChangeView, StatusKind, StatusKindPatch, StatusOnDate,
  },
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`RosterStore::search_persons`] and
/// [`RosterStore::roster_on`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonQuery {
  /// Case-insensitive substring over names, national id and callsign.
  pub text:         Option<String>,
  /// Restrict to persons whose current status is this kind.
  pub status_id:    Option<Uuid>,
  /// Restrict to the current occupant of this position.
  pub position_id:  Option<Uuid>,
  /// `Some(true)` keeps only assigned persons, `Some(false)` only unassigned.
  pub has_position: Option<bool>,
  pub limit:        Option<usize>,
  pub offset:       Option<usize>,
}

/// Parameters for [`RosterStore::list_positions`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionQuery {
  /// Keep only positions under this org path prefix.
  pub org_path:         Option<String>,
  #[serde(default)]
  pub include_inactive: bool,
  #[serde(default)]
  pub vacant_only:      bool,
}

/// Parameters for [`RosterStore::list_plan_actions`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanActionQuery {
  pub person_id:        Option<Uuid>,
  pub kind:             Option<PlanActionKind>,
  pub state:            Option<PlanActionStateKind>,
  pub effective_after:  Option<DateTime<Utc>>,
  pub effective_before: Option<DateTime<Utc>>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a roster storage backend.
///
/// Backend errors must carry domain failures as a [`crate::Error`] in their
/// source chain so [`crate::Error::find_in`] can classify them.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create a person. Conflict if the national id is taken.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Replace a person's personal and military details.
  fn update_person(
    &self,
    id: Uuid,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Persons matching `query`, ordered by last then first name.
  fn search_persons<'a>(
    &'a self,
    query: &'a PersonQuery,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Status kinds ──────────────────────────────────────────────────────

  /// Insert a kind at `input.position` (appended when absent) and renumber
  /// the active set.
  fn create_status_kind(
    &self,
    input: NewStatusKind,
  ) -> impl Future<Output = Result<StatusKind, Self::Error>> + Send + '_;

  fn update_status_kind(
    &self,
    id: Uuid,
    patch: StatusKindPatch,
  ) -> impl Future<Output = Result<StatusKind, Self::Error>> + Send + '_;

  /// Move an active kind to the 1-based `position`; returns the active set
  /// in its new order.
  fn reorder_status_kind(
    &self,
    id: Uuid,
    position: u32,
  ) -> impl Future<Output = Result<Vec<StatusKind>, Self::Error>> + Send + '_;

  /// Deactivate (leaving the order) or reactivate (appending) a kind.
  fn set_status_kind_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<StatusKind, Self::Error>> + Send + '_;

  fn get_status_kind(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StatusKind>, Self::Error>> + Send + '_;

  /// Active kinds by order, followed by inactive kinds by name when
  /// `include_inactive` is set.
  fn list_status_kinds(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<StatusKind>, Self::Error>> + Send + '_;

  // ── Status history ────────────────────────────────────────────────────

  /// Append a status change and refresh the person's current status.
  fn change_status(
    &self,
    input: StatusChangeInput,
  ) -> impl Future<Output = Result<StatusChange, Self::Error>> + Send + '_;

  /// A person's history ordered by effective time, then insertion.
  fn status_history(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<StatusChangeView>, Self::Error>> + Send + '_;

  /// The status in effect for a person at `at`.
  fn status_on(
    &self,
    person_id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<StatusOnDate, Self::Error>> + Send + '_;

  /// The status in effect at `at` for every person matching `query`.
  fn roster_on<'a>(
    &'a self,
    at: DateTime<Utc>,
    query: &'a PersonQuery,
  ) -> impl Future<Output = Result<Vec<PersonStatusOnDate>, Self::Error>> + Send + 'a;

  // ── Positions ─────────────────────────────────────────────────────────

  fn create_position(
    &self,
    input: NewPositionUnit,
  ) -> impl Future<Output = Result<PositionUnit, Self::Error>> + Send + '_;

  fn update_position(
    &self,
    id: Uuid,
    patch: PositionPatch,
  ) -> impl Future<Output = Result<PositionUnit, Self::Error>> + Send + '_;

  /// Soft (de)activation. Deactivating an occupied position is a conflict.
  fn set_position_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<PositionUnit, Self::Error>> + Send + '_;

  fn get_position(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PositionUnit>, Self::Error>> + Send + '_;

  /// Positions matching `query`, ordered by org path then code.
  fn list_positions<'a>(
    &'a self,
    query: &'a PositionQuery,
  ) -> impl Future<Output = Result<Vec<PositionUnit>, Self::Error>> + Send + 'a;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Open an assignment, resolving any prior open assignment of the person
  /// according to the store's [`crate::position::AssignmentPolicy`].
  fn assign_position(
    &self,
    input: AssignPosition,
  ) -> impl Future<Output = Result<AssignmentOutcome, Self::Error>> + Send + '_;

  /// Close the person's open assignment at `closed_at`.
  fn unassign_position(
    &self,
    person_id: Uuid,
    closed_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<PositionAssignment, Self::Error>> + Send + '_;

  /// A person's assignments, newest first.
  fn list_assignments(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PositionAssignment>, Self::Error>> + Send + '_;

  fn open_assignment(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Option<PositionAssignment>, Self::Error>> + Send + '_;

  // ── Plan actions ──────────────────────────────────────────────────────

  /// Record a new `Planned` action.
  fn plan_action(
    &self,
    input: NewPlanAction,
  ) -> impl Future<Output = Result<PlanAction, Self::Error>> + Send + '_;

  fn approve_plan_action(
    &self,
    id: Uuid,
    order_ref: String,
  ) -> impl Future<Output = Result<PlanAction, Self::Error>> + Send + '_;

  fn cancel_plan_action(
    &self,
    id: Uuid,
    reason: Option<String>,
  ) -> impl Future<Output = Result<PlanAction, Self::Error>> + Send + '_;

  fn get_plan_action(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PlanAction>, Self::Error>> + Send + '_;

  /// Plan actions matching `query`, ordered by effective time.
  fn list_plan_actions<'a>(
    &'a self,
    query: &'a PlanActionQuery,
  ) -> impl Future<Output = Result<Vec<PlanAction>, Self::Error>> + Send + 'a;

  /// Approved actions whose effective time is at or before `at`.
  fn due_plan_actions(
    &self,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<PlanAction>, Self::Error>> + Send + '_;
}
