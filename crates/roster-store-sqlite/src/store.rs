//! [`SqliteStore`], the SQLite implementation of [`RosterStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use roster_core::{
  person::{NewPerson, Person, PersonPatch},
  plan::{NewPlanAction, PlanAction},
  position::{
    AssignPosition, AssignmentOutcome, AssignmentPolicy, NewPositionUnit,
    PositionAssignment, PositionPatch, PositionUnit,
  },
  resolver,
  status::{
    NewStatusKind, PersonStatusOnDate, StatusChange, StatusChangeInput,
    StatusChangeView, StatusKind, StatusKindPatch, StatusOnDate,
  },
  store::{PersonQuery, PlanActionQuery, PositionQuery, RosterStore},
};
use rusqlite::{Connection, Transaction};
use uuid::Uuid;

use crate::{Result, encode::now, persons, plans, positions, schema::SCHEMA, statuses};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  policy: AssignmentPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn, policy: AssignmentPolicy::default() };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "roster store opened");
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, policy: AssignmentPolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Use `policy` when a person with an open assignment is assigned again.
  pub fn with_policy(mut self, policy: AssignmentPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> AssignmentPolicy { self.policy }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside one transaction on the SQLite thread. The transaction
  /// commits only if `f` succeeds; otherwise it is rolled back on drop.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = f(&tx);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }

  /// Run the read-only `f` on the SQLite thread.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = crate::Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let person = self.write(move |tx| persons::insert(tx, input, now())).await?;
    tracing::debug!(person_id = %person.person_id, "person created");
    Ok(person)
  }

  async fn update_person(&self, id: Uuid, patch: PersonPatch) -> Result<Person> {
    self.write(move |tx| persons::update(tx, id, patch, now())).await
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    self.read(move |conn| persons::fetch(conn, id)).await
  }

  async fn search_persons(&self, query: &PersonQuery) -> Result<Vec<Person>> {
    let query = query.clone();
    self.read(move |conn| persons::search(conn, &query)).await
  }

  // ── Status kinds ──────────────────────────────────────────────────────────

  async fn create_status_kind(&self, input: NewStatusKind) -> Result<StatusKind> {
    self.write(move |tx| statuses::insert_kind(tx, input, now())).await
  }

  async fn update_status_kind(&self, id: Uuid, patch: StatusKindPatch) -> Result<StatusKind> {
    self.write(move |tx| statuses::update_kind(tx, id, patch, now())).await
  }

  async fn reorder_status_kind(&self, id: Uuid, position: u32) -> Result<Vec<StatusKind>> {
    self.write(move |tx| statuses::reorder_kind(tx, id, position, now())).await
  }

  async fn set_status_kind_active(&self, id: Uuid, active: bool) -> Result<StatusKind> {
    self.write(move |tx| statuses::set_kind_active(tx, id, active, now())).await
  }

  async fn get_status_kind(&self, id: Uuid) -> Result<Option<StatusKind>> {
    self.read(move |conn| statuses::fetch_kind(conn, id)).await
  }

  async fn list_status_kinds(&self, include_inactive: bool) -> Result<Vec<StatusKind>> {
    self.read(move |conn| statuses::list_kinds(conn, include_inactive)).await
  }

  // ── Status history ────────────────────────────────────────────────────────

  async fn change_status(&self, input: StatusChangeInput) -> Result<StatusChange> {
    self.write(move |tx| statuses::append_change(tx, input, now())).await
  }

  async fn status_history(&self, person_id: Uuid) -> Result<Vec<StatusChangeView>> {
    self
      .read(move |conn| {
        persons::require(conn, person_id)?;
        statuses::history(conn, person_id)
      })
      .await
  }

  async fn status_on(&self, person_id: Uuid, at: DateTime<Utc>) -> Result<StatusOnDate> {
    let history = self.status_history(person_id).await?;
    Ok(resolver::status_on(&history, at))
  }

  async fn roster_on(
    &self,
    at: DateTime<Utc>,
    query: &PersonQuery,
  ) -> Result<Vec<PersonStatusOnDate>> {
    let query = query.clone();
    let rows = self.read(move |conn| persons::search_at(conn, &query, at)).await?;
    Ok(
      rows
        .into_iter()
        .map(|(person, status)| PersonStatusOnDate {
          person_id: person.person_id,
          full_name: person.full_name(),
          status:    StatusOnDate::from(status.as_ref()),
        })
        .collect(),
    )
  }

  // ── Positions ─────────────────────────────────────────────────────────────

  async fn create_position(&self, input: NewPositionUnit) -> Result<PositionUnit> {
    self.write(move |tx| positions::insert(tx, input, now())).await
  }

  async fn update_position(&self, id: Uuid, patch: PositionPatch) -> Result<PositionUnit> {
    self.write(move |tx| positions::update(tx, id, patch, now())).await
  }

  async fn set_position_active(&self, id: Uuid, active: bool) -> Result<PositionUnit> {
    self.write(move |tx| positions::set_active(tx, id, active, now())).await
  }

  async fn get_position(&self, id: Uuid) -> Result<Option<PositionUnit>> {
    self.read(move |conn| positions::fetch(conn, id)).await
  }

  async fn list_positions(&self, query: &PositionQuery) -> Result<Vec<PositionUnit>> {
    let query = query.clone();
    self.read(move |conn| positions::list(conn, &query)).await
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn assign_position(&self, input: AssignPosition) -> Result<AssignmentOutcome> {
    let policy = self.policy;
    self.write(move |tx| positions::assign(tx, input, policy, now())).await
  }

  async fn unassign_position(
    &self,
    person_id: Uuid,
    closed_at: DateTime<Utc>,
  ) -> Result<PositionAssignment> {
    self.write(move |tx| positions::unassign(tx, person_id, closed_at, now())).await
  }

  async fn list_assignments(&self, person_id: Uuid) -> Result<Vec<PositionAssignment>> {
    self
      .read(move |conn| {
        persons::require(conn, person_id)?;
        positions::assignments(conn, person_id)
      })
      .await
  }

  async fn open_assignment(&self, person_id: Uuid) -> Result<Option<PositionAssignment>> {
    self.read(move |conn| positions::open_assignment(conn, person_id)).await
  }

  // ── Plan actions ──────────────────────────────────────────────────────────

  async fn plan_action(&self, input: NewPlanAction) -> Result<PlanAction> {
    self.write(move |tx| plans::insert(tx, input, now())).await
  }

  async fn approve_plan_action(&self, id: Uuid, order_ref: String) -> Result<PlanAction> {
    self.write(move |tx| plans::approve(tx, id, &order_ref, now())).await
  }

  async fn cancel_plan_action(&self, id: Uuid, reason: Option<String>) -> Result<PlanAction> {
    self.write(move |tx| plans::cancel(tx, id, reason, now())).await
  }

  async fn get_plan_action(&self, id: Uuid) -> Result<Option<PlanAction>> {
    self.read(move |conn| plans::fetch(conn, id)).await
  }

  async fn list_plan_actions(&self, query: &PlanActionQuery) -> Result<Vec<PlanAction>> {
    let query = query.clone();
    self.read(move |conn| plans::list(conn, &query)).await
  }

  async fn due_plan_actions(&self, at: DateTime<Utc>) -> Result<Vec<PlanAction>> {
    self.read(move |conn| plans::due(conn, at)).await
  }
}
