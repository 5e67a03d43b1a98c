//! JSON REST API for the roster.
//!
//! Exposes an axum [`Router`] backed by any [`roster_core::store::RosterStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod persons;
pub mod plans;
pub mod positions;
pub mod roster;
pub mod statuses;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use roster_core::{resolver::start_of_day, store::RosterStore};
use serde::Deserialize;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RosterStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::search::<S>).post(persons::create::<S>))
    .route("/persons/{id}", get(persons::get_one::<S>).put(persons::update::<S>))
    .route(
      "/persons/{id}/status",
      get(persons::history::<S>).post(persons::change_status::<S>),
    )
    .route("/persons/{id}/status-on", get(persons::status_on::<S>))
    .route(
      "/persons/{id}/assignments",
      get(persons::assignments::<S>).post(persons::assign::<S>),
    )
    .route("/persons/{id}/assignments/open", get(persons::open_assignment::<S>))
    .route("/persons/{id}/unassign", post(persons::unassign::<S>))
    // Status catalog
    .route(
      "/status-kinds",
      get(statuses::list::<S>).post(statuses::create::<S>),
    )
    .route(
      "/status-kinds/{id}",
      get(statuses::get_one::<S>).put(statuses::update::<S>),
    )
    .route("/status-kinds/{id}/reorder", post(statuses::reorder::<S>))
    .route("/status-kinds/{id}/active", put(statuses::set_active::<S>))
    // Positions
    .route(
      "/positions",
      get(positions::list::<S>).post(positions::create::<S>),
    )
    .route(
      "/positions/{id}",
      get(positions::get_one::<S>).put(positions::update::<S>),
    )
    .route("/positions/{id}/active", put(positions::set_active::<S>))
    // Plan actions
    .route("/plan-actions", get(plans::list::<S>).post(plans::create::<S>))
    .route("/plan-actions/due", get(plans::due::<S>))
    .route("/plan-actions/{id}", get(plans::get_one::<S>))
    .route("/plan-actions/{id}/approve", post(plans::approve::<S>))
    .route("/plan-actions/{id}/cancel", post(plans::cancel::<S>))
    // Reports
    .route("/roster", get(roster::handler::<S>))
    .with_state(store)
}

// ─── Shared parameters ───────────────────────────────────────────────────────

/// A point in time given either as an instant (`?at=`) or a calendar day
/// (`?date=`, resolved at the start of the day, UTC). Defaults to now.
#[derive(Debug, Default, Deserialize)]
pub struct AtParams {
  pub at:   Option<DateTime<Utc>>,
  pub date: Option<NaiveDate>,
}

impl AtParams {
  pub fn resolve(&self) -> Result<DateTime<Utc>, ApiError> {
    match (self.at, self.date) {
      (Some(_), Some(_)) => Err(ApiError::BadRequest(
        "give either `at` or `date`, not both".into(),
      )),
      (Some(at), None) => Ok(at),
      (None, Some(date)) => Ok(start_of_day(date)),
      (None, None) => Ok(Utc::now()),
    }
  }
}

#[cfg(test)]
mod tests;
