//! Handler for `GET /roster`: everyone's status on one date.
//!
//! Accepts `?at=` or `?date=` plus the [`PersonQuery`] filters of
//! `GET /persons`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use roster_core::{
  status::PersonStatusOnDate,
  store::{PersonQuery, RosterStore},
};

use crate::{AtParams, error::ApiError};

/// `GET /roster[?date=2025-02-01][&text=...]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(at): Query<AtParams>,
  Query(filter): Query<PersonQuery>,
) -> Result<Json<Vec<PersonStatusOnDate>>, ApiError>
where
  S: RosterStore,
{
  let at = at.resolve()?;
  let rows = store.roster_on(at, &filter).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}
