//! Handlers for the `/status-kinds` catalog.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/status-kinds` | `?include_inactive=true` appends inactive kinds |
//! | `POST` | `/status-kinds` | Body: [`NewStatusKind`]; returns 201 |
//! | `GET`  | `/status-kinds/:id` | |
//! | `PUT`  | `/status-kinds/:id` | Body: [`StatusKindPatch`] |
//! | `POST` | `/status-kinds/:id/reorder` | Body: `{"position":2}`; returns the active list |
//! | `PUT`  | `/status-kinds/:id/active` | Body: `{"active":false}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  status::{NewStatusKind, StatusKind, StatusKindPatch},
  store::RosterStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /status-kinds[?include_inactive=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<StatusKind>>, ApiError>
where
  S: RosterStore,
{
  let kinds = store
    .list_status_kinds(params.include_inactive)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(kinds))
}

/// `POST /status-kinds`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewStatusKind>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let kind = store.create_status_kind(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(kind)))
}

/// `GET /status-kinds/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StatusKind>, ApiError>
where
  S: RosterStore,
{
  let kind = store
    .get_status_kind(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("status kind {id} not found")))?;
  Ok(Json(kind))
}

/// `PUT /status-kinds/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusKindPatch>,
) -> Result<Json<StatusKind>, ApiError>
where
  S: RosterStore,
{
  let kind = store.update_status_kind(id, body).await.map_err(ApiError::store)?;
  Ok(Json(kind))
}

#[derive(Debug, Deserialize)]
pub struct ReorderBody {
  /// 1-based target position.
  pub position: u32,
}

/// `POST /status-kinds/:id/reorder`
pub async fn reorder<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReorderBody>,
) -> Result<Json<Vec<StatusKind>>, ApiError>
where
  S: RosterStore,
{
  if body.position == 0 {
    return Err(ApiError::BadRequest("position is 1-based".into()));
  }
  let kinds = store
    .reorder_status_kind(id, body.position)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(kinds))
}

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
  pub active: bool,
}

/// `PUT /status-kinds/:id/active`
pub async fn set_active<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<StatusKind>, ApiError>
where
  S: RosterStore,
{
  let kind = store
    .set_status_kind_active(id, body.active)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(kind))
}
