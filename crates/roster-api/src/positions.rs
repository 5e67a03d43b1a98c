//! Handlers for `/positions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/positions` | `?org_path=`, `?include_inactive=`, `?vacant_only=` |
//! | `POST` | `/positions` | Body: [`NewPositionUnit`]; returns 201 |
//! | `GET`  | `/positions/:id` | |
//! | `PUT`  | `/positions/:id` | Body: [`PositionPatch`] |
//! | `PUT`  | `/positions/:id/active` | Body: `{"active":false}`; 409 while occupied |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  position::{NewPositionUnit, PositionPatch, PositionUnit},
  store::{PositionQuery, RosterStore},
};
use uuid::Uuid;

use crate::{error::ApiError, statuses::ActiveBody};

/// `GET /positions`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(query): Query<PositionQuery>,
) -> Result<Json<Vec<PositionUnit>>, ApiError>
where
  S: RosterStore,
{
  let positions = store.list_positions(&query).await.map_err(ApiError::store)?;
  Ok(Json(positions))
}

/// `POST /positions`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPositionUnit>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let position = store.create_position(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(position)))
}

/// `GET /positions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PositionUnit>, ApiError>
where
  S: RosterStore,
{
  let position = store
    .get_position(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("position {id} not found")))?;
  Ok(Json(position))
}

/// `PUT /positions/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PositionPatch>,
) -> Result<Json<PositionUnit>, ApiError>
where
  S: RosterStore,
{
  let position = store.update_position(id, body).await.map_err(ApiError::store)?;
  Ok(Json(position))
}

/// `PUT /positions/:id/active`
pub async fn set_active<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<PositionUnit>, ApiError>
where
  S: RosterStore,
{
  let position = store
    .set_position_active(id, body.active)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(position))
}
