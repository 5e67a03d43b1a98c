//! Handlers for `/plan-actions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/plan-actions` | Query: [`PlanActionQuery`] fields |
//! | `POST` | `/plan-actions` | Body: [`NewPlanAction`]; returns 201 |
//! | `GET`  | `/plan-actions/due` | `?at=` or `?date=`; approved actions in effect |
//! | `GET`  | `/plan-actions/:id` | |
//! | `POST` | `/plan-actions/:id/approve` | Body: `{"order_ref":"..."}` |
//! | `POST` | `/plan-actions/:id/cancel` | Body: `{"reason":"..."}` (optional) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  plan::{NewPlanAction, PlanAction},
  store::{PlanActionQuery, RosterStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AtParams, error::ApiError};

/// `GET /plan-actions[?person_id=...][&kind=...][&state=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(query): Query<PlanActionQuery>,
) -> Result<Json<Vec<PlanAction>>, ApiError>
where
  S: RosterStore,
{
  let actions = store.list_plan_actions(&query).await.map_err(ApiError::store)?;
  Ok(Json(actions))
}

/// `POST /plan-actions`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPlanAction>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let action = store.plan_action(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(action)))
}

/// `GET /plan-actions/due[?at=...|?date=...]`
pub async fn due<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<AtParams>,
) -> Result<Json<Vec<PlanAction>>, ApiError>
where
  S: RosterStore,
{
  let at = params.resolve()?;
  let actions = store.due_plan_actions(at).await.map_err(ApiError::store)?;
  Ok(Json(actions))
}

/// `GET /plan-actions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PlanAction>, ApiError>
where
  S: RosterStore,
{
  let action = store
    .get_plan_action(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("plan action {id} not found")))?;
  Ok(Json(action))
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
  pub order_ref: String,
}

/// `POST /plan-actions/:id/approve`
pub async fn approve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ApproveBody>,
) -> Result<Json<PlanAction>, ApiError>
where
  S: RosterStore,
{
  let action = store
    .approve_plan_action(id, body.order_ref)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(action))
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
  pub reason: Option<String>,
}

/// `POST /plan-actions/:id/cancel`
pub async fn cancel<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CancelBody>,
) -> Result<Json<PlanAction>, ApiError>
where
  S: RosterStore,
{
  let action = store
    .cancel_plan_action(id, body.reason)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(action))
}
