//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons` | Query: [`PersonQuery`] fields |
//! | `POST` | `/persons` | Body: [`NewPerson`]; returns 201 |
//! | `GET`  | `/persons/:id` | 404 if not found |
//! | `PUT`  | `/persons/:id` | Body: [`PersonPatch`] |
//! | `GET`  | `/persons/:id/status` | Full status history |
//! | `POST` | `/persons/:id/status` | Body: [`StatusChangeBody`]; returns 201 |
//! | `GET`  | `/persons/:id/status-on` | `?at=` or `?date=`; defaults to now |
//! | `GET`  | `/persons/:id/assignments` | Newest first |
//! | `POST` | `/persons/:id/assignments` | Body: [`AssignBody`]; returns 201 |
//! | `GET`  | `/persons/:id/assignments/open` | 404 if none open |
//! | `POST` | `/persons/:id/unassign` | Body: `{"closed_at":"..."}` (optional) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use roster_core::{
  person::{NewPerson, Person, PersonPatch},
  position::{AssignPosition, AssignmentOutcome, PositionAssignment},
  status::{StatusChangeInput, StatusChangeView, StatusOnDate},
  store::{PersonQuery, RosterStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AtParams, error::ApiError};

// ─── Search ──────────────────────────────────────────────────────────────────

/// `GET /persons[?text=...][&status_id=...][&position_id=...][&has_position=...]`
pub async fn search<S>(
  State(store): State<Arc<S>>,
  Query(query): Query<PersonQuery>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RosterStore,
{
  let persons = store.search_persons(&query).await.map_err(ApiError::store)?;
  Ok(Json(persons))
}

// ─── Create / read / update ──────────────────────────────────────────────────

/// `POST /persons`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let person = store.create_person(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore,
{
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

/// `PUT /persons/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PersonPatch>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore,
{
  let person = store.update_person(id, body).await.map_err(ApiError::store)?;
  Ok(Json(person))
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /persons/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChangeBody {
  pub status_kind_id: Uuid,
  /// Defaults to now.
  pub effective_at:   Option<DateTime<Utc>>,
  pub note:           Option<String>,
}

/// `POST /persons/:id/status`: returns 201 + the stored change.
pub async fn change_status<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
  Json(body): Json<StatusChangeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let input = StatusChangeInput {
    person_id,
    status_kind_id: body.status_kind_id,
    effective_at: body.effective_at.unwrap_or_else(Utc::now),
    note: body.note,
  };
  let change = store.change_status(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(change)))
}

/// `GET /persons/:id/status`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
) -> Result<Json<Vec<StatusChangeView>>, ApiError>
where
  S: RosterStore,
{
  let history = store.status_history(person_id).await.map_err(ApiError::store)?;
  Ok(Json(history))
}

/// `GET /persons/:id/status-on[?at=...|?date=...]`
pub async fn status_on<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
  Query(params): Query<AtParams>,
) -> Result<Json<StatusOnDate>, ApiError>
where
  S: RosterStore,
{
  let at = params.resolve()?;
  let status = store.status_on(person_id, at).await.map_err(ApiError::store)?;
  Ok(Json(status))
}

// ─── Assignments ─────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /persons/:id/assignments`.
#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub position_id: Uuid,
  /// Defaults to now.
  pub opened_at:   Option<DateTime<Utc>>,
  pub note:        Option<String>,
}

/// `POST /persons/:id/assignments`: returns 201 + the opened assignment and
/// the one it closed, if any.
pub async fn assign<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<(StatusCode, Json<AssignmentOutcome>), ApiError>
where
  S: RosterStore,
{
  let input = AssignPosition {
    person_id,
    position_id: body.position_id,
    opened_at: body.opened_at.unwrap_or_else(Utc::now),
    note: body.note,
  };
  let outcome = store.assign_position(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Debug, Deserialize)]
pub struct UnassignBody {
  /// Defaults to now.
  pub closed_at: Option<DateTime<Utc>>,
}

/// `POST /persons/:id/unassign`: the body may be omitted entirely.
pub async fn unassign<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
  body: Option<Json<UnassignBody>>,
) -> Result<Json<PositionAssignment>, ApiError>
where
  S: RosterStore,
{
  let closed_at = body
    .and_then(|Json(body)| body.closed_at)
    .unwrap_or_else(Utc::now);
  let closed = store
    .unassign_position(person_id, closed_at)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(closed))
}

/// `GET /persons/:id/assignments`
pub async fn assignments<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
) -> Result<Json<Vec<PositionAssignment>>, ApiError>
where
  S: RosterStore,
{
  let list = store.list_assignments(person_id).await.map_err(ApiError::store)?;
  Ok(Json(list))
}

/// `GET /persons/:id/assignments/open`
pub async fn open_assignment<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
) -> Result<Json<PositionAssignment>, ApiError>
where
  S: RosterStore,
{
  let open = store
    .open_assignment(person_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("person {person_id} has no open assignment"))
    })?;
  Ok(Json(open))
}
